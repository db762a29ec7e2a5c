//! 核心类型：查询与校验

pub mod query;

pub use query::{Query, QueryBuilder, QueryError, QueryFlags};
