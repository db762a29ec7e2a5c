//! fsearch - 可取消的多文件文本搜索
//!
//! 模块结构：
//! - core: 查询与校验（Query, QueryFlags）
//! - kernel::services::ports: 搜索结果、状态与配置的契约类型
//! - kernel::services::adapters: 进程表、搜索管道、配置文件
//! - kernel::results: 结果汇总
//! - cli / logging: 命令行前端

pub mod cli;
pub mod core;
pub mod kernel;
pub mod logging;
