//! Services layer (ports + adapters).
//!
//! - `ports`: pure contracts/types shared with the presentation side.
//! - `adapters`: OS specific implementations (child processes, pipes, poll).

pub mod adapters;
pub mod ports;
