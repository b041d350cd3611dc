pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::message::*;
pub use crate::philosopher::{Outcome, Philosopher};
pub use crate::state::State;
pub use crate::table::Table;
pub use crate::topology::Ring;
pub use crate::transport::Endpoint;

pub mod collective;
pub mod config;
pub mod deadlock;
pub mod delay;
pub mod error;
pub mod log;
pub mod message;
pub mod philosopher;
pub mod state;
pub mod table;
pub mod termination;
pub mod topology;
pub mod transport;
