//! Core data models: configuration, credentials, turns and errors.

mod config;
mod error;
mod keys;
mod turn;

pub use config::*;
pub use error::*;
pub use keys::*;
pub use turn::*;
