//! Core types for parkit

mod error;
mod types;

pub use error::*;
pub use types::*;
