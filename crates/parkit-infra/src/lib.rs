//! Infrastructure layer
//!
//! Concrete implementations of the domain traits: JSON file registries,
//! the facility layout loader, console input and CSV export.

pub mod console_input;
pub mod layout_loader;
pub mod persistence;
pub mod ticket_export;
