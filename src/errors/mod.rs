//! Error handling for espfatfs

pub mod types;

pub use types::*;
