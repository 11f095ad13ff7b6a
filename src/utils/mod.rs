//! Utility functions and helpers used throughout espfatfs

pub mod logging;
pub mod process;
pub mod prompt;
