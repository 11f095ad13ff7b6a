//! espfatfs - FatFS data upload for ESP32 sketches
//!
//! Reads the board's partition table, packs the sketch's `data` folder into a
//! FatFS image with `mkfatfs`, and writes it to the FatFS partition with
//! `esptool` (serial) or `espota` (network).

pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use errors::*;
pub use models::*;
pub use services::{Workflow, WorkflowRequest};

/// espfatfs version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// espfatfs application name
pub const APP_NAME: &str = "espfatfs";
