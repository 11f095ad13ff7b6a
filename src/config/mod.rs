//! Configuration management for espfatfs

pub mod app_config;
pub mod board_prefs;

pub use app_config::*;
pub use board_prefs::*;
