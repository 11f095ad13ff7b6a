//! Data models and types used throughout espfatfs

pub mod build;
pub mod events;
pub mod partition;
pub mod tools;
pub mod upload;

// Re-export commonly used types
pub use build::*;
pub use events::*;
pub use partition::*;
pub use tools::*;
pub use upload::*;
