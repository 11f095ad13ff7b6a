//! Services that make up the image build and upload workflow
//!
//! Leaf-first: the partition parser and tool locator feed the image builder
//! and uploader, and `workflow` strings them together.

pub mod image_builder;
pub mod partition_parser;
pub mod tool_locator;
pub mod uploader;
pub mod workflow;

pub use image_builder::*;
pub use partition_parser::*;
pub use tool_locator::*;
pub use uploader::*;
pub use workflow::*;
