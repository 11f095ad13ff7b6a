//! Workflow progress events for CLI rendering

use crate::models::ToolKind;
use serde::Serialize;
use std::path::PathBuf;

/// Steps of the build-and-upload workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    Idle,
    TableParsed,
    ToolsLocated,
    ImageBuilt,
    Uploaded,
    Failed,
}

/// Events emitted while the workflow runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    StateChanged { state: WorkflowState },
    /// Status-line message
    Notice { message: String },
    /// Terminal failure message
    Error { message: String },
    /// `[FatFS] key : value` console line
    Detail { key: String, value: String },
    ToolLocated { tool: ToolKind, path: PathBuf },
}

impl WorkflowEvent {
    pub fn notice(message: impl Into<String>) -> Self {
        WorkflowEvent::Notice {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        WorkflowEvent::Error {
            message: message.into(),
        }
    }

    pub fn detail(key: &str, value: impl ToString) -> Self {
        WorkflowEvent::Detail {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn state(state: WorkflowState) -> Self {
        WorkflowEvent::StateChanged { state }
    }
}
