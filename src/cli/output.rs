//! Rendering workflow events on the terminal

use crate::models::{WorkflowEvent, WorkflowState};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Event channel plus the task printing what comes through it. The task ends
/// once every sender is dropped.
pub fn spawn_renderer(json: bool) -> (mpsc::UnboundedSender<WorkflowEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if json {
                println!("{}", render_json(&event));
            } else if let Some(line) = render_text(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, handle)
}

/// Text line for an event. Errors are left to the command's returned error so
/// they are only reported once.
pub fn render_text(event: &WorkflowEvent) -> Option<String> {
    match event {
        WorkflowEvent::StateChanged { state } => {
            log::debug!("State: {:?}", state);
            match state {
                WorkflowState::ImageBuilt => Some("✅ FatFS image created".to_string()),
                _ => None,
            }
        }
        WorkflowEvent::Notice { message } => Some(format!("🔨 {}", message)),
        WorkflowEvent::Error { message } => {
            log::debug!("Workflow error: {}", message);
            None
        }
        WorkflowEvent::Detail { key, value } => Some(format!("[FatFS] {:<7}: {}", key, value)),
        WorkflowEvent::ToolLocated { tool, path } => {
            Some(format!("🔧 {} : {}", tool, path.display()))
        }
    }
}

pub fn render_json(event: &WorkflowEvent) -> String {
    let json = serde_json::json!({
        "timestamp": Utc::now().to_rfc3339(),
        "event": event,
    });
    json.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolKind;
    use std::path::PathBuf;

    #[test]
    fn test_detail_lines_are_aligned() {
        let line = render_text(&WorkflowEvent::detail("start", 1118208)).unwrap();
        assert_eq!(line, "[FatFS] start  : 1118208");
    }

    #[test]
    fn test_errors_are_not_rendered_as_text() {
        assert!(render_text(&WorkflowEvent::error("FatFS Upload failed!")).is_none());
    }

    #[test]
    fn test_json_event_shape() {
        let line = render_json(&WorkflowEvent::ToolLocated {
            tool: ToolKind::ImageBuilder,
            path: PathBuf::from("/tools/mkfatfs"),
        });
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"]["event"], "tool_located");
        assert_eq!(value["event"]["tool"], "ImageBuilder");
        assert_eq!(value["event"]["path"], "/tools/mkfatfs");
        assert!(value["timestamp"].is_string());
    }
}
