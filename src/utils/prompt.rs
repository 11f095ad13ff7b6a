//! Yes/no confirmation prompts

use std::io::{BufRead, Write};

/// Asks the user a yes/no question; the default answer is "no"
pub trait Confirm: Send + Sync {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Prompt on the terminal and read the answer from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{}: {} [y/N] ", title, message);
        let _ = stderr.flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                log::warn!("Failed to read confirmation answer: {}", e);
                false
            }
        }
    }
}

/// Always gives the same answer (`--yes`, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, title: &str, _message: &str) -> bool {
        log::debug!("{}: answering {}", title, if self.0 { "yes" } else { "no" });
        self.0
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
