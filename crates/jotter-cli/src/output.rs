//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use jotter_core::export::flatten_markup;
use jotter_core::{AutosaveEvent, Note};

use crate::client::TagCount;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single note with its full content
    pub fn print_note(&self, note: &Note) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", note.id);
                println!("Title:    {}", display_title(&note.title));
                if !note.tags.is_empty() {
                    println!("Tags:     {}", note.tags.join(", "));
                }
                println!("Created:  {}", note.created_at.format("%Y-%m-%d %H:%M"));
                println!("Modified: {}", note.last_modified.format("%Y-%m-%d %H:%M"));
                println!();
                println!("{}", flatten_markup(&note.content));
            }
            OutputFormat::Json => print_json(note),
            OutputFormat::Quiet => {
                println!("{}", note.id);
            }
        }
    }

    /// Print a list of notes
    pub fn print_notes(&self, notes: &[Note]) {
        match self.format {
            OutputFormat::Human => {
                if notes.is_empty() {
                    println!("No notes found.");
                    return;
                }
                for note in notes {
                    println!(
                        "{} | {} | {} | {}",
                        short_id(note),
                        note.last_modified.format("%Y-%m-%d %H:%M"),
                        truncate(display_title(&note.title), 30),
                        truncate_line(&flatten_markup(&note.content), 40)
                    );
                }
                println!("\n{} note(s)", notes.len());
            }
            OutputFormat::Json => print_json(&notes),
            OutputFormat::Quiet => {
                for note in notes {
                    println!("{}", note.id);
                }
            }
        }
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[TagCount]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for tag in tags {
                    println!("{} ({})", tag.name, tag.count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => print_json(&tags),
            OutputFormat::Quiet => {
                for tag in tags {
                    println!("{}", tag.name);
                }
            }
        }
    }

    /// Report autosave progress while writing
    ///
    /// Status lines go to stderr so piped output stays clean.
    pub fn autosave_event(&self, event: &AutosaveEvent) {
        match (self.format, event) {
            (OutputFormat::Human, AutosaveEvent::StateChanged(state)) => {
                eprintln!("[{}]", state);
            }
            (OutputFormat::Human, AutosaveEvent::Failed(message)) => {
                eprintln!("Autosave failed: {}", message);
            }
            (OutputFormat::Human, AutosaveEvent::Saved(_)) => {}
            (OutputFormat::Json, AutosaveEvent::StateChanged(state)) => {
                println!("{}", serde_json::json!({"event": "state", "state": state.to_string()}));
            }
            (OutputFormat::Json, AutosaveEvent::Saved(note)) => {
                println!(
                    "{}",
                    serde_json::json!({"event": "saved", "id": note.id, "lastModified": note.last_modified})
                );
            }
            (OutputFormat::Json, AutosaveEvent::Failed(message)) => {
                println!("{}", serde_json::json!({"event": "failed", "message": message}));
            }
            (OutputFormat::Quiet, AutosaveEvent::Failed(message)) => {
                eprintln!("{}", message);
            }
            (OutputFormat::Quiet, _) => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

pub fn short_id(note: &Note) -> String {
    note.id.to_string()[..8].to_string()
}

fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        "(untitled)"
    } else {
        title
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_truncate_line() {
        assert_eq!(truncate_line("single line", 20), "single line");
        assert_eq!(truncate_line("line one\nline two", 20), "line one");
        assert_eq!(truncate_line("", 20), "");
    }

    #[test]
    fn test_display_title() {
        assert_eq!(display_title(""), "(untitled)");
        assert_eq!(display_title("Groceries"), "Groceries");
    }
}
