//! Output formatting utilities for CLI.

use fission::Event;

use super::OutputFormat;

/// Format one engine event for the chosen output.
pub(super) fn format_event(event: &Event, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => event.to_string(),
        OutputFormat::Json => serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
    }
}
