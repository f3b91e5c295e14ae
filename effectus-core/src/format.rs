//! The human-readable log line shared by the print and file sinks (§6).

use crate::event::LoggingEvent;
use crate::message::Language;
use crate::severity::Severity;
use chrono::{DateTime, Utc};

/// The indent/marker prepended to a line's description, per severity (§6
/// "Human-readable log line"):
///
/// * `Progress`/`Debug`/`Info`/`Iteration`: an indent of two spaces per
///   stack depth, when `step_indentation` is enabled, else no prefix.
/// * `Warning`: `"! "`; `Error`: `"!! "`; `Fatal`: `"!!! "`; `Loss`:
///   `"!!!!"`; `Deadly`: the skull code point `U+1F480`.
pub fn severity_prefix(severity: Severity, execution_level: usize, step_indentation: bool) -> String {
    match severity {
        Severity::Warning => "! ".to_string(),
        Severity::Error => "!! ".to_string(),
        Severity::Fatal => "!!! ".to_string(),
        Severity::Loss => "!!!!".to_string(),
        Severity::Deadly => "\u{1F480}".to_string(),
        _ => {
            if step_indentation {
                "  ".repeat(execution_level)
            } else {
                String::new()
            }
        }
    }
}

/// Whether `severity` routes to standard error by default (`Error`,
/// `Fatal`, `Loss`, `Deadly`), absent an override.
pub fn routes_to_stderr_by_default(severity: Severity) -> bool {
    severity >= Severity::Error
}

fn describe(event: &LoggingEvent) -> String {
    event
        .fact
        .get(Language::En)
        .or_else(|| event.fact.languages().next().and_then(|l| event.fact.get(l)))
        .unwrap_or("")
        .to_string()
}

/// Render `event` as the single-line human-readable form:
///
/// `"{<pid>} <app> (<time>):  <prefix><description> (step path: <a> / <b> /
/// …) @ <position> [<itemInfo>]"`
///
/// Segments whose data is absent (`pid`, step path, position, item info)
/// are omitted entirely rather than printed empty.
pub fn format_line(event: &LoggingEvent, step_indentation: bool) -> String {
    let mut line = String::new();
    if let Some(pid) = event.process_id {
        line.push_str(&format!("{{{pid}}} "));
    }
    line.push_str(&event.application_name);
    line.push_str(" (");
    let time: DateTime<Utc> = event.timestamp.wall_clock().into();
    line.push_str(&time.to_rfc3339());
    line.push_str("):  ");
    line.push_str(&severity_prefix(event.severity, event.execution_level, step_indentation));
    line.push_str(&describe(event));

    if !event.effectuation_stack.is_empty() {
        let path = event
            .effectuation_stack
            .iter()
            .map(|frame| frame.to_string())
            .collect::<Vec<_>>()
            .join(" / ");
        line.push_str(&format!(" (step path: {path})"));
    }

    if let Some(position) = &event.item_position_info {
        line.push_str(&format!(" @ {position}"));
    }

    if let Some(item_info) = &event.item_info {
        line.push_str(&format!(" [{item_info}]"));
    }

    line
}

/// Sanitize `text` into a single physical line for the file sink: `\r` is
/// removed, and `\\`/`\n` are escaped so the result never contains a raw
/// newline.
pub fn sanitize_for_single_line(text: &str) -> String {
    let without_cr: String = text.chars().filter(|c| *c != '\r').collect();
    without_cr.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effectuation::{Effectuation, StepId};
    use crate::event::Timestamp;
    use crate::message::Localized;
    use std::time::SystemTime;

    fn sample_event(severity: Severity, level: usize) -> LoggingEvent {
        LoggingEvent {
            message_id: None,
            severity,
            execution_level: level,
            process_id: Some(7),
            application_name: "app".to_string(),
            fact: Localized::en("hello"),
            solution: None,
            item_info: Some("wi-1".to_string()),
            item_position_info: Some("1/3".to_string()),
            effectuation_stack: vec![Effectuation::Step(StepId::new("f.rs", "sig"))],
            timestamp: Timestamp::new(0, SystemTime::now()),
        }
    }

    #[test]
    fn warning_prefix_is_bang_space() {
        assert_eq!(severity_prefix(Severity::Warning, 0, false), "! ");
    }

    #[test]
    fn deadly_prefix_is_skull() {
        assert_eq!(severity_prefix(Severity::Deadly, 0, false), "\u{1F480}");
    }

    #[test]
    fn progress_indents_by_depth_when_enabled() {
        assert_eq!(severity_prefix(Severity::Progress, 3, true), "      ");
        assert_eq!(severity_prefix(Severity::Progress, 3, false), "");
    }

    #[test]
    fn error_and_above_route_to_stderr_by_default() {
        assert!(routes_to_stderr_by_default(Severity::Error));
        assert!(routes_to_stderr_by_default(Severity::Fatal));
        assert!(!routes_to_stderr_by_default(Severity::Warning));
    }

    #[test]
    fn line_contains_all_present_segments() {
        let event = sample_event(Severity::Info, 1);
        let line = format_line(&event, false);
        assert!(line.starts_with("{7} app ("));
        assert!(line.contains("hello"));
        assert!(line.contains("(step path: step sig@f.rs)"));
        assert!(line.contains("@ 1/3"));
        assert!(line.contains("[wi-1]"));
    }

    #[test]
    fn sanitize_removes_cr_and_escapes_backslash_and_newline() {
        let input = "a\\b\nc\rd";
        let sanitized = sanitize_for_single_line(input);
        assert_eq!(sanitized, "a\\\\b\\ncd");
        assert!(!sanitized.contains('\r'));
        assert!(!sanitized.contains('\n'));
    }
}
