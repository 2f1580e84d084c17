//! Pipeline Event Logger
//!
//! Structured image-search pipeline events, emitted through `tracing` on the
//! `pipeline_events` target so the JSON file layer captures them as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "pipeline_events";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Transition {
        from: String,
        to: String,
    },
    CallFailed {
        call: String,
        attempt: u32,
        error_msg: String,
    },
    StaleCompletion {
        current_run: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub run_id: u64,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct PipelineEventLogger;

impl PipelineEventLogger {
    /// Redacts free-text fields, then emits the event.
    pub fn log_event(run_id: u64, event: PipelineEvent) -> EventLogEntry {
        let event = match event {
            PipelineEvent::CallFailed { call, attempt, error_msg } => PipelineEvent::CallFailed {
                call,
                attempt,
                error_msg: redact_sensitive_data(&error_msg),
            },
            other => other,
        };

        let entry = EventLogEntry { run_id, timestamp: Utc::now(), event };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: EVENT_TARGET, event = %json, "pipeline event"),
            Err(_) => info!(target: EVENT_TARGET, event = ?entry, "pipeline event"),
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_failures_are_redacted() {
        let entry = PipelineEventLogger::log_event(
            7,
            PipelineEvent::CallFailed {
                call: "ocr".into(),
                attempt: 2,
                error_msg: "request to /models?key=secret failed".into(),
            },
        );
        assert_eq!(entry.run_id, 7);
        match entry.event {
            PipelineEvent::CallFailed { error_msg, attempt, .. } => {
                assert_eq!(attempt, 2);
                assert!(!error_msg.contains("secret"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let value = serde_json::to_value(PipelineEvent::Transition {
            from: "extracting".into(),
            to: "searching".into(),
        })
        .unwrap();
        assert_eq!(value["type"], "transition");
        assert_eq!(value["to"], "searching");
    }
}
