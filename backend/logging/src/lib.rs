//! Structured logging for SimpleDo.
//!
//! Subscriber setup with console and rolling JSON file output, redaction of
//! API keys, and the structured pipeline event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, PipelineEvent, PipelineEventLogger};
pub use logger::{init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
