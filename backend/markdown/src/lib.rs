//! Sanitized Markdown rendering for model-generated text.
//!
//! Responses from the search model arrive as lightweight Markdown. They are
//! parsed into a small IR with all raw HTML and unsafe link targets removed,
//! then rendered to HTML, plain text or ANSI for the terminal.

pub mod ir;
pub mod renderer;
pub mod sanitize;

pub use ir::{IrParser, MarkdownNode};
pub use renderer::{strip_escapes, Renderer};
pub use sanitize::{is_safe_url, sanitize_events};
