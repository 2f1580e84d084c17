//! Event-level sanitization applied before the IR is built.
//!
//! Raw HTML never reaches the IR. For inline elements whose body is code or
//! otherwise not meant to be shown (`<script>`, `<style>`, ...) the text
//! between the opening and closing tag is dropped too.

use pulldown_cmark::Event;
use tracing::debug;

/// Inline elements whose text content must not leak into the output.
const OPAQUE_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "svg",
];

/// URL schemes allowed as link or image targets. Relative URLs are allowed.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Whether a link or image target is safe to emit.
pub fn is_safe_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if normalized.is_empty() {
        return false;
    }
    let scheme_end = normalized.find(':');
    let path_start = normalized.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(slash)) if slash < colon => true,
        (Some(colon), _) => SAFE_SCHEMES.contains(&&normalized[..colon]),
        (None, _) => true,
    }
}

fn opening_tag(html: &str) -> Option<&'static str> {
    let lower = html.trim_start().to_ascii_lowercase();
    let rest = lower.strip_prefix('<')?;
    OPAQUE_TAGS.iter().copied().find(|tag| {
        rest.starts_with(tag)
            && rest[tag.len()..]
                .chars()
                .next()
                .is_none_or(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
    })
}

fn closes(html: &str, tag: &str) -> bool {
    html.to_ascii_lowercase().contains(&format!("</{tag}"))
}

/// Strip raw HTML (and the contents of opaque inline elements) from a stream.
pub fn sanitize_events<'a, I>(events: I) -> impl Iterator<Item = Event<'a>>
where
    I: Iterator<Item = Event<'a>>,
{
    let mut suppressed: Option<&'static str> = None;
    events.filter(move |event| match event {
        Event::Html(html) => {
            if let Some(tag) = suppressed {
                if closes(html, tag) {
                    suppressed = None;
                }
            } else if let Some(tag) = opening_tag(html) {
                if !closes(html, tag) {
                    suppressed = Some(tag);
                }
            }
            debug!(html = %&**html, "Dropped raw HTML");
            false
        }
        Event::Text(_) | Event::Code(_) | Event::SoftBreak | Event::HardBreak => suppressed.is_none(),
        _ => true,
    })
}
