//! Renderers for the Markdown IR
//!
//! Transforms the AST into HTML, plain text and ANSI terminal output. Every
//! renderer treats text as data: nothing in a node is ever emitted unescaped.

use crate::ir::MarkdownNode;

const BOLD: &str = "\x1b[1m";
const ITALIC: &str = "\x1b[3m";
const UNDERLINE: &str = "\x1b[4m";
const STRIKE: &str = "\x1b[9m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const BLUE: &str = "\x1b[34m";
const RESET: &str = "\x1b[0m";

pub struct Renderer;

impl Renderer {
    /// Renders AST to an HTML fragment.
    pub fn to_html(nodes: &[MarkdownNode]) -> String {
        let mut out = String::new();
        html_nodes(nodes, &mut out);
        out
    }

    /// Renders AST to plain text, stripping all formatting.
    pub fn to_plain_text(nodes: &[MarkdownNode]) -> String {
        let mut out = String::new();
        plain_nodes(nodes, &mut out, 0);
        collapse_blank_lines(&out)
    }

    /// Renders AST with ANSI styling for a terminal.
    pub fn to_ansi(nodes: &[MarkdownNode]) -> String {
        let mut out = String::new();
        ansi_nodes(nodes, &mut out, 0);
        collapse_blank_lines(&out)
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn wrap_html(tag: &str, children: &[MarkdownNode], out: &mut String) {
    out.push_str(&format!("<{tag}>"));
    html_nodes(children, out);
    out.push_str(&format!("</{tag}>"));
}

fn html_nodes(nodes: &[MarkdownNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkdownNode::Text(t) => out.push_str(&escape_html(t)),
            MarkdownNode::Heading(level, c) => {
                let level = (*level).clamp(1, 6);
                wrap_html(&format!("h{level}"), c, out);
                out.push('\n');
            }
            MarkdownNode::Paragraph(c) => {
                wrap_html("p", c, out);
                out.push('\n');
            }
            MarkdownNode::Emphasis(c) => wrap_html("em", c, out),
            MarkdownNode::Strong(c) => wrap_html("strong", c, out),
            MarkdownNode::Strikethrough(c) => wrap_html("del", c, out),
            MarkdownNode::InlineCode(code) => {
                out.push_str(&format!("<code>{}</code>", escape_html(code)));
            }
            MarkdownNode::CodeBlock(lang, content) => {
                if lang.is_empty() {
                    out.push_str("<pre><code>");
                } else {
                    out.push_str(&format!("<pre><code class=\"language-{}\">", escape_html(lang)));
                }
                out.push_str(&escape_html(content));
                out.push_str("</code></pre>\n");
            }
            MarkdownNode::List(None, items) => {
                out.push_str("<ul>\n");
                html_nodes(items, out);
                out.push_str("</ul>\n");
            }
            MarkdownNode::List(Some(start), items) => {
                if *start == 1 {
                    out.push_str("<ol>\n");
                } else {
                    out.push_str(&format!("<ol start=\"{start}\">\n"));
                }
                html_nodes(items, out);
                out.push_str("</ol>\n");
            }
            MarkdownNode::ListItem(c) => {
                wrap_html("li", c, out);
                out.push('\n');
            }
            MarkdownNode::TaskMarker(done) => {
                let checked = if *done { " checked" } else { "" };
                out.push_str(&format!("<input type=\"checkbox\" disabled{checked}> "));
            }
            MarkdownNode::Blockquote(c) => {
                out.push_str("<blockquote>\n");
                html_nodes(c, out);
                out.push_str("</blockquote>\n");
            }
            MarkdownNode::Link(url, c) => {
                out.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                    escape_html(url)
                ));
                html_nodes(c, out);
                out.push_str("</a>");
            }
            MarkdownNode::Image(url, alt) => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_html(url),
                    escape_html(alt)
                ));
            }
            MarkdownNode::Rule => out.push_str("<hr>\n"),
            MarkdownNode::SoftBreak => out.push('\n'),
            MarkdownNode::HardBreak => out.push_str("<br>\n"),
        }
    }
}

fn plain_nodes(nodes: &[MarkdownNode], out: &mut String, depth: usize) {
    for node in nodes {
        match node {
            MarkdownNode::Text(t) | MarkdownNode::InlineCode(t) => out.push_str(t),
            MarkdownNode::Heading(_, c) | MarkdownNode::Paragraph(c) => {
                plain_nodes(c, out, depth);
                out.push_str("\n\n");
            }
            MarkdownNode::Emphasis(c) | MarkdownNode::Strong(c) | MarkdownNode::Strikethrough(c) => {
                plain_nodes(c, out, depth)
            }
            MarkdownNode::CodeBlock(_, content) => {
                out.push_str(content);
                out.push('\n');
            }
            MarkdownNode::List(start, items) => {
                list_items(*start, items, out, depth, plain_nodes);
                out.push('\n');
            }
            MarkdownNode::ListItem(c) => plain_nodes(c, out, depth),
            MarkdownNode::TaskMarker(done) => out.push_str(if *done { "[x] " } else { "[ ] " }),
            MarkdownNode::Blockquote(c) => {
                let mut inner = String::new();
                plain_nodes(c, &mut inner, depth);
                for line in inner.trim_end().lines() {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
            }
            MarkdownNode::Link(url, c) => {
                let before = out.len();
                plain_nodes(c, out, depth);
                if out[before..] != **url {
                    out.push_str(&format!(" ({url})"));
                }
            }
            MarkdownNode::Image(_, alt) => out.push_str(alt),
            MarkdownNode::Rule => out.push_str("----\n\n"),
            MarkdownNode::SoftBreak => out.push(' '),
            MarkdownNode::HardBreak => out.push('\n'),
        }
    }
}

fn ansi_nodes(nodes: &[MarkdownNode], out: &mut String, depth: usize) {
    for node in nodes {
        match node {
            MarkdownNode::Text(t) => out.push_str(&strip_escapes(t)),
            MarkdownNode::Heading(_, c) => {
                out.push_str(BOLD);
                out.push_str(UNDERLINE);
                ansi_nodes(c, out, depth);
                out.push_str(RESET);
                out.push_str("\n\n");
            }
            MarkdownNode::Paragraph(c) => {
                ansi_nodes(c, out, depth);
                out.push_str("\n\n");
            }
            MarkdownNode::Emphasis(c) => styled(ITALIC, c, out, depth),
            MarkdownNode::Strong(c) => styled(BOLD, c, out, depth),
            MarkdownNode::Strikethrough(c) => styled(STRIKE, c, out, depth),
            MarkdownNode::InlineCode(code) => {
                out.push_str(&format!("{CYAN}{}{RESET}", strip_escapes(code)));
            }
            MarkdownNode::CodeBlock(_, content) => {
                for line in strip_escapes(content).lines() {
                    out.push_str(&format!("{DIM}    {line}{RESET}\n"));
                }
                out.push('\n');
            }
            MarkdownNode::List(start, items) => {
                list_items(*start, items, out, depth, ansi_nodes);
                out.push('\n');
            }
            MarkdownNode::ListItem(c) => ansi_nodes(c, out, depth),
            MarkdownNode::TaskMarker(done) => out.push_str(if *done { "☑ " } else { "☐ " }),
            MarkdownNode::Blockquote(c) => {
                let mut inner = String::new();
                ansi_nodes(c, &mut inner, depth);
                for line in inner.trim_end().lines() {
                    out.push_str(&format!("{DIM}│{RESET} {line}\n"));
                }
                out.push('\n');
            }
            MarkdownNode::Link(url, c) => {
                out.push_str(BLUE);
                out.push_str(UNDERLINE);
                ansi_nodes(c, out, depth);
                out.push_str(RESET);
                out.push_str(&format!(" {DIM}({}){RESET}", strip_escapes(url)));
            }
            MarkdownNode::Image(_, alt) => out.push_str(&format!("[image: {}]", strip_escapes(alt))),
            MarkdownNode::Rule => out.push_str("────────\n\n"),
            MarkdownNode::SoftBreak => out.push(' '),
            MarkdownNode::HardBreak => out.push('\n'),
        }
    }
}

fn styled(style: &str, children: &[MarkdownNode], out: &mut String, depth: usize) {
    out.push_str(style);
    ansi_nodes(children, out, depth);
    out.push_str(RESET);
}

/// Bullet or number each item, indenting nested content.
fn list_items(
    start: Option<u64>,
    items: &[MarkdownNode],
    out: &mut String,
    depth: usize,
    render: fn(&[MarkdownNode], &mut String, usize),
) {
    let indent = "  ".repeat(depth);
    for (i, item) in items.iter().enumerate() {
        let marker = match start {
            Some(n) => format!("{}. ", n + i as u64),
            None => "- ".to_string(),
        };
        let mut body = String::new();
        match item {
            MarkdownNode::ListItem(children) => render(children, &mut body, depth + 1),
            other => render(std::slice::from_ref(other), &mut body, depth + 1),
        }
        let mut lines = body.trim_end().lines().filter(|l| !l.trim().is_empty());
        if let Some(first) = lines.next() {
            out.push_str(&format!("{indent}{marker}{}\n", first.trim_start()));
        }
        for line in lines {
            out.push_str(&format!("{indent}  {}\n", line.trim_start()));
        }
    }
}

/// Drop control characters (escape sequences included) but keep newlines
/// and tabs. Untrusted text must not be able to drive the terminal.
pub fn strip_escapes(text: &str) -> String {
    text.chars().filter(|c| *c == '\n' || *c == '\t' || !c.is_control()).collect()
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.trim_end().lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IrParser;

    #[test]
    fn html_for_heading_and_strong() {
        let html = Renderer::to_html(&IrParser::parse("## Option 1: **Invoice #123 found** ##"));
        assert_eq!(html, "<h2>Option 1: <strong>Invoice #123 found</strong></h2>\n");
    }

    #[test]
    fn html_never_contains_script_tags() {
        let md = "Hi <script>alert(1)</script>\n\n<img src=x onerror=alert(1)>\n\n[x](javascript:alert(1))";
        let html = Renderer::to_html(&IrParser::parse(md));
        assert!(!html.contains("<script"));
        assert!(!html.contains("onerror"));
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("alert"));
    }

    #[test]
    fn html_escapes_text() {
        let html = Renderer::to_html(&[MarkdownNode::Text("a < b & \"c\"".into())]);
        assert_eq!(html, "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn html_links_open_safely() {
        let html = Renderer::to_html(&IrParser::parse("[Source](https://x.test)"));
        assert_eq!(
            html,
            "<p><a href=\"https://x.test\" target=\"_blank\" rel=\"noopener noreferrer\">Source</a></p>\n"
        );
    }

    #[test]
    fn plain_text_strips_formatting() {
        let text = Renderer::to_plain_text(&IrParser::parse("# Title\n\nSome *emphasis* and **bold**.\n\n1. one\n2. two\n"));
        assert_eq!(text, "Title\n\nSome emphasis and bold.\n\n1. one\n2. two\n");
    }

    #[test]
    fn plain_text_shows_link_targets() {
        let text = Renderer::to_plain_text(&IrParser::parse("see [docs](https://x.test)"));
        assert_eq!(text, "see docs (https://x.test)\n");
    }

    #[test]
    fn ansi_strips_embedded_escape_sequences() {
        let nodes = vec![MarkdownNode::Paragraph(vec![MarkdownNode::Text("evil\x1b[2Jtext".into())])];
        let out = Renderer::to_ansi(&nodes);
        assert!(!out.contains("\x1b[2J"));
        assert!(out.contains("evil[2Jtext"));
    }

    #[test]
    fn ansi_bolds_strong_text() {
        let out = Renderer::to_ansi(&IrParser::parse("**hey**"));
        assert!(out.starts_with(&format!("{BOLD}hey{RESET}")));
    }
}
