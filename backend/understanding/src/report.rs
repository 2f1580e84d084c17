//! Rendering a search answer together with its citations.

use std::fmt;
use std::str::FromStr;

use markdown::{is_safe_url, IrParser, MarkdownNode, Renderer};

use crate::search::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Ansi,
    Html,
    Plain,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Ansi => "ansi",
            ReportFormat::Html => "html",
            ReportFormat::Plain => "plain",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansi" | "terminal" => Ok(ReportFormat::Ansi),
            "html" => Ok(ReportFormat::Html),
            "plain" | "text" => Ok(ReportFormat::Plain),
            other => Err(format!("unknown format '{other}', expected ansi, html or plain")),
        }
    }
}

/// Sanitized answer followed by a numbered "Sources" list.
pub fn report_nodes(answer: &str, sources: &[Source]) -> Vec<MarkdownNode> {
    let mut nodes = IrParser::parse(answer);
    if sources.is_empty() {
        return nodes;
    }

    nodes.push(MarkdownNode::Heading(3, vec![MarkdownNode::Text("Sources".into())]));
    let items = sources
        .iter()
        .map(|source| {
            let title = MarkdownNode::Text(source.title.clone());
            let entry = if is_safe_url(&source.uri) {
                MarkdownNode::Link(source.uri.clone(), vec![title])
            } else {
                title
            };
            MarkdownNode::ListItem(vec![entry])
        })
        .collect();
    nodes.push(MarkdownNode::List(Some(1), items));
    nodes
}

pub fn render_report(answer: &str, sources: &[Source], format: ReportFormat) -> String {
    let nodes = report_nodes(answer, sources);
    match format {
        ReportFormat::Ansi => Renderer::to_ansi(&nodes),
        ReportFormat::Html => Renderer::to_html(&nodes),
        ReportFormat::Plain => Renderer::to_plain_text(&nodes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(uri: &str, title: &str) -> Source {
        Source { uri: uri.into(), title: title.into() }
    }

    #[test]
    fn html_report_has_heading_and_numbered_sources() {
        let html = render_report(
            "## Option 1: **Invoice #123 found** ##",
            &[source("https://a.test", "A")],
            ReportFormat::Html,
        );
        assert!(html.contains("<h2>Option 1: <strong>Invoice #123 found</strong></h2>"));
        assert!(html.contains("<h3>Sources</h3>"));
        assert!(html.contains("<ol>"));
        assert!(html.contains("href=\"https://a.test\""));
    }

    #[test]
    fn unsafe_source_uri_is_shown_as_plain_title() {
        let plain = render_report("answer", &[source("javascript:alert(1)", "Evil")], ReportFormat::Plain);
        assert!(plain.contains("1. Evil"));
        assert!(!plain.contains("javascript"));
    }

    #[test]
    fn no_sources_means_no_sources_section() {
        let plain = render_report("just text", &[], ReportFormat::Plain);
        assert_eq!(plain, "just text\n");
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("HTML".parse::<ReportFormat>(), Ok(ReportFormat::Html));
        assert!("pdf".parse::<ReportFormat>().is_err());
    }
}
