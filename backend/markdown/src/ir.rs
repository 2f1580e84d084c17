//! Markdown Intermediate Representation
//!
//! Parses Markdown into a strongly-typed tree. Parsing always goes through
//! [`sanitize_events`], so the IR never contains raw HTML or unsafe URLs.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use serde::{Deserialize, Serialize};

use crate::sanitize::{is_safe_url, sanitize_events};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MarkdownNode {
    Heading(u32, Vec<MarkdownNode>),
    Paragraph(Vec<MarkdownNode>),
    Text(String),
    Emphasis(Vec<MarkdownNode>),
    Strong(Vec<MarkdownNode>),
    Strikethrough(Vec<MarkdownNode>),
    InlineCode(String),
    CodeBlock(String, String), // language, content
    /// Ordered lists carry their start number.
    List(Option<u64>, Vec<MarkdownNode>),
    ListItem(Vec<MarkdownNode>),
    TaskMarker(bool),
    Blockquote(Vec<MarkdownNode>),
    Link(String, Vec<MarkdownNode>), // url, children
    Image(String, String),           // url, alt_text
    Rule,
    SoftBreak,
    HardBreak,
}

impl MarkdownNode {
    /// Concatenated text content, ignoring all formatting.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(std::slice::from_ref(self), &mut out);
        out
    }
}

fn collect_text(nodes: &[MarkdownNode], out: &mut String) {
    for node in nodes {
        match node {
            MarkdownNode::Text(t) | MarkdownNode::InlineCode(t) => out.push_str(t),
            MarkdownNode::CodeBlock(_, content) => out.push_str(content),
            MarkdownNode::Image(_, alt) => out.push_str(alt),
            MarkdownNode::SoftBreak | MarkdownNode::HardBreak => out.push(' '),
            MarkdownNode::Heading(_, c)
            | MarkdownNode::Paragraph(c)
            | MarkdownNode::Emphasis(c)
            | MarkdownNode::Strong(c)
            | MarkdownNode::Strikethrough(c)
            | MarkdownNode::List(_, c)
            | MarkdownNode::ListItem(c)
            | MarkdownNode::Blockquote(c)
            | MarkdownNode::Link(_, c) => collect_text(c, out),
            MarkdownNode::TaskMarker(_) | MarkdownNode::Rule => {}
        }
    }
}

enum Frame {
    Paragraph,
    Heading(u32),
    Blockquote,
    CodeBlock(String),
    List(Option<u64>),
    Item,
    Emphasis,
    Strong,
    Strikethrough,
    /// `None` when the target was rejected; children are spliced into the parent.
    Link(Option<String>),
    Image(Option<String>),
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<MarkdownNode>,
    stack: Vec<(Frame, Vec<MarkdownNode>)>,
}

impl TreeBuilder {
    fn children(&mut self) -> &mut Vec<MarkdownNode> {
        match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        // closing ATX hashes arrive as an empty text event
        if text.is_empty() {
            return;
        }
        let children = self.children();
        if let Some(MarkdownNode::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(MarkdownNode::Text(text.to_string()));
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading(level, _, _) => Frame::Heading(heading_depth(level)),
            Tag::BlockQuote => Frame::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(lang)) => Frame::CodeBlock(lang.to_string()),
            Tag::CodeBlock(CodeBlockKind::Indented) => Frame::CodeBlock(String::new()),
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Strikethrough,
            Tag::Link(_, url, _) => Frame::Link(Some(url.to_string()).filter(|u| is_safe_url(u))),
            Tag::Image(_, url, _) => Frame::Image(Some(url.to_string()).filter(|u| is_safe_url(u))),
            // Tables and footnotes are not enabled; anything else is a plain container.
            _ => Frame::Paragraph,
        };
        self.stack.push((frame, Vec::new()));
    }

    fn close(&mut self) {
        let Some((frame, children)) = self.stack.pop() else { return };
        match frame {
            Frame::Paragraph => self.children().push(MarkdownNode::Paragraph(children)),
            Frame::Heading(level) => self.children().push(MarkdownNode::Heading(level, children)),
            Frame::Blockquote => self.children().push(MarkdownNode::Blockquote(children)),
            Frame::CodeBlock(lang) => {
                let mut content = String::new();
                collect_text(&children, &mut content);
                self.children().push(MarkdownNode::CodeBlock(lang, content));
            }
            Frame::List(start) => self.children().push(MarkdownNode::List(start, children)),
            Frame::Item => self.children().push(MarkdownNode::ListItem(children)),
            Frame::Emphasis => self.children().push(MarkdownNode::Emphasis(children)),
            Frame::Strong => self.children().push(MarkdownNode::Strong(children)),
            Frame::Strikethrough => self.children().push(MarkdownNode::Strikethrough(children)),
            Frame::Link(Some(url)) => self.children().push(MarkdownNode::Link(url, children)),
            Frame::Link(None) => {
                for child in children {
                    match child {
                        MarkdownNode::Text(t) => self.push_text(&t),
                        other => self.children().push(other),
                    }
                }
            }
            Frame::Image(url) => {
                let mut alt = String::new();
                collect_text(&children, &mut alt);
                match url {
                    Some(url) => self.children().push(MarkdownNode::Image(url, alt)),
                    None if !alt.is_empty() => self.push_text(&alt),
                    None => {}
                }
            }
        }
    }

    fn finish(mut self) -> Vec<MarkdownNode> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root
    }
}

fn heading_depth(level: HeadingLevel) -> u32 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

pub struct IrParser;

impl IrParser {
    /// Parse (and sanitize) Markdown into an Intermediate Representation.
    pub fn parse(markdown: &str) -> Vec<MarkdownNode> {
        let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        let events = sanitize_events(Parser::new_ext(markdown, options));

        let mut builder = TreeBuilder::default();
        for event in events {
            match event {
                Event::Start(tag) => builder.open(tag),
                Event::End(_) => builder.close(),
                Event::Text(text) => builder.push_text(&text),
                Event::Code(code) => builder.children().push(MarkdownNode::InlineCode(code.to_string())),
                Event::SoftBreak => builder.children().push(MarkdownNode::SoftBreak),
                Event::HardBreak => builder.children().push(MarkdownNode::HardBreak),
                Event::Rule => builder.children().push(MarkdownNode::Rule),
                Event::TaskListMarker(done) => builder.children().push(MarkdownNode::TaskMarker(done)),
                Event::FootnoteReference(label) => builder.push_text(&format!("[{label}]")),
                Event::Html(_) => {}
            }
        }
        builder.finish()
    }
}
