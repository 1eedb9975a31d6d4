//! Turns a markdown pitch into result blocks, one per section heading.

use anyhow::{Context, Result};
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag};
use serde::{Deserialize, Serialize};

use crate::core::config::RenderConfig;

const KEY_METRIC_OPEN: &str = "[KEY_METRIC]";
const KEY_METRIC_CLOSE: &str = "[/KEY_METRIC]";
const KEY_METRIC_SPAN: &str = "<span class=\"key-metric\">";
const PLAIN_TEXT_WIDTH: usize = 80;

/// What to do with content that appears before the first block heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadingContent {
    /// Collect it into a block without a heading.
    #[default]
    Wrap,
    /// Discard it.
    Drop,
}

/// One top-level element of the converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Heading { text: String, html: String },
    Content { html: String, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeading {
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub heading: Option<BlockHeading>,
    pub body: Vec<String>,
}

impl Block {
    pub fn heading_text(&self) -> Option<&str> {
        self.heading.as_ref().map(|h| h.text.as_str())
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<div class=\"result-block\">");
        if let Some(heading) = &self.heading {
            out.push_str(&heading.html);
        }
        for fragment in &self.body {
            out.push_str(fragment);
        }
        out.push_str("</div>");
        out
    }

    /// Renders the block for a terminal `width` columns wide.
    pub fn to_plain_text(&self, width: usize) -> Result<String> {
        let html = self.to_html();
        html2text::from_read(html.as_bytes(), width).context("Failed to format block as text")
    }
}

/// Materializes a whole block sequence; replaces whatever was shown before.
pub fn render_html(blocks: &[Block]) -> String {
    blocks.iter().map(Block::to_html).collect()
}

/// Rewrites `[KEY_METRIC]x[/KEY_METRIC]` into a highlighted span. An opening
/// marker without a closing one is left untouched.
pub fn highlight_key_metrics(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(KEY_METRIC_OPEN) {
        let after_open = &rest[start + KEY_METRIC_OPEN.len()..];
        let Some(end) = after_open.find(KEY_METRIC_CLOSE) else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(KEY_METRIC_SPAN);
        out.push_str(&after_open[..end]);
        out.push_str("</span>");
        rest = &after_open[end + KEY_METRIC_CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone)]
pub struct PitchRenderer {
    heading_level: HeadingLevel,
    leading: LeadingContent,
    key_metrics: bool,
}

impl Default for PitchRenderer {
    fn default() -> Self {
        Self {
            heading_level: HeadingLevel::H2,
            leading: LeadingContent::Wrap,
            key_metrics: true,
        }
    }
}

impl PitchRenderer {
    pub fn from_config(config: &RenderConfig) -> Self {
        let heading_level = HeadingLevel::try_from(config.heading_level as usize).unwrap_or_else(|_| {
            log::warn!(
                "Invalid heading level {}, falling back to 2",
                config.heading_level
            );
            HeadingLevel::H2
        });

        Self {
            heading_level,
            leading: config.leading_content,
            key_metrics: config.key_metrics,
        }
    }

    pub fn with_leading(mut self, leading: LeadingContent) -> Self {
        self.leading = leading;
        self
    }

    pub fn with_key_metrics(mut self, enabled: bool) -> Self {
        self.key_metrics = enabled;
        self
    }

    pub fn render(&self, markdown: &str) -> Vec<Block> {
        self.group(self.normalize(markdown))
    }

    /// Splits the converted document into top-level nodes.
    pub fn normalize(&self, markdown: &str) -> Vec<Node> {
        let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);

        let mut nodes = Vec::new();
        let mut pending: Vec<Event> = Vec::new();
        let mut depth = 0usize;
        let mut is_heading = false;

        for event in parser {
            match &event {
                Event::Start(tag) => {
                    if depth == 0 {
                        is_heading = matches!(tag, Tag::Heading { level, .. } if *level == self.heading_level);
                    }
                    depth += 1;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            pending.push(event);

            if depth == 0 {
                nodes.push(self.finish_node(&pending, is_heading));
                pending.clear();
                is_heading = false;
            }
        }

        if !pending.is_empty() {
            nodes.push(self.finish_node(&pending, is_heading));
        }
        nodes
    }

    fn finish_node(&self, events: &[Event], is_heading: bool) -> Node {
        let mut html_out = String::new();
        html::push_html(&mut html_out, events.iter().cloned());

        let mut text = text_content(events);
        if self.key_metrics {
            html_out = highlight_key_metrics(&html_out);
            text = text.replace(KEY_METRIC_OPEN, "").replace(KEY_METRIC_CLOSE, "");
        }

        if is_heading {
            Node::Heading {
                text: text.trim().to_string(),
                html: html_out,
            }
        } else {
            Node::Content { html: html_out, text }
        }
    }

    pub fn group(&self, nodes: Vec<Node>) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut current: Option<Block> = None;

        for node in nodes {
            match node {
                Node::Heading { text, html } => {
                    blocks.extend(current.take());
                    current = Some(Block {
                        heading: Some(BlockHeading { text, html }),
                        body: Vec::new(),
                    });
                }
                Node::Content { html, text } => match current.as_mut() {
                    Some(block) => block.body.push(html),
                    None => {
                        if self.leading == LeadingContent::Wrap && !text.trim().is_empty() {
                            current = Some(Block {
                                heading: None,
                                body: vec![html],
                            });
                        }
                    }
                },
            }
        }

        blocks.extend(current);
        blocks
    }
}

/// Visible text of a node. An HTML block counts by the text it would display.
fn text_content(events: &[Event]) -> String {
    let mut text = String::new();
    let mut raw_html = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::Html(h) => raw_html.push_str(h),
            _ => {}
        }
    }

    if !raw_html.is_empty() {
        match html2text::from_read(raw_html.as_bytes(), PLAIN_TEXT_WIDTH) {
            Ok(visible) => text.push_str(&visible),
            Err(e) => log::debug!("Could not extract text from raw HTML: {}", e),
        }
    }
    text
}
