//! Nested `<section>` wrapping for markdown documents.
//!
//! Markdown is parsed into a flat list of top-level blocks, regrouped so each
//! heading scopes the content that follows it, and rendered with every scope
//! wrapped in a `<section>` element carrying configurable classes.

mod classes;
mod error;
mod group;
mod node;
mod parse;
mod render;

use std::io::Write;

use log::debug;

pub use classes::{compute_classes, SectionOptions};
pub use error::{RenderError, RenderResult};
pub use group::{group, group_children, group_document};
pub use node::{Block, BlockKind, Heading, Node, Section, Visit};
pub use parse::{heading_level_number, parse_document, split_blocks, MarkdownOptions};
pub use render::{render_html, render_html_string, SectionTags};

/// Parse, group and render in one place with a fixed set of options.
#[derive(Clone, Debug, Default)]
pub struct SectionWrapper {
    options: SectionOptions,
    markdown: MarkdownOptions,
}

impl SectionWrapper {
    pub fn new(options: SectionOptions) -> Self {
        Self {
            options,
            markdown: MarkdownOptions::default(),
        }
    }

    pub fn with_markdown_options(mut self, markdown: MarkdownOptions) -> Self {
        self.markdown = markdown;
        self
    }

    pub fn options(&self) -> &SectionOptions {
        &self.options
    }

    pub fn markdown_options(&self) -> &MarkdownOptions {
        &self.markdown
    }

    /// Parses `source` and returns the grouped document tree.
    pub fn parse<'a>(&self, source: &'a str) -> Node<'a> {
        let mut document = parse_document(source, &self.markdown);
        debug!(
            "parsed {} top-level block(s) from {} byte(s)",
            document.children().len(),
            source.len()
        );
        self.transform(&mut document);
        document
    }

    /// Groups an already parsed tree in place.
    pub fn transform(&self, node: &mut Node<'_>) {
        group_document(node);
    }

    pub fn render(&self, source: &str) -> RenderResult<String> {
        render_html_string(&self.parse(source), &self.options)
    }

    pub fn render_to<W: Write>(&self, source: &str, writer: W) -> RenderResult<()> {
        render_html(&self.parse(source), &self.options, writer)
    }

    /// Debug outline of the grouped tree.
    pub fn outline(&self, source: &str) -> String {
        self.parse(source).dump()
    }
}
