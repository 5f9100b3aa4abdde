use std::fmt;

use pulldown_cmark::{Event, Tag};

const PREVIEW_CHARS: usize = 40;

/// A node in a markdown block tree.
///
/// Only `Document` and `Section` carry children. `Heading` and `Block` are
/// leaves that own the parser events they were built from, so rendering them
/// later reproduces exactly what the parser saw.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<'a> {
    Document(Vec<Node<'a>>),
    Section(Section<'a>),
    Heading(Heading<'a>),
    Block(Block<'a>),
}

/// Direction of a tree walk callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Enter,
    Leave,
}

impl<'a> Node<'a> {
    /// Returns the outline level when this node is a heading.
    pub fn heading_level(&self) -> Option<usize> {
        match self {
            Node::Heading(heading) => Some(heading.level),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Document(children) => children,
            Node::Section(section) => &section.children,
            Node::Heading(_) | Node::Block(_) => &[],
        }
    }

    /// Mutable access to the child list, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node<'a>>> {
        match self {
            Node::Document(children) => Some(children),
            Node::Section(section) => Some(&mut section.children),
            Node::Heading(_) | Node::Block(_) => None,
        }
    }

    /// Depth-first walk calling `visitor` on enter and leave of every node.
    ///
    /// Leaves receive both callbacks back to back. The first error returned by
    /// the visitor stops the walk and is handed back to the caller.
    pub fn walk<E, F>(&self, visitor: &mut F) -> Result<(), E>
    where
        F: FnMut(&Node<'a>, Visit) -> Result<(), E>,
    {
        visitor(self, Visit::Enter)?;
        for child in self.children() {
            child.walk(visitor)?;
        }
        visitor(self, Visit::Leave)
    }

    /// Heading and block leaves in document order, ignoring every wrapper.
    pub fn leaves(&self) -> Vec<&Node<'a>> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'n>(&'n self, leaves: &mut Vec<&'n Node<'a>>) {
        match self {
            Node::Document(_) | Node::Section(_) => {
                for child in self.children() {
                    child.collect_leaves(leaves);
                }
            }
            Node::Heading(_) | Node::Block(_) => leaves.push(self),
        }
    }

    /// Indented outline of the tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let line = match self {
            Node::Document(_) => "Document".to_owned(),
            Node::Section(section) => format!("Section(level={})", section.level),
            Node::Heading(heading) => {
                format!("Heading(level={}) {:?}", heading.level, heading.text())
            }
            Node::Block(block) => format!("Block({}) {:?}", block.kind(), block.preview()),
        };
        out.push_str(&indent);
        out.push_str(&line);
        out.push('\n');

        for child in self.children() {
            child.dump_into(out, depth + 1);
        }
    }
}

/// Synthetic wrapper scoping one heading and the content that follows it.
///
/// The first child is always the heading that opened the section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    level: usize,
    children: Vec<Node<'a>>,
}

impl<'a> Section<'a> {
    pub fn new(level: usize, children: Vec<Node<'a>>) -> Self {
        Self { level, children }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn children(&self) -> &[Node<'a>] {
        &self.children
    }

    pub fn heading(&self) -> Option<&Heading<'a>> {
        match self.children.first() {
            Some(Node::Heading(heading)) => Some(heading),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading<'a> {
    level: usize,
    events: Vec<Event<'a>>,
}

impl<'a> Heading<'a> {
    pub fn new(level: usize, events: Vec<Event<'a>>) -> Self {
        Self { level, events }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    /// Plain heading text with inline markup stripped and whitespace collapsed.
    pub fn text(&self) -> String {
        plain_text(&self.events)
    }
}

/// Any non-heading block, kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    events: Vec<Event<'a>>,
}

impl<'a> Block<'a> {
    pub fn new(events: Vec<Event<'a>>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    pub fn kind(&self) -> BlockKind {
        match self.events.first() {
            Some(Event::Start(Tag::Paragraph)) => BlockKind::Paragraph,
            Some(Event::Start(Tag::List(_))) => BlockKind::List,
            Some(Event::Start(Tag::BlockQuote)) => BlockKind::BlockQuote,
            Some(Event::Start(Tag::CodeBlock(_))) => BlockKind::CodeBlock,
            Some(Event::Start(Tag::Table(_))) => BlockKind::Table,
            Some(Event::Html(_)) => BlockKind::Html,
            Some(Event::Rule) => BlockKind::Rule,
            _ => BlockKind::Other,
        }
    }

    fn preview(&self) -> String {
        let text = plain_text(&self.events);
        if text.chars().count() <= PREVIEW_CHARS {
            return text;
        }
        let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
        preview.push_str("...");
        preview
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    List,
    BlockQuote,
    CodeBlock,
    Table,
    Html,
    Rule,
    Other,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::List => "list",
            BlockKind::BlockQuote => "blockquote",
            BlockKind::CodeBlock => "code",
            BlockKind::Table => "table",
            BlockKind::Html => "html",
            BlockKind::Rule => "rule",
            BlockKind::Other => "other",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(cow) | Event::Code(cow) => text.push_str(cow),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    let mut collapsed = String::with_capacity(text.len());
    for (idx, segment) in text.split_whitespace().enumerate() {
        if idx > 0 {
            collapsed.push(' ');
        }
        collapsed.push_str(segment);
    }
    collapsed
}
