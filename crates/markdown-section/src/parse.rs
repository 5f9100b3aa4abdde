use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag};

use crate::node::{Block, Heading, Node};

/// Markdown extensions passed through to `pulldown-cmark`.
///
/// Everything is off by default, which parses plain CommonMark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Tables, strikethrough and task lists.
    pub fn gfm() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            ..Self::default()
        }
    }

    pub fn to_pulldown(self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if self.heading_attributes {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        options
    }
}

/// Parses `source` into a flat `Document` whose children are the top-level
/// blocks in source order.
pub fn parse_document<'a>(source: &'a str, options: &MarkdownOptions) -> Node<'a> {
    let parser = Parser::new_ext(source, options.to_pulldown());
    Node::Document(split_blocks(parser))
}

/// Splits an event stream into one node per top-level block.
///
/// A block is a balanced `Start`/`End` run at depth zero. Events that appear
/// outside any tag (thematic breaks, raw html lines) form blocks of their own,
/// with consecutive html lines kept together.
pub fn split_blocks<'a, I>(events: I) -> Vec<Node<'a>>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut nodes = Vec::new();
    let mut open: Vec<Event<'a>> = Vec::new();
    let mut html_run: Vec<Event<'a>> = Vec::new();
    let mut depth = 0usize;

    for event in events {
        if depth > 0 {
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth -= 1,
                _ => {}
            }
            open.push(event);
            if depth == 0 {
                nodes.push(finish_block(std::mem::take(&mut open)));
            }
            continue;
        }

        match event {
            Event::Html(_) => html_run.push(event),
            Event::Start(_) => {
                flush_html(&mut nodes, &mut html_run);
                depth = 1;
                open.push(event);
            }
            other => {
                flush_html(&mut nodes, &mut html_run);
                nodes.push(Node::Block(Block::new(vec![other])));
            }
        }
    }

    flush_html(&mut nodes, &mut html_run);
    if !open.is_empty() {
        nodes.push(finish_block(open));
    }

    nodes
}

fn flush_html<'a>(nodes: &mut Vec<Node<'a>>, html_run: &mut Vec<Event<'a>>) {
    if !html_run.is_empty() {
        nodes.push(Node::Block(Block::new(std::mem::take(html_run))));
    }
}

fn finish_block(events: Vec<Event<'_>>) -> Node<'_> {
    let level = match events.first() {
        Some(Event::Start(Tag::Heading(level, _, _))) => Some(heading_level_number(*level)),
        _ => None,
    };

    match level {
        Some(level) => Node::Heading(Heading::new(level, events)),
        None => Node::Block(Block::new(events)),
    }
}

pub fn heading_level_number(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
