//! Tree builders and fixtures shared by the markdown-section test suites.

use markdown_section::{Block, Heading, Node, Section};
use pulldown_cmark::{Event, HeadingLevel, Tag};

/// Heading leaf with a single text run. Levels outside 1..=6 keep their
/// numeric level but carry `h6` markup.
pub fn heading(level: usize, text: &'static str) -> Node<'static> {
    let markup = match level {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        3 => HeadingLevel::H3,
        4 => HeadingLevel::H4,
        5 => HeadingLevel::H5,
        _ => HeadingLevel::H6,
    };
    let tag = || Tag::Heading(markup, None, Vec::new());
    Node::Heading(Heading::new(
        level,
        vec![
            Event::Start(tag()),
            Event::Text(text.into()),
            Event::End(tag()),
        ],
    ))
}

pub fn paragraph(text: &'static str) -> Node<'static> {
    Node::Block(Block::new(vec![
        Event::Start(Tag::Paragraph),
        Event::Text(text.into()),
        Event::End(Tag::Paragraph),
    ]))
}

pub fn section(level: usize, children: Vec<Node<'static>>) -> Node<'static> {
    Node::Section(Section::new(level, children))
}

pub fn document(children: Vec<Node<'static>>) -> Node<'static> {
    Node::Document(children)
}

/// Compact signature of a leaf, e.g. `h2:Intro` or `p:body`.
pub fn leaf_label(node: &Node<'_>) -> String {
    match node {
        Node::Heading(heading) => format!("h{}:{}", heading.level(), heading.text()),
        Node::Block(block) => {
            let text: String = block
                .events()
                .iter()
                .filter_map(|event| match event {
                    Event::Text(text) => Some(&**text),
                    _ => None,
                })
                .collect();
            format!("p:{text}")
        }
        Node::Document(_) => "document".to_owned(),
        Node::Section(section) => format!("section:{}", section.level()),
    }
}

/// Every heading level sequence of `len` headings drawn from `1..=max_level`.
pub fn level_sequences(len: usize, max_level: usize) -> Vec<Vec<usize>> {
    let mut sequences = vec![Vec::new()];
    for _ in 0..len {
        let mut next = Vec::with_capacity(sequences.len() * max_level);
        for sequence in &sequences {
            for level in 1..=max_level {
                let mut extended = sequence.clone();
                extended.push(level);
                next.push(extended);
            }
        }
        sequences = next;
    }
    sequences
}
