use std::io::{self, Write};

use html_escape::encode_double_quoted_attribute;
use pulldown_cmark::{html, Event};

use crate::classes::{compute_classes, SectionOptions};
use crate::error::RenderResult;
use crate::node::{Node, Section, Visit};

/// Writes the opening and closing `<section>` tags for a section node.
///
/// The class attribute is always present, even when the computed class list
/// is empty. The value is escaped for a double-quoted attribute, so `&` and
/// quotes in a custom class come out as entities.
#[derive(Debug, Clone, Copy)]
pub struct SectionTags<'o> {
    options: &'o SectionOptions,
}

impl<'o> SectionTags<'o> {
    pub fn new(options: &'o SectionOptions) -> Self {
        Self { options }
    }

    pub fn write<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        section: &Section<'_>,
        visit: Visit,
    ) -> io::Result<()> {
        match visit {
            Visit::Enter => {
                let classes = compute_classes(section.level(), self.options);
                write!(
                    writer,
                    "<section class=\"{}\">",
                    encode_double_quoted_attribute(&classes)
                )
            }
            Visit::Leave => writer.write_all(b"</section>"),
        }
    }
}

/// Serializes `node` as HTML.
///
/// Headings and blocks go through `pulldown-cmark`'s HTML writer unchanged;
/// sections contribute only their wrapping tags. Errors from `writer` are
/// returned as they occur and stop the walk.
pub fn render_html<W: Write>(
    node: &Node<'_>,
    options: &SectionOptions,
    mut writer: W,
) -> RenderResult<()> {
    let tags = SectionTags::new(options);
    let mut scratch = String::new();

    let mut visit_node = |node: &Node<'_>, visit: Visit| -> io::Result<()> {
        match (node, visit) {
            (Node::Section(section), visit) => tags.write(&mut writer, section, visit),
            (Node::Heading(heading), Visit::Enter) => {
                write_events(&mut writer, &mut scratch, heading.events())
            }
            (Node::Block(block), Visit::Enter) => {
                write_events(&mut writer, &mut scratch, block.events())
            }
            _ => Ok(()),
        }
    };
    node.walk(&mut visit_node)?;

    Ok(())
}

pub fn render_html_string(node: &Node<'_>, options: &SectionOptions) -> RenderResult<String> {
    let mut buffer = Vec::new();
    render_html(node, options, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

fn write_events<W: Write>(
    writer: &mut W,
    scratch: &mut String,
    events: &[Event<'_>],
) -> io::Result<()> {
    scratch.clear();
    html::push_html(scratch, events.iter().cloned());
    writer.write_all(scratch.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Block, Heading};
    use pulldown_cmark::{HeadingLevel, Tag};

    fn heading(text: &'static str) -> Node<'static> {
        let tag = || Tag::Heading(HeadingLevel::H2, None, Vec::new());
        Node::Heading(Heading::new(
            2,
            vec![
                Event::Start(tag()),
                Event::Text(text.into()),
                Event::End(tag()),
            ],
        ))
    }

    fn section(children: Vec<Node<'static>>) -> Node<'static> {
        Node::Section(Section::new(2, children))
    }

    #[test]
    fn wraps_section_contents() {
        let tree = Node::Document(vec![section(vec![heading("A")])]);
        let html = render_html_string(&tree, &SectionOptions::default()).unwrap();
        assert_eq!(html, "<section class=\"section-h2\"><h2>A</h2>\n</section>");
    }

    #[test]
    fn empty_class_list_keeps_attribute() {
        let tree = section(vec![heading("A")]);
        let options = SectionOptions::default().with_section_class(false);
        let html = render_html_string(&tree, &options).unwrap();
        assert_eq!(html, "<section class=\"\"><h2>A</h2>\n</section>");
    }

    #[test]
    fn escapes_class_attribute() {
        let tree = section(vec![heading("A")]);
        let options = SectionOptions::default()
            .with_section_class(false)
            .with_custom_class("a\"b");
        let html = render_html_string(&tree, &options).unwrap();
        assert!(html.starts_with("<section class=\"a&quot;b\">"));
    }

    #[test]
    fn escapes_ampersand_in_custom_class() {
        let tree = section(vec![heading("A")]);
        let options = SectionOptions::default().with_custom_class("a&b");
        let html = render_html_string(&tree, &options).unwrap();
        assert!(html.starts_with("<section class=\"section-h2 a&amp;b\">"));
    }

    #[test]
    fn leaves_render_independently() {
        let block = Node::Block(Block::new(vec![Event::Rule]));
        let tree = Node::Document(vec![block, heading("B")]);
        let html = render_html_string(&tree, &SectionOptions::default()).unwrap();
        assert_eq!(html, "<hr />\n<h2>B</h2>\n");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_errors_propagate() {
        let tree = section(vec![heading("A")]);
        let err = render_html(&tree, &SectionOptions::default(), FailingWriter).unwrap_err();
        match err {
            crate::RenderError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
