use log::trace;

use crate::node::{Node, Section};

/// Regroups `node`'s children in place, wrapping every heading deeper than
/// `base_level` in a [`Section`] together with the content it scopes.
///
/// Leaves are left untouched.
pub fn group(node: &mut Node<'_>, base_level: usize) {
    if let Some(children) = node.children_mut() {
        let flat = std::mem::take(children);
        *children = group_children(flat, base_level);
    }
}

/// Groups a whole document. The root scan has an implicit base level of 0, so
/// every heading opens a section.
pub fn group_document(document: &mut Node<'_>) {
    group(document, 0);
}

/// Tree-to-tree form of [`group`].
///
/// A heading with level above `base_level` opens a section that collects the
/// following siblings up to, but not including, the next heading whose level
/// is at or above the opening heading's. That boundary heading is evaluated
/// again by this same scan. Each new section is grouped recursively with its
/// own level as the base. Recursion depth is bounded by the number of distinct
/// increasing heading levels, at most six for parsed markdown.
pub fn group_children<'a>(children: Vec<Node<'a>>, base_level: usize) -> Vec<Node<'a>> {
    let mut grouped = Vec::with_capacity(children.len());
    let mut remaining = children.into_iter().peekable();

    while let Some(child) = remaining.next() {
        let level = match child.heading_level() {
            Some(level) if level > base_level => level,
            _ => {
                grouped.push(child);
                continue;
            }
        };

        let mut scoped = vec![child];
        while let Some(next) = remaining.next_if(|next| !closes_section(next, level)) {
            scoped.push(next);
        }

        trace!(
            "opening level {level} section over {} node(s) at base level {base_level}",
            scoped.len()
        );
        let children = group_children(scoped, level);
        grouped.push(Node::Section(Section::new(level, children)));
    }

    grouped
}

fn closes_section(node: &Node<'_>, level: usize) -> bool {
    matches!(node.heading_level(), Some(next) if next <= level)
}
