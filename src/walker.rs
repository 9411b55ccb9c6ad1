//! Document walker – flattens a parsed fragment into [`MarkupNode`]s.
//!
//! Traversal is a single pre-order pass over the whole tree. Every element
//! whose tag is `h1`–`h3`, `p`, `ul`, `ol`, `table` or `img` yields a node,
//! including elements nested inside other whitelisted ones (a `p` inside an
//! `li` is both part of the list text and a paragraph of its own). Other
//! tags yield nothing but their children are still visited.

use crate::dom::{DomNode, ElementNode, Tag};
use crate::nodes::{
    ImageNode, ListNode, MarkupNode, ParagraphNode, TableCell, TableNode, TextNode,
};
use crate::style::{parse_declarations, StyleMap};

const BOLD_TAGS: &[Tag] = &[Tag::Strong, Tag::B];
const ITALIC_TAGS: &[Tag] = &[Tag::Em, Tag::I];

/// Walk a DOM forest in document order and collect markup nodes.
///
/// Text in every node is whitespace-collapsed: runs of spaces, tabs and
/// newlines (including those from `br`) become one space, and the result is
/// trimmed. Line structure inside an element is not preserved.
pub fn walk(nodes: &[DomNode]) -> Vec<MarkupNode> {
    let mut out = Vec::new();
    for node in nodes {
        visit(node, &mut out);
    }
    out
}

fn visit(node: &DomNode, out: &mut Vec<MarkupNode>) {
    let DomNode::Element(e) = node else {
        return;
    };
    if let Some(markup) = to_markup(e) {
        out.push(markup);
    }
    for child in &e.children {
        visit(child, out);
    }
}

fn to_markup(e: &ElementNode) -> Option<MarkupNode> {
    let node = match e.tag {
        Tag::H1 => MarkupNode::Heading1(text_node(e)?),
        Tag::H2 => MarkupNode::Heading2(text_node(e)?),
        Tag::H3 => MarkupNode::Heading3(text_node(e)?),
        Tag::P => MarkupNode::Paragraph(paragraph_node(e)?),
        Tag::Ul => MarkupNode::UnorderedList(list_node(e)),
        Tag::Ol => MarkupNode::OrderedList(list_node(e)),
        Tag::Table => MarkupNode::Table(table_node(e)),
        Tag::Img => MarkupNode::Image(image_node(e)?),
        _ => return None,
    };
    Some(node)
}

fn text_node(e: &ElementNode) -> Option<TextNode> {
    let text = extract_text(e);
    if text.is_empty() {
        log::debug!("Skipping empty <{:?}>", e.tag);
        return None;
    }
    Some(TextNode {
        text,
        style: style_of(e),
    })
}

fn paragraph_node(e: &ElementNode) -> Option<ParagraphNode> {
    let text = extract_text(e);
    if text.is_empty() {
        log::debug!("Skipping empty <p>");
        return None;
    }
    Some(ParagraphNode {
        text,
        bold: e.has_descendant(BOLD_TAGS),
        italic: e.has_descendant(ITALIC_TAGS),
        style: style_of(e),
    })
}

/// Immediate `li` children only; nested lists collapse into their item's text.
fn list_node(e: &ElementNode) -> ListNode {
    let items = e
        .child_elements()
        .filter(|c| c.tag == Tag::Li)
        .map(extract_text)
        .filter(|t| !t.is_empty())
        .collect();
    ListNode {
        items,
        style: style_of(e),
    }
}

fn table_node(e: &ElementNode) -> TableNode {
    let mut rows = Vec::new();
    collect_rows(e, &mut rows);
    TableNode {
        rows,
        style: style_of(e),
    }
}

/// Rows of this table, through `thead`/`tbody`/`tfoot`, but not rows of a
/// nested table.
fn collect_rows(e: &ElementNode, rows: &mut Vec<Vec<TableCell>>) {
    for child in e.child_elements() {
        match child.tag {
            Tag::Tr => rows.push(
                child
                    .child_elements()
                    .filter(|c| matches!(c.tag, Tag::Td | Tag::Th))
                    .map(|c| TableCell {
                        text: extract_text(c),
                        header: c.tag == Tag::Th,
                    })
                    .collect(),
            ),
            Tag::Table => {}
            _ => collect_rows(child, rows),
        }
    }
}

fn image_node(e: &ElementNode) -> Option<ImageNode> {
    let src = e.src().map(str::trim).filter(|s| !s.is_empty())?;
    Some(ImageNode {
        src: src.to_string(),
        alt: e
            .attr("alt")
            .map(collapse_whitespace)
            .filter(|a| !a.is_empty()),
        width: e.attr("width").and_then(parse_pixels),
        height: e.attr("height").and_then(parse_pixels),
        style: style_of(e),
    })
}

fn style_of(e: &ElementNode) -> StyleMap {
    e.inline_style().map(parse_declarations).unwrap_or_default()
}

fn extract_text(e: &ElementNode) -> String {
    collapse_whitespace(&e.text_content())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"640"`, `"640px"` or `"640.5"`; anything else is treated as absent.
fn parse_pixels(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let number = raw.strip_suffix("px").unwrap_or(raw).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
