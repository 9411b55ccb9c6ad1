//! Markup nodes – the typed, flattened view of a fragment that the layout
//! engine consumes. One node per whitelisted element, in document order.

use serde::{Deserialize, Serialize};

use crate::style::StyleMap;

/// A whitelisted block element lifted out of the DOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkupNode {
    Heading1(TextNode),
    Heading2(TextNode),
    Heading3(TextNode),
    Paragraph(ParagraphNode),
    UnorderedList(ListNode),
    OrderedList(ListNode),
    Table(TableNode),
    Image(ImageNode),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub style: StyleMap,
}

/// Paragraph text plus block-level emphasis flags.
///
/// `bold` / `italic` are true when *any* descendant is `strong`/`b` or
/// `em`/`i`; mixed runs inside one paragraph are not represented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphNode {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    #[serde(default)]
    pub style: StyleMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListNode {
    pub items: Vec<String>,
    #[serde(default)]
    pub style: StyleMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    pub rows: Vec<Vec<TableCell>>,
    #[serde(default)]
    pub style: StyleMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    /// Cell came from a `th`.
    pub header: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    /// `src` exactly as written; nothing is fetched.
    pub src: String,
    pub alt: Option<String>,
    /// Intrinsic size in pixels from the `width`/`height` attributes.
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(default)]
    pub style: StyleMap,
}

impl MarkupNode {
    pub fn heading1(text: impl Into<String>) -> Self {
        MarkupNode::Heading1(TextNode::new(text))
    }

    pub fn heading2(text: impl Into<String>) -> Self {
        MarkupNode::Heading2(TextNode::new(text))
    }

    pub fn heading3(text: impl Into<String>) -> Self {
        MarkupNode::Heading3(TextNode::new(text))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        MarkupNode::Paragraph(ParagraphNode {
            text: text.into(),
            ..ParagraphNode::default()
        })
    }

    pub fn unordered_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        MarkupNode::UnorderedList(ListNode::new(items))
    }

    pub fn ordered_list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        MarkupNode::OrderedList(ListNode::new(items))
    }

    pub fn image(src: impl Into<String>) -> Self {
        MarkupNode::Image(ImageNode {
            src: src.into(),
            ..ImageNode::default()
        })
    }

    /// Inline style properties of the source element.
    pub fn style(&self) -> &StyleMap {
        match self {
            MarkupNode::Heading1(n) | MarkupNode::Heading2(n) | MarkupNode::Heading3(n) => &n.style,
            MarkupNode::Paragraph(n) => &n.style,
            MarkupNode::UnorderedList(n) | MarkupNode::OrderedList(n) => &n.style,
            MarkupNode::Table(n) => &n.style,
            MarkupNode::Image(n) => &n.style,
        }
    }

    /// Short label used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            MarkupNode::Heading1(_) => "h1",
            MarkupNode::Heading2(_) => "h2",
            MarkupNode::Heading3(_) => "h3",
            MarkupNode::Paragraph(_) => "p",
            MarkupNode::UnorderedList(_) => "ul",
            MarkupNode::OrderedList(_) => "ol",
            MarkupNode::Table(_) => "table",
            MarkupNode::Image(_) => "img",
        }
    }
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StyleMap::new(),
        }
    }
}

impl ListNode {
    pub fn new<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            style: StyleMap::new(),
        }
    }
}

impl TableCell {
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            header: true,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            header: false,
        }
    }
}
