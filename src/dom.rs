//! HTML parser – converts a generated markup fragment into a simple,
//! immutable DOM tree.
//!
//! The fragments come from a language model, so the parser is forgiving:
//! - unknown tags are kept as [`Tag::Unknown`] so their children stay visible
//! - void elements (`img`, `br`, ...) never take children
//! - stray closing tags are skipped, unclosed elements close at their parent
//! - optional end tags (`li`, `p`, table rows and cells) are implied
//! - nesting is capped at [`MAX_DEPTH`]
//! - `script` / `style` bodies are dropped

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// Tag name of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    H1,
    H2,
    H3,
    P,
    Ul,
    Ol,
    Li,
    Table,
    Thead,
    Tbody,
    Tfoot,
    Tr,
    Td,
    Th,
    Img,
    Strong,
    B,
    Em,
    I,
    Br,
    Div,
    Span,
    Body,
    Html,
    Head,
    /// Anything else, lowercased. Traversed like a plain container.
    Unknown(String),
}

impl Tag {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "p" => Tag::P,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "li" => Tag::Li,
            "table" => Tag::Table,
            "thead" => Tag::Thead,
            "tbody" => Tag::Tbody,
            "tfoot" => Tag::Tfoot,
            "tr" => Tag::Tr,
            "td" => Tag::Td,
            "th" => Tag::Th,
            "img" => Tag::Img,
            "strong" => Tag::Strong,
            "b" => Tag::B,
            "em" => Tag::Em,
            "i" => Tag::I,
            "br" => Tag::Br,
            "div" => Tag::Div,
            "span" => Tag::Span,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            other => Tag::Unknown(other.to_string()),
        }
    }

    /// Elements that never have content or a closing tag.
    pub fn is_void(&self) -> bool {
        match self {
            Tag::Img | Tag::Br => true,
            Tag::Unknown(name) => matches!(
                name.as_str(),
                "hr" | "meta" | "link" | "input" | "source" | "wbr" | "col" | "area" | "base"
                    | "embed" | "param" | "track"
            ),
            _ => false,
        }
    }

    /// Elements whose body is raw text we never render.
    fn is_raw_text(&self) -> bool {
        matches!(self, Tag::Unknown(name) if name == "script" || name == "style")
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

impl DomNode {
    /// Concatenation of all descendant text, markup removed.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            DomNode::Text(t) => out.push_str(t),
            DomNode::Element(e) => {
                if e.tag == Tag::Br {
                    out.push('\n');
                }
                for child in &e.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attr("style")
    }

    pub fn src(&self) -> Option<&str> {
        self.attr("src")
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Direct element children, text skipped.
    pub fn child_elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            DomNode::Element(e) => Some(e),
            DomNode::Text(_) => None,
        })
    }

    /// True when any descendant element has one of `tags`.
    pub fn has_descendant(&self, tags: &[Tag]) -> bool {
        self.child_elements()
            .any(|e| tags.contains(&e.tag) || e.has_descendant(tags))
    }
}

// ---------------------------------------------------------------------------
// Parser – simple recursive descent over HTML
// ---------------------------------------------------------------------------

/// Deepest element nesting the parser builds. An element opening below this
/// depth closes the innermost open element first, so it lands as a sibling.
pub const MAX_DEPTH: usize = 256;

/// Parse an HTML string into a list of DOM nodes.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    // Nothing is open at top level, so every closing tag there is stray and
    // parsing runs to the end of the input.
    parser.parse_nodes(&mut Vec::new())
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse siblings until EOF, a closing tag for `open` (current element
    /// or one of its ancestors), or an opening tag that ends the current
    /// element. That tag is left unconsumed.
    fn parse_nodes(&mut self, open: &mut Vec<Tag>) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace_preserve();
            if self.eof() {
                break;
            }
            if self.starts_with("</") {
                let closing = Tag::from_name(&self.peek_closing_name());
                if open.contains(&closing) {
                    break;
                }
                self.skip_closing_tag();
                continue;
            }
            if self.starts_with("<") && self.peek_char(1).is_some_and(|c| c.is_ascii_alphabetic()) {
                let opening = Tag::from_name(&self.peek_opening_name());
                if implies_end(open, &opening) {
                    break;
                }
                if open.len() >= MAX_DEPTH && !opening.is_void() {
                    log::debug!("Nesting deeper than {MAX_DEPTH}; <{opening:?}> opens as a sibling");
                    break;
                }
            }
            if let Some(node) = self.parse_node(open) {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self, open: &mut Vec<Tag>) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Skip doctype / processing instructions
            self.skip_past('>');
            return None;
        }
        if self.starts_with("<") && self.peek_char(1).is_some_and(|c| c.is_ascii_alphabetic()) {
            Some(self.parse_element(open))
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        // A lone '<' that does not open a tag is literal text.
        if self.starts_with("<") {
            self.advance(1);
        }
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self, open: &mut Vec<Tag>) -> DomNode {
        // Consume '<'
        self.advance(1);
        let tag = Tag::from_name(&self.parse_name());
        let mut elem = ElementNode::new(tag.clone());

        // Parse attributes
        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            match self.parse_attribute() {
                Some((key, value)) => {
                    elem.attributes.insert(key, value);
                }
                // Junk inside the tag; step over it.
                None => self.advance(1),
            }
        }

        if self.starts_with("/>") {
            self.advance(2);
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.advance(1);
        }
        if tag.is_void() {
            return DomNode::Element(elem);
        }
        if tag.is_raw_text() {
            self.skip_raw_text(&tag);
            return DomNode::Element(elem);
        }

        open.push(tag.clone());
        elem.children = self.parse_nodes(open);
        open.pop();

        // Only consume our own closing tag; an ancestor's closes us implicitly.
        if self.starts_with("</") && Tag::from_name(&self.peek_closing_name()) == tag {
            self.skip_closing_tag();
        }

        DomNode::Element(elem)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    fn parse_attribute(&mut self) -> Option<(String, String)> {
        let key = self.parse_name();
        if key.is_empty() {
            return None;
        }
        self.skip_whitespace();
        if !self.starts_with("=") {
            return Some((key, String::new()));
        }
        self.advance(1); // skip '='
        self.skip_whitespace();
        let value = self.parse_attr_value();
        Some((key, value))
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ['"', '\''] {
            if self.current_char() == Some(quote) {
                self.advance(1);
                let start = self.pos;
                while self.current_char().is_some_and(|c| c != quote) {
                    self.advance(1);
                }
                let val = decode_entities(&self.input[start..self.pos]);
                self.advance(1);
                return val;
            }
        }
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            self.advance(1);
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn peek_opening_name(&self) -> String {
        name_prefix(&self.input[self.pos + 1..])
    }

    fn peek_closing_name(&self) -> String {
        name_prefix(&self.input[self.pos + 2..])
    }

    fn skip_closing_tag(&mut self) {
        self.skip_past('>');
    }

    fn skip_raw_text(&mut self, tag: &Tag) {
        while !self.eof() {
            if self.starts_with("</") && Tag::from_name(&self.peek_closing_name()) == *tag {
                self.skip_closing_tag();
                return;
            }
            self.advance(1);
        }
    }

    fn skip_past(&mut self, c: char) {
        while let Some(cur) = self.current_char() {
            self.advance(1);
            if cur == c {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
    }

    fn skip_whitespace_preserve(&mut self) {
        // Skip runs of pure whitespace between elements.
        let saved = self.pos;
        self.skip_whitespace();
        // If we reached a tag or EOF, keep the skip. Otherwise revert.
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn skip_comment(&mut self) {
        self.advance(4); // skip <!--
        while !self.eof() && !self.starts_with("-->") {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(3);
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn advance(&mut self, n: usize) {
        // Advance by `n` characters (not bytes).
        for _ in 0..n {
            if let Some(c) = self.current_char() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn name_prefix(s: &str) -> String {
    s.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Whether an opening `tag` ends an element that is still open, following the
/// HTML optional end tag rules for the tags fragments use: `li` ends the open
/// `li`, a block ends the open `p`, and table rows, cells and sections end
/// their open predecessor. Searching stops at the scope boundary for `tag`.
fn implies_end(open: &[Tag], tag: &Tag) -> bool {
    let (targets, boundaries): (&[Tag], &[Tag]) = match tag {
        Tag::Li => (&[Tag::Li], &[Tag::Ul, Tag::Ol, Tag::Table]),
        Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::Ul | Tag::Ol | Tag::Table | Tag::Div => {
            (&[Tag::P], &[Tag::Li, Tag::Td, Tag::Th, Tag::Table])
        }
        Tag::Tr => (&[Tag::Tr], &[Tag::Table]),
        Tag::Td | Tag::Th => (&[Tag::Td, Tag::Th], &[Tag::Tr, Tag::Table]),
        Tag::Thead | Tag::Tbody | Tag::Tfoot => {
            (&[Tag::Thead, Tag::Tbody, Tag::Tfoot, Tag::Tr, Tag::Td, Tag::Th], &[Tag::Table])
        }
        _ => return false,
    };
    for t in open.iter().rev() {
        if targets.contains(t) {
            return true;
        }
        if boundaries.contains(t) {
            return false;
        }
    }
    false
}

/// Decode the named entities models actually emit plus numeric references.
/// Unknown entities are left as written.
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{00A0}'),
                _ => {
                    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok().and_then(char::from_u32)
                    } else {
                        None
                    }
                }
            };
            ch.map(|c| (c, end))
        });
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Convenience helpers
// ---------------------------------------------------------------------------

/// Find the `<body>` element and return its children, or return all nodes if
/// no `<body>` is present.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Body {
                return e.children.clone();
            }
            // Recurse into <html>
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes.to_vec()
}
