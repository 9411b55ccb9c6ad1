//! Style extractor – turns the JSX-style inline style objects emitted by the
//! generative model into plain CSS, and parses CSS declaration strings into
//! an order-preserving property map carried by markup nodes.
//!
//! Input shape handled by [`parse_style_object`]:
//!
//! ```text
//! "border": "1px solid #ddd", padding: "8px"
//! ```
//!
//! Keys are double-quoted string literals or bare identifiers, values are
//! always quoted strings. Anything else makes the whole block malformed,
//! which yields an empty map rather than an error.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Matches `style={{ ... }}` attributes in JSX-flavoured markup.
static JSX_STYLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"style=\{\{([^}]*)\}\}").unwrap());

// ---------------------------------------------------------------------------
// Style map
// ---------------------------------------------------------------------------

/// CSS property → value, in source order. Re-inserting a property keeps its
/// original position and replaces the value (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(IndexMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a CSS declaration list: `prop: value; prop2: value2;`.
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Hex colour from the `color` property, if it holds one.
    pub fn color(&self) -> Option<Color> {
        self.get("color").and_then(Color::from_hex)
    }
}

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Parse `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
            Some(Self { r, g, b, a: 1.0 })
        } else if hex.len() == 3 {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()? as f32 / 255.0;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()? as f32 / 255.0;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()? as f32 / 255.0;
            Some(Self { r, g, b, a: 1.0 })
        } else {
            None
        }
    }

    /// Uppercase `RRGGBB` without a leading `#`, the form deck formats use.
    pub fn to_hex(&self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the inside of a JSX style object (`{{` and `}}` already removed).
///
/// Malformed or empty input yields an empty map. Property names are passed
/// through unchanged.
pub fn parse_style_object(raw: &str) -> StyleMap {
    let mut scanner = ObjectScanner::new(raw);
    match scanner.parse_pairs() {
        Some(map) => map,
        None => {
            log::debug!("Ignoring malformed style object: {raw:?}");
            StyleMap::new()
        }
    }
}

/// Parse a CSS declaration list (`prop: value; ...`) into a map.
///
/// Declarations without a `:` are skipped.
pub fn parse_declarations(css: &str) -> StyleMap {
    let mut map = StyleMap::new();
    for decl in css.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((prop, val)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim();
        if prop.is_empty() {
            continue;
        }
        map.insert(prop, val.trim());
    }
    map
}

/// Rewrite every `style={{ ... }}` attribute into `style="prop: value;"`.
pub fn normalize_jsx_styles(html: &str) -> String {
    JSX_STYLE_REGEX
        .replace_all(html, |caps: &Captures| {
            let css = parse_style_object(&caps[1]).to_css();
            format!("style=\"{}\"", css.replace('"', "&quot;"))
        })
        .into_owned()
}

struct ObjectScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ObjectScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_pairs(&mut self) -> Option<StyleMap> {
        let mut map = StyleMap::new();
        loop {
            self.skip_whitespace();
            if self.eof() {
                return Some(map);
            }
            let key = self.parse_key()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_quoted()?;
            map.insert(key, value);

            self.skip_whitespace();
            if self.eof() {
                return Some(map);
            }
            // Trailing commas are fine; a missing one is not.
            self.expect(',')?;
        }
    }

    fn parse_key(&mut self) -> Option<String> {
        match self.current_char()? {
            '"' | '\'' => self.parse_quoted(),
            c if is_ident_char(c) => {
                let start = self.pos;
                while self.current_char().is_some_and(is_ident_char) {
                    self.advance();
                }
                Some(self.input[start..self.pos].to_string())
            }
            _ => None,
        }
    }

    fn parse_quoted(&mut self) -> Option<String> {
        let quote = self.current_char()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        self.advance();
        let start = self.pos;
        while self.current_char()? != quote {
            self.advance();
        }
        let value = self.input[start..self.pos].to_string();
        self.advance();
        Some(value)
    }

    fn expect(&mut self, c: char) -> Option<()> {
        if self.current_char()? == c {
            self.advance();
            Some(())
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_bare_keys() {
        let map = parse_style_object(r#" "border": "1px solid #ddd", padding: "8px" "#);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("border"), Some("1px solid #ddd"));
        assert_eq!(map.get("padding"), Some("8px"));
        assert_eq!(map.to_css(), "border: 1px solid #ddd; padding: 8px;");
    }

    #[test]
    fn duplicates_last_write_wins_in_first_position() {
        let map = parse_style_object(r#"color: "red", margin: "0", color: "blue""#);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("color"), Some("blue"));
        assert_eq!(map.to_css(), "color: blue; margin: 0;");
    }

    #[test]
    fn declaration_count_matches_pairs() {
        let map = parse_style_object(
            r#""a": "1", "b": "2", c: "3", "text-align": "left", fontSize: "12px","#,
        );
        assert_eq!(map.len(), 5);
        let css = map.to_css();
        assert_eq!(css.matches(';').count(), 5);
        assert!(css.starts_with("a: 1; b: 2; c: 3; text-align: left;"));
        // Unknown / camelCase names pass through.
        assert_eq!(map.get("fontSize"), Some("12px"));
    }

    #[test]
    fn malformed_yields_empty() {
        assert!(parse_style_object("").is_empty());
        assert!(parse_style_object("   ").is_empty());
        assert!(parse_style_object(r#"padding: 8"#).is_empty());
        assert!(parse_style_object(r#""color" "red""#).is_empty());
        assert!(parse_style_object(r#"color: "red" margin: "0""#).is_empty());
        assert!(parse_style_object(r#"color: "unterminated"#).is_empty());
    }

    #[test]
    fn normalize_rewrites_jsx_attributes() {
        let html = r#"<td style={{ "border": "1px solid #ddd", padding: "8px" }}>A</td>"#;
        assert_eq!(
            normalize_jsx_styles(html),
            r#"<td style="border: 1px solid #ddd; padding: 8px;">A</td>"#
        );
    }

    #[test]
    fn normalize_handles_many_and_malformed() {
        let html = r#"<p style={{color: "red"}}>a</p><p style={{ oops }}>b</p><p style="x: y">c</p>"#;
        assert_eq!(
            normalize_jsx_styles(html),
            r#"<p style="color: red;">a</p><p style="">b</p><p style="x: y">c</p>"#
        );
    }

    #[test]
    fn normalize_escapes_double_quotes() {
        let html = r#"<p style={{ fontFamily: '"Noto Sans", sans-serif' }}>x</p>"#;
        assert_eq!(
            normalize_jsx_styles(html),
            r#"<p style="fontFamily: &quot;Noto Sans&quot;, sans-serif;">x</p>"#
        );
    }

    #[test]
    fn css_declarations() {
        let map = parse_declarations("color: #ff0000; font-weight: bold;; bogus; : x");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("font-weight"), Some("bold"));
        assert!(map.color().is_some());
    }

    #[test]
    fn color_from_hex() {
        let c = Color::from_hex("#ff8800").unwrap();
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
        assert_eq!(c.to_hex(), "FF8800");
        assert_eq!(Color::from_hex("#abc").unwrap().to_hex(), "AABBCC");
        assert!(Color::from_hex("red").is_none());
        assert!(Color::from_hex("#12345").is_none());
    }
}
