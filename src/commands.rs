//! Placement commands – the intermediate representation between layout and
//! deck writing. This is the "frozen" structure that encodes exactly what
//! goes on each page and where.

use serde::{Deserialize, Serialize};

/// One instruction for the deck writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlacementCommand {
    TextBlock(TextBlock),
    BulletList(BulletList),
    Table(TableBlock),
    Image(ImageBlock),
    /// Stand-in text for an image that could not be placed.
    Placeholder(TextBlock),
    /// Everything after this belongs to the next page.
    PageBreak,
}

/// Page-relative rectangle, origin top-left, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Points.
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    /// `RRGGBB`.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub frame: Frame,
    pub text: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletKind {
    /// `•` bullets (`ul`).
    Glyph,
    /// `1.`, `2.`, ... (`ol`).
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletList {
    pub frame: Frame,
    pub items: Vec<String>,
    pub bullet: BulletKind,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBlock {
    pub frame: Frame,
    pub rows: Vec<Vec<TableCellBlock>>,
    pub font_size: f64,
    pub color: String,
    pub border: BorderStyle,
    /// Cell background, `RRGGBB`.
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCellBlock {
    pub text: String,
    /// Header cells render bold.
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    /// Points.
    pub width: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub frame: Frame,
    pub source: ImageSource,
    pub alt: Option<String>,
}

/// Where the writer gets image bytes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageSource {
    /// Inline `data:` URI, embedded as-is.
    DataUri(String),
    /// `http`/`https` URL; fetching is the writer's business.
    Url(String),
}

impl PlacementCommand {
    /// Placement rectangle; `None` for page breaks.
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            PlacementCommand::TextBlock(b) | PlacementCommand::Placeholder(b) => Some(&b.frame),
            PlacementCommand::BulletList(b) => Some(&b.frame),
            PlacementCommand::Table(b) => Some(&b.frame),
            PlacementCommand::Image(b) => Some(&b.frame),
            PlacementCommand::PageBreak => None,
        }
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self, PlacementCommand::PageBreak)
    }
}

impl ImageSource {
    pub fn as_str(&self) -> &str {
        match self {
            ImageSource::DataUri(s) | ImageSource::Url(s) => s,
        }
    }
}

/// Serialise a command stream to JSON.
pub fn commands_to_json(commands: &[PlacementCommand]) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(commands)?)
}

/// Deserialise a command stream from JSON.
pub fn commands_from_json(json: &str) -> crate::Result<Vec<PlacementCommand>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_break_has_no_frame() {
        assert!(PlacementCommand::PageBreak.frame().is_none());
        assert!(PlacementCommand::PageBreak.is_page_break());
    }

    #[test]
    fn json_uses_type_tags() {
        let commands = vec![
            PlacementCommand::TextBlock(TextBlock {
                frame: Frame {
                    x: 0.5,
                    y: 0.5,
                    width: 9.0,
                    height: 0.8,
                },
                text: "Title".to_string(),
                style: TextStyle {
                    font_size: 32.0,
                    bold: true,
                    italic: false,
                    color: "000000".to_string(),
                },
            }),
            PlacementCommand::PageBreak,
        ];
        let json = commands_to_json(&commands).unwrap();
        assert!(json.contains(r#""type": "text_block""#));
        assert!(json.contains(r#""type": "page_break""#));
        assert_eq!(commands_from_json(&json).unwrap(), commands);
    }
}
