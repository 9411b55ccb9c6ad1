//! Layout geometry – every margin, height, cap and font size the layout
//! engine uses, gathered in one serialisable record.
//!
//! All lengths are in inches (the deck format's page unit); font sizes are in
//! points. The defaults describe a 10 × 7.5 in slide.

use serde::{Deserialize, Serialize};

/// Geometry and typography for one layout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutGeometry {
    /// Physical page size, used by writers.
    pub page_width: f64,
    pub page_height: f64,

    /// Left edge of every block.
    pub margin_x: f64,
    /// Cursor position at the top of each page.
    pub top_margin: f64,
    /// Width of full-width text blocks, lists and tables.
    pub content_width: f64,
    /// Once the cursor passes this, the next node starts a new page.
    pub page_break_threshold: f64,

    pub title: TextMetrics,
    pub heading: TextMetrics,
    pub subheading: TextMetrics,
    pub paragraph: TextMetrics,

    pub list: BlockMetrics,
    pub table: TableMetrics,
    pub image: ImageMetrics,
    pub placeholder: PlaceholderMetrics,
}

/// Fixed-size text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMetrics {
    pub height: f64,
    /// Cursor advance after the block.
    pub advance: f64,
    pub font_size: f64,
    pub bold: bool,
    /// `RRGGBB`.
    pub color: String,
}

/// Block whose height grows per item up to a cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMetrics {
    /// Height per list item.
    pub item_height: f64,
    pub max_height: f64,
    /// Space added after the block.
    pub gap: f64,
    pub font_size: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetrics {
    pub row_height: f64,
    pub max_height: f64,
    pub gap: f64,
    pub font_size: f64,
    pub color: String,
    pub border_color: String,
    /// Border width in points.
    pub border_width: f64,
    pub fill_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetrics {
    /// Pixels per inch when converting intrinsic size.
    pub pixel_divisor: f64,
    pub max_width: f64,
    pub max_height: f64,
    pub gap: f64,
    /// Used when the markup gives no size and none can be probed.
    pub default_width_px: f64,
    pub default_height_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderMetrics {
    pub width: f64,
    pub height: f64,
    pub advance: f64,
    pub font_size: f64,
    pub color: String,
}

impl Default for LayoutGeometry {
    fn default() -> Self {
        Self {
            page_width: 10.0,
            page_height: 7.5,
            margin_x: 0.5,
            top_margin: 0.5,
            content_width: 9.0,
            page_break_threshold: 6.5,
            title: TextMetrics {
                height: 0.8,
                advance: 1.0,
                font_size: 32.0,
                bold: true,
                color: "000000".to_string(),
            },
            heading: TextMetrics {
                height: 0.6,
                advance: 0.7,
                font_size: 24.0,
                bold: true,
                color: "363636".to_string(),
            },
            subheading: TextMetrics {
                height: 0.5,
                advance: 0.6,
                font_size: 20.0,
                bold: true,
                color: "555555".to_string(),
            },
            paragraph: TextMetrics {
                height: 0.4,
                advance: 0.5,
                font_size: 16.0,
                bold: false,
                color: "000000".to_string(),
            },
            list: BlockMetrics::default(),
            table: TableMetrics::default(),
            image: ImageMetrics::default(),
            placeholder: PlaceholderMetrics::default(),
        }
    }
}

impl Default for BlockMetrics {
    fn default() -> Self {
        Self {
            item_height: 0.4,
            max_height: 3.0,
            gap: 0.2,
            font_size: 16.0,
            color: "000000".to_string(),
        }
    }
}

impl Default for TableMetrics {
    fn default() -> Self {
        Self {
            row_height: 0.5,
            max_height: 3.0,
            gap: 0.3,
            font_size: 14.0,
            color: "000000".to_string(),
            border_color: "CCCCCC".to_string(),
            border_width: 1.0,
            fill_color: "F5F5F5".to_string(),
        }
    }
}

impl Default for ImageMetrics {
    fn default() -> Self {
        Self {
            pixel_divisor: 100.0,
            max_width: 4.0,
            max_height: 3.0,
            gap: 0.2,
            default_width_px: 400.0,
            default_height_px: 300.0,
        }
    }
}

impl Default for PlaceholderMetrics {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 0.3,
            advance: 0.4,
            font_size: 12.0,
            color: "999999".to_string(),
        }
    }
}

impl LayoutGeometry {
    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_named_fields_only() {
        let geometry =
            LayoutGeometry::from_json(r#"{ "page_break_threshold": 4.0, "list": { "item_height": 0.3, "max_height": 1.5, "gap": 0.1, "font_size": 14.0, "color": "111111" } }"#)
                .unwrap();
        assert_eq!(geometry.page_break_threshold, 4.0);
        assert_eq!(geometry.list.max_height, 1.5);
        assert_eq!(geometry.top_margin, 0.5);
        assert_eq!(geometry.table, TableMetrics::default());
    }

    #[test]
    fn json_roundtrip() {
        let geometry = LayoutGeometry::default();
        let parsed = LayoutGeometry::from_json(&geometry.to_json()).unwrap();
        assert_eq!(parsed, geometry);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(LayoutGeometry::from_json("{ nope").is_err());
    }
}
