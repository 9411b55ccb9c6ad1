//! Layout engine – places markup nodes on fixed-geometry pages.
//!
//! A single [`Cursor`] walks down the page. Each node is placed whole at the
//! cursor, the cursor advances by a fixed or capped amount, and only then is
//! the page threshold checked: a node that runs past the bottom stays where
//! it started and the *next* node opens a new page. Nodes are never split.
//!
//! The engine is total: every node sequence produces a command sequence.
//! Content it cannot use (blank paragraphs, empty lists, unsupported image
//! schemes) is dropped; images that fail to resolve become placeholders.

use crate::commands::{
    BorderStyle, BulletKind, BulletList, Frame, ImageBlock, PlacementCommand, TableBlock,
    TableCellBlock, TextBlock, TextStyle,
};
use crate::geometry::{LayoutGeometry, TextMetrics};
use crate::images::{resolve_image, ImagePlacement};
use crate::nodes::{ImageNode, ListNode, MarkupNode, ParagraphNode, TableNode, TextNode};
use crate::style::StyleMap;

/// Transient layout position. One per layout run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// Zero-based page index.
    pub page: usize,
    /// Vertical offset on the current page, in inches.
    pub y: f64,
}

/// Lay out `nodes` and return the placement commands, pages separated by
/// [`PlacementCommand::PageBreak`].
pub fn compute_layout(nodes: &[MarkupNode], geometry: &LayoutGeometry) -> Vec<PlacementCommand> {
    LayoutEngine::new(geometry).run(nodes)
}

struct LayoutEngine<'a> {
    geometry: &'a LayoutGeometry,
    cursor: Cursor,
    commands: Vec<PlacementCommand>,
}

impl<'a> LayoutEngine<'a> {
    fn new(geometry: &'a LayoutGeometry) -> Self {
        Self {
            geometry,
            cursor: Cursor {
                page: 0,
                y: geometry.top_margin,
            },
            commands: Vec::new(),
        }
    }

    fn run(mut self, nodes: &[MarkupNode]) -> Vec<PlacementCommand> {
        // The first h1 is the deck title, placed before everything else.
        let title = nodes.iter().find_map(|n| match n {
            MarkupNode::Heading1(t) => Some(t),
            _ => None,
        });
        if let Some(title) = title {
            self.place_title(title);
        }

        for node in nodes {
            self.place(node);
            self.break_if_overflowing();
        }

        log::debug!(
            "Layout produced {} commands over {} page(s)",
            self.commands.len(),
            self.cursor.page + 1
        );
        self.commands
    }

    fn place(&mut self, node: &MarkupNode) {
        let geometry = self.geometry;
        match node {
            // Consumed as the title, or ignored when not the first.
            MarkupNode::Heading1(_) => {}
            MarkupNode::Heading2(t) => self.place_heading(t, &geometry.heading),
            MarkupNode::Heading3(t) => self.place_heading(t, &geometry.subheading),
            MarkupNode::Paragraph(p) => self.place_paragraph(p),
            MarkupNode::UnorderedList(l) => self.place_list(l, BulletKind::Glyph),
            MarkupNode::OrderedList(l) => self.place_list(l, BulletKind::Numeric),
            MarkupNode::Table(t) => self.place_table(t),
            MarkupNode::Image(i) => self.place_image(i),
        }
    }

    fn break_if_overflowing(&mut self) {
        if self.cursor.y > self.geometry.page_break_threshold {
            self.commands.push(PlacementCommand::PageBreak);
            self.cursor.page += 1;
            self.cursor.y = self.geometry.top_margin;
            log::debug!("Page break, now on page {}", self.cursor.page);
        }
    }

    fn frame(&self, width: f64, height: f64) -> Frame {
        Frame {
            x: self.geometry.margin_x,
            y: self.cursor.y,
            width,
            height,
        }
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    fn place_title(&mut self, title: &TextNode) {
        let geometry = self.geometry;
        let metrics = &geometry.title;
        let style = text_style(metrics, &title.style, metrics.bold, false);
        self.push_text(&title.text, metrics, style);
    }

    fn place_heading(&mut self, heading: &TextNode, metrics: &TextMetrics) {
        let style = text_style(metrics, &heading.style, metrics.bold, false);
        self.push_text(&heading.text, metrics, style);
    }

    fn place_paragraph(&mut self, p: &ParagraphNode) {
        if p.text.trim().is_empty() {
            return;
        }
        let geometry = self.geometry;
        let metrics = &geometry.paragraph;
        let style = text_style(metrics, &p.style, metrics.bold || p.bold, p.italic);
        self.push_text(&p.text, metrics, style);
    }

    fn push_text(&mut self, text: &str, metrics: &TextMetrics, style: TextStyle) {
        let frame = self.frame(self.geometry.content_width, metrics.height);
        self.commands.push(PlacementCommand::TextBlock(TextBlock {
            frame,
            text: text.to_string(),
            style,
        }));
        self.cursor.y += metrics.advance;
    }

    // -----------------------------------------------------------------------
    // Lists and tables
    // -----------------------------------------------------------------------

    fn place_list(&mut self, list: &ListNode, bullet: BulletKind) {
        if list.items.is_empty() {
            return;
        }
        let geometry = self.geometry;
        let metrics = &geometry.list;
        let stacked = list.items.len() as f64 * metrics.item_height;
        let height = stacked.min(metrics.max_height);
        let advance = (stacked + metrics.gap).min(metrics.max_height + metrics.gap);

        let frame = self.frame(geometry.content_width, height);
        self.commands.push(PlacementCommand::BulletList(BulletList {
            frame,
            items: list.items.clone(),
            bullet,
            style: TextStyle {
                font_size: metrics.font_size,
                bold: false,
                italic: false,
                color: override_color(&list.style, &metrics.color),
            },
        }));
        self.cursor.y += advance;
    }

    fn place_table(&mut self, table: &TableNode) {
        let rows: Vec<Vec<TableCellBlock>> = table
            .rows
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.iter()
                    .map(|cell| TableCellBlock {
                        text: cell.text.clone(),
                        bold: cell.header,
                    })
                    .collect()
            })
            .collect();
        if rows.is_empty() {
            return;
        }

        let geometry = self.geometry;
        let metrics = &geometry.table;
        let stacked = rows.len() as f64 * metrics.row_height;
        let height = stacked.min(metrics.max_height);
        let advance = (stacked + metrics.gap).min(metrics.max_height + metrics.gap);

        let frame = self.frame(geometry.content_width, height);
        self.commands.push(PlacementCommand::Table(TableBlock {
            frame,
            rows,
            font_size: metrics.font_size,
            color: metrics.color.clone(),
            border: BorderStyle {
                width: metrics.border_width,
                color: metrics.border_color.clone(),
            },
            fill: metrics.fill_color.clone(),
        }));
        self.cursor.y += advance;
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    fn place_image(&mut self, image: &ImageNode) {
        match resolve_image(image, &self.geometry.image) {
            ImagePlacement::Skip => {
                log::warn!("Skipping image with unsupported source: {:.80}", image.src);
            }
            ImagePlacement::Place {
                source,
                width,
                height,
            } => {
                let frame = self.frame(width, height);
                self.commands.push(PlacementCommand::Image(ImageBlock {
                    frame,
                    source,
                    alt: image.alt.clone(),
                }));
                self.cursor.y += height + self.geometry.image.gap;
            }
            ImagePlacement::Failed(reason) => {
                log::warn!("Image could not be placed, using placeholder: {reason}");
                self.place_placeholder(image.alt.as_deref());
            }
        }
    }

    fn place_placeholder(&mut self, alt: Option<&str>) {
        let geometry = self.geometry;
        let metrics = &geometry.placeholder;
        let frame = self.frame(metrics.width, metrics.height);
        self.commands.push(PlacementCommand::Placeholder(TextBlock {
            frame,
            text: format!("[Image: {}]", alt.unwrap_or("image failed to load")),
            style: TextStyle {
                font_size: metrics.font_size,
                bold: false,
                italic: false,
                color: metrics.color.clone(),
            },
        }));
        self.cursor.y += metrics.advance;
    }
}

fn text_style(metrics: &TextMetrics, inline: &StyleMap, bold: bool, italic: bool) -> TextStyle {
    TextStyle {
        font_size: metrics.font_size,
        bold,
        italic,
        color: override_color(inline, &metrics.color),
    }
}

/// Inline `color` when it is a hex colour, otherwise the default.
fn override_color(inline: &StyleMap, default: &str) -> String {
    inline
        .color()
        .map(|c| c.to_hex())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ImageSource;
    use crate::images::tests::tiny_png_data_uri;
    use crate::nodes::{ImageNode, TableCell};

    const EPS: f64 = 1e-9;

    fn geometry() -> LayoutGeometry {
        LayoutGeometry::default()
    }

    fn long_list() -> MarkupNode {
        MarkupNode::unordered_list((0..20).map(|i| format!("item {i}")))
    }

    fn page_breaks(commands: &[PlacementCommand]) -> usize {
        commands.iter().filter(|c| c.is_page_break()).count()
    }

    fn frame_y(command: &PlacementCommand) -> f64 {
        command.frame().map(|f| f.y).expect("command has a frame")
    }

    #[test]
    fn title_then_paragraph() {
        let g = geometry();
        let commands = compute_layout(
            &[MarkupNode::heading1("Title"), MarkupNode::paragraph("Hello")],
            &g,
        );
        assert_eq!(commands.len(), 2);

        let PlacementCommand::TextBlock(title) = &commands[0] else {
            panic!("expected title text block");
        };
        assert_eq!(title.text, "Title");
        assert_eq!(title.style.font_size, 32.0);
        assert!(title.style.bold);
        assert_eq!(
            title.frame,
            Frame {
                x: 0.5,
                y: 0.5,
                width: 9.0,
                height: 0.8
            }
        );

        let PlacementCommand::TextBlock(body) = &commands[1] else {
            panic!("expected body text block");
        };
        assert_eq!(body.text, "Hello");
        assert_eq!(body.style.font_size, 16.0);
        assert!(!body.style.bold && !body.style.italic);
        assert!((body.frame.y - 1.5).abs() < EPS);
    }

    #[test]
    fn only_first_h1_is_placed() {
        let commands = compute_layout(
            &[
                MarkupNode::heading2("Intro"),
                MarkupNode::heading1("Deck"),
                MarkupNode::heading1("Second"),
            ],
            &geometry(),
        );
        let texts: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                PlacementCommand::TextBlock(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Deck", "Intro"]);
    }

    #[test]
    fn heading_levels_use_their_metrics() {
        let commands = compute_layout(
            &[MarkupNode::heading2("A"), MarkupNode::heading3("B")],
            &geometry(),
        );
        let (PlacementCommand::TextBlock(h2), PlacementCommand::TextBlock(h3)) =
            (&commands[0], &commands[1])
        else {
            panic!("expected two text blocks");
        };
        assert_eq!((h2.style.font_size, h2.style.color.as_str()), (24.0, "363636"));
        assert_eq!((h3.style.font_size, h3.style.color.as_str()), (20.0, "555555"));
        assert!((h3.frame.y - 1.2).abs() < EPS);
    }

    #[test]
    fn paragraph_flags_and_color_override() {
        let mut p = ParagraphNode {
            text: "Styled".to_string(),
            bold: true,
            italic: true,
            ..ParagraphNode::default()
        };
        p.style.insert("color", "#1a365d");
        let commands = compute_layout(&[MarkupNode::Paragraph(p)], &geometry());
        let PlacementCommand::TextBlock(block) = &commands[0] else {
            panic!("expected text block");
        };
        assert!(block.style.bold && block.style.italic);
        assert_eq!(block.style.color, "1A365D");
    }

    #[test]
    fn blank_paragraph_emits_nothing_and_keeps_cursor() {
        let commands = compute_layout(
            &[MarkupNode::paragraph("  \n\t"), MarkupNode::heading2("Next")],
            &geometry(),
        );
        assert_eq!(commands.len(), 1);
        assert!((frame_y(&commands[0]) - 0.5).abs() < EPS);
    }

    #[test]
    fn empty_list_emits_nothing_and_keeps_cursor() {
        let commands = compute_layout(
            &[
                MarkupNode::unordered_list(Vec::<String>::new()),
                MarkupNode::paragraph("after"),
            ],
            &geometry(),
        );
        assert_eq!(commands.len(), 1);
        assert!((frame_y(&commands[0]) - 0.5).abs() < EPS);
    }

    #[test]
    fn list_height_is_capped() {
        let g = geometry();
        let commands = compute_layout(&[long_list(), MarkupNode::paragraph("next")], &g);
        let PlacementCommand::BulletList(list) = &commands[0] else {
            panic!("expected bullet list");
        };
        assert!(20.0 * g.list.item_height > g.list.max_height);
        assert_eq!(list.frame.height, g.list.max_height);
        assert_eq!(list.items.len(), 20);
        assert_eq!(list.bullet, BulletKind::Glyph);
        // Advance is capped too: 0.5 + 3.0 + 0.2
        assert!((frame_y(&commands[1]) - 3.7).abs() < EPS);
    }

    #[test]
    fn short_ordered_list_is_proportional() {
        let commands = compute_layout(
            &[
                MarkupNode::ordered_list(["a", "b", "c"]),
                MarkupNode::paragraph("next"),
            ],
            &geometry(),
        );
        let PlacementCommand::BulletList(list) = &commands[0] else {
            panic!("expected bullet list");
        };
        assert_eq!(list.bullet, BulletKind::Numeric);
        assert!((list.frame.height - 1.2).abs() < EPS);
        assert!((frame_y(&commands[1]) - (0.5 + 1.2 + 0.2)).abs() < EPS);
    }

    #[test]
    fn header_only_table() {
        let table = TableNode {
            rows: vec![vec![TableCell::header("Name"), TableCell::header("Value")]],
            ..TableNode::default()
        };
        let commands = compute_layout(&[MarkupNode::Table(table)], &geometry());
        assert_eq!(commands.len(), 1);
        let PlacementCommand::Table(block) = &commands[0] else {
            panic!("expected table");
        };
        assert_eq!(block.rows.len(), 1);
        assert!(block.rows[0].iter().all(|c| c.bold));
        assert!((block.frame.height - 0.5).abs() < EPS);
        assert_eq!(block.border.color, "CCCCCC");
        assert_eq!(block.fill, "F5F5F5");
    }

    #[test]
    fn table_without_cells_is_dropped() {
        let table = TableNode {
            rows: vec![vec![], vec![]],
            ..TableNode::default()
        };
        let commands = compute_layout(
            &[MarkupNode::Table(table), MarkupNode::paragraph("p")],
            &geometry(),
        );
        assert_eq!(commands.len(), 1);
        assert!((frame_y(&commands[0]) - 0.5).abs() < EPS);
    }

    #[test]
    fn tall_table_is_capped() {
        let rows = (0..12)
            .map(|i| vec![TableCell::body(format!("r{i}"))])
            .collect();
        let commands = compute_layout(
            &[
                MarkupNode::Table(TableNode {
                    rows,
                    ..TableNode::default()
                }),
                MarkupNode::paragraph("p"),
            ],
            &geometry(),
        );
        assert_eq!(commands[0].frame().unwrap().height, 3.0);
        assert!((frame_y(&commands[1]) - 3.8).abs() < EPS);
    }

    #[test]
    fn unsupported_image_scheme_is_skipped() {
        let commands = compute_layout(
            &[
                MarkupNode::image("ftp://example.com/a.png"),
                MarkupNode::paragraph("after"),
            ],
            &geometry(),
        );
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], PlacementCommand::TextBlock(_)));
        assert!((frame_y(&commands[0]) - 0.5).abs() < EPS);
    }

    #[test]
    fn remote_image_is_placed_and_advances() {
        let image = ImageNode {
            src: "http://example.com/chart.png".to_string(),
            width: Some(300.0),
            height: Some(200.0),
            ..ImageNode::default()
        };
        let commands = compute_layout(
            &[MarkupNode::Image(image), MarkupNode::paragraph("after")],
            &geometry(),
        );
        let PlacementCommand::Image(block) = &commands[0] else {
            panic!("expected image");
        };
        assert_eq!(
            block.source,
            ImageSource::Url("http://example.com/chart.png".to_string())
        );
        assert_eq!((block.frame.width, block.frame.height), (3.0, 2.0));
        assert!((frame_y(&commands[1]) - (0.5 + 2.0 + 0.2)).abs() < EPS);
    }

    #[test]
    fn inline_image_is_placed() {
        let commands = compute_layout(&[MarkupNode::image(tiny_png_data_uri())], &geometry());
        assert!(matches!(
            &commands[0],
            PlacementCommand::Image(ImageBlock {
                source: ImageSource::DataUri(_),
                ..
            })
        ));
    }

    #[test]
    fn broken_image_becomes_placeholder() {
        let image = ImageNode {
            src: "data:image/png;base64,@@@".to_string(),
            alt: Some("Sales chart".to_string()),
            ..ImageNode::default()
        };
        let commands = compute_layout(
            &[
                MarkupNode::Image(image),
                MarkupNode::image("data:image/png;base64,AAAA"),
                MarkupNode::paragraph("after"),
            ],
            &geometry(),
        );
        assert_eq!(commands.len(), 3);
        let PlacementCommand::Placeholder(first) = &commands[0] else {
            panic!("expected placeholder");
        };
        assert_eq!(first.text, "[Image: Sales chart]");
        assert_eq!(first.style.color, "999999");
        let PlacementCommand::Placeholder(second) = &commands[1] else {
            panic!("expected placeholder");
        };
        assert_eq!(second.text, "[Image: image failed to load]");
        assert!((frame_y(&commands[2]) - (0.5 + 0.4 + 0.4)).abs() < EPS);
    }

    #[test]
    fn page_breaks_follow_cumulative_advance() {
        // Each capped list advances 3.2: the second on a page pushes the
        // cursor to 6.9 > 6.5, so every second list ends a page.
        for n in 0..8 {
            let nodes: Vec<MarkupNode> = (0..n).map(|_| long_list()).collect();
            let commands = compute_layout(&nodes, &geometry());
            assert_eq!(page_breaks(&commands), n / 2, "{n} lists");
        }
    }

    #[test]
    fn overflowing_node_is_placed_whole_before_break() {
        let nodes = vec![long_list(), long_list(), MarkupNode::paragraph("next page")];
        let commands = compute_layout(&nodes, &geometry());
        assert_eq!(commands.len(), 4);
        // Second list starts at 3.7 and runs past the threshold, on page 0.
        assert!((frame_y(&commands[1]) - 3.7).abs() < EPS);
        assert!(commands[2].is_page_break());
        assert!((frame_y(&commands[3]) - 0.5).abs() < EPS);
    }

    #[test]
    fn commands_increase_in_y_within_each_page() {
        let mut nodes = vec![MarkupNode::heading1("Deck")];
        for i in 0..30 {
            nodes.push(MarkupNode::heading2(format!("Section {i}")));
            nodes.push(MarkupNode::paragraph(format!("Body {i}")));
            nodes.push(MarkupNode::unordered_list(["a", "b"]));
        }
        let commands = compute_layout(&nodes, &geometry());
        assert!(page_breaks(&commands) > 0);
        let mut last_y = f64::NEG_INFINITY;
        for command in &commands {
            match command.frame() {
                Some(frame) => {
                    assert!(frame.y > last_y);
                    last_y = frame.y;
                }
                None => last_y = f64::NEG_INFINITY,
            }
        }
    }

    #[test]
    fn alternate_geometry_changes_pagination() {
        let mut g = geometry();
        g.page_break_threshold = 1.0;
        g.top_margin = 0.25;
        let nodes = vec![
            MarkupNode::paragraph("one"),
            MarkupNode::paragraph("two"),
            MarkupNode::paragraph("three"),
        ];
        let commands = compute_layout(&nodes, &g);
        // 0.25 → 0.75 → 1.25 (break) → 0.75
        assert_eq!(page_breaks(&commands), 1);
        assert!(commands[2].is_page_break());
        assert!((frame_y(&commands[3]) - 0.25).abs() < EPS);
    }

    #[test]
    fn layout_is_deterministic() {
        let nodes = vec![
            MarkupNode::heading1("Deck"),
            long_list(),
            MarkupNode::image("https://example.com/x.png"),
            long_list(),
            MarkupNode::paragraph("end"),
        ];
        let g = geometry();
        assert_eq!(compute_layout(&nodes, &g), compute_layout(&nodes, &g));
    }
}
