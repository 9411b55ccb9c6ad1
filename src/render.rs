//! PDF deck writer – draws each slide page with `printpdf` (v0.8 ops-based
//! API). Intended as a preview of the placement commands, not a faithful
//! slide renderer: text is wrapped with an average glyph width and clipped to
//! its frame.

use std::collections::HashMap;
use std::io::Write;

use printpdf::*;

use crate::commands::{
    BulletKind, BulletList, Frame, ImageBlock, ImageSource, PlacementCommand, TableBlock,
    TextBlock, TextStyle,
};
use crate::images::{decode_data_uri, probe_dimensions};
use crate::pagination::Deck;
use crate::writer::DeckWriter;

const PT_PER_INCH: f64 = 72.0;
const MM_PER_INCH: f32 = 25.4;
/// Average Helvetica advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f64 = 0.5;
const LINE_SPACING: f64 = 1.2;
const CELL_PADDING_PT: f64 = 4.0;

/// Writes the deck as a PDF, one page per slide.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDeckWriter;

impl DeckWriter for PdfDeckWriter {
    fn format_name(&self) -> &'static str {
        "pdf"
    }

    fn write(&self, deck: &Deck, out: &mut dyn Write) -> crate::Result<()> {
        let bytes = render_pdf(deck)?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }
}

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Page-local drawing state: all coordinates handed in are deck inches,
/// origin top-left.
struct PageCanvas<'a> {
    ops: Vec<Op>,
    page_height_pt: f64,
    images: &'a HashMap<String, ImageResource>,
}

/// Render a deck into PDF bytes.
///
/// Images that are remote URLs or cannot be decoded are skipped with a
/// `log::warn`.
pub fn render_pdf(deck: &Deck) -> crate::Result<Vec<u8>> {
    if !(deck.page_width > 0.0 && deck.page_height > 0.0) {
        return Err(crate::Error::Render(format!(
            "Invalid page size {}×{} in",
            deck.page_width, deck.page_height
        )));
    }
    let page_w = Mm(deck.page_width as f32 * MM_PER_INCH);
    let page_h = Mm(deck.page_height as f32 * MM_PER_INCH);

    let mut doc = PdfDocument::new(&deck.title);
    let images = register_images(&mut doc, deck);

    let mut pages = Vec::with_capacity(deck.pages.len());
    for page in &deck.pages {
        let mut canvas = PageCanvas {
            ops: Vec::new(),
            page_height_pt: deck.page_height * PT_PER_INCH,
            images: &images,
        };
        for command in &page.commands {
            canvas.draw(command);
        }
        pages.push(PdfPage::new(page_w, page_h, canvas.ops));
    }

    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    log::debug!(
        "Rendered {} page(s), {} image(s), {} bytes",
        deck.pages.len(),
        images.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Decode every embedded image once and register it as an XObject.
fn register_images(doc: &mut PdfDocument, deck: &Deck) -> HashMap<String, ImageResource> {
    let mut resources = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    let blocks = deck.pages.iter().flat_map(|p| &p.commands).filter_map(|c| match c {
        PlacementCommand::Image(block) => Some(block),
        _ => None,
    });

    for block in blocks {
        let src = match &block.source {
            ImageSource::DataUri(src) => src,
            ImageSource::Url(url) => {
                log::warn!("Not embedding remote image {url:.80}; PDF preview only embeds data URIs");
                continue;
            }
        };
        if resources.contains_key(src) {
            continue;
        }
        let bytes = match decode_data_uri(src) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Skipping image: {e}");
                continue;
            }
        };
        let (px_width, px_height) = match probe_dimensions(&bytes) {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Skipping image: {e}");
                continue;
            }
        };
        let raw = match RawImage::decode_from_bytes(&bytes, &mut warnings) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping image: PDF encode error: {e}");
                continue;
            }
        };
        let xobj_id = doc.add_image(&raw);
        resources.insert(
            src.clone(),
            ImageResource {
                xobj_id,
                px_width,
                px_height,
            },
        );
    }
    resources
}

impl PageCanvas<'_> {
    fn draw(&mut self, command: &PlacementCommand) {
        match command {
            PlacementCommand::TextBlock(block) | PlacementCommand::Placeholder(block) => {
                self.draw_text_block(block)
            }
            PlacementCommand::BulletList(list) => self.draw_list(list),
            PlacementCommand::Table(table) => self.draw_table(table),
            PlacementCommand::Image(image) => self.draw_image(image),
            PlacementCommand::PageBreak => {}
        }
    }

    fn draw_text_block(&mut self, block: &TextBlock) {
        let frame = to_pt(&block.frame);
        let line_height = block.style.font_size * LINE_SPACING;
        let lines = wrap_text(&block.text, frame.width, block.style.font_size);
        for (i, line) in lines.iter().enumerate() {
            let top = frame.y + i as f64 * line_height;
            if i > 0 && top + line_height > frame.y + frame.height {
                log::debug!("Clipped text after {i} line(s): {:.40}", block.text);
                break;
            }
            self.text(frame.x, top, line, &block.style);
        }
    }

    fn draw_list(&mut self, list: &BulletList) {
        let frame = to_pt(&list.frame);
        let size = list.style.font_size;
        let line_height = size * LINE_SPACING;
        let indent = size * 1.5;
        let mut top = frame.y;

        for (n, item) in list.items.iter().enumerate() {
            if n > 0 && top + line_height > frame.y + frame.height {
                log::debug!("Clipped list after {n} item(s)");
                break;
            }
            let marker = match list.bullet {
                BulletKind::Glyph => "\u{2022}".to_string(),
                BulletKind::Numeric => format!("{}.", n + 1),
            };
            self.text(frame.x, top, &marker, &list.style);
            let first_line = wrap_text(item, frame.width - indent, size)
                .into_iter()
                .next()
                .unwrap_or_default();
            self.text(frame.x + indent, top, &first_line, &list.style);
            top += line_height;
        }
    }

    fn draw_table(&mut self, table: &TableBlock) {
        let frame = to_pt(&table.frame);
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let col_width = frame.width / columns as f64;
        let row_height = frame.height / table.rows.len() as f64;

        for (r, row) in table.rows.iter().enumerate() {
            for c in 0..columns {
                let cell = Frame {
                    x: frame.x + c as f64 * col_width,
                    y: frame.y + r as f64 * row_height,
                    width: col_width,
                    height: row_height,
                };
                self.fill_rect(&cell, &table.fill);
                self.stroke_rect(&cell, &table.border.color, table.border.width);

                let Some(content) = row.get(c) else { continue };
                let style = TextStyle {
                    font_size: table.font_size,
                    bold: content.bold,
                    italic: false,
                    color: table.color.clone(),
                };
                let line = wrap_text(&content.text, col_width - 2.0 * CELL_PADDING_PT, table.font_size)
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                let text_top = cell.y + ((row_height - table.font_size) / 2.0).max(0.0);
                self.text(cell.x + CELL_PADDING_PT, text_top, &line, &style);
            }
        }
    }

    fn draw_image(&mut self, image: &ImageBlock) {
        let Some(res) = self.images.get(image.source.as_str()) else {
            return;
        };
        let frame = to_pt(&image.frame);
        // At dpi=72 printpdf renders 1 px = 1 pt.
        let scale_x = if res.px_width > 0 {
            frame.width / res.px_width as f64
        } else {
            1.0
        };
        let scale_y = if res.px_height > 0 {
            frame.height / res.px_height as f64
        } else {
            1.0
        };
        let bottom = self.flip(frame.y + frame.height);
        self.ops.push(Op::UseXobject {
            id: res.xobj_id.clone(),
            transform: XObjectTransform {
                translate_x: Some(Pt(frame.x as f32)),
                translate_y: Some(Pt(bottom)),
                dpi: Some(72.0),
                scale_x: Some(scale_x as f32),
                scale_y: Some(scale_y as f32),
                rotate: None,
            },
        });
    }

    /// One line of text whose top edge sits at `top` (pt from page top).
    fn text(&mut self, x: f64, top: f64, text: &str, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let font = match (style.bold, style.italic) {
            (true, true) => BuiltinFont::HelveticaBoldOblique,
            (true, false) => BuiltinFont::HelveticaBold,
            (false, true) => BuiltinFont::HelveticaOblique,
            (false, false) => BuiltinFont::Helvetica,
        };
        // Baseline ≈ top of line + ascender (approx 0.75 × font_size)
        let baseline = self.flip(top + style.font_size * 0.75);

        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(x as f32),
                y: Pt(baseline),
            },
        });
        self.ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(style.font_size as f32),
            font,
        });
        self.ops.push(Op::SetFillColor {
            col: rgb(&style.color),
        });
        self.ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(to_winlatin(text))],
            font,
        });
        self.ops.push(Op::EndTextSection);
    }

    fn fill_rect(&mut self, frame: &Frame, color: &str) {
        let points = self.corners(frame);
        self.ops.push(Op::SetFillColor { col: rgb(color) });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing { points }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn stroke_rect(&mut self, frame: &Frame, color: &str, width: f64) {
        let points = self.corners(frame);
        self.ops.push(Op::SetOutlineColor { col: rgb(color) });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(width as f32),
        });
        self.ops.push(Op::DrawLine {
            line: Line {
                points,
                is_closed: true,
            },
        });
    }

    fn corners(&self, frame: &Frame) -> Vec<LinePoint> {
        let (x1, x2) = (frame.x as f32, (frame.x + frame.width) as f32);
        let (top, bottom) = (self.flip(frame.y), self.flip(frame.y + frame.height));
        [(x1, top), (x2, top), (x2, bottom), (x1, bottom)]
            .into_iter()
            .map(|(x, y)| LinePoint {
                p: Point { x: Pt(x), y: Pt(y) },
                bezier: false,
            })
            .collect()
    }

    /// Top-left origin → PDF bottom-left origin.
    fn flip(&self, y_from_top: f64) -> f32 {
        (self.page_height_pt - y_from_top) as f32
    }
}

fn to_pt(frame: &Frame) -> Frame {
    Frame {
        x: frame.x * PT_PER_INCH,
        y: frame.y * PT_PER_INCH,
        width: frame.width * PT_PER_INCH,
        height: frame.height * PT_PER_INCH,
    }
}

fn rgb(hex: &str) -> Color {
    let c = crate::style::Color::from_hex(hex).unwrap_or(crate::style::Color::BLACK);
    Color::Rgb(Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
        icc_profile: None,
    })
}

/// Greedy word wrap using an average glyph width. Never returns an empty
/// list for non-empty input; words wider than the line get a line of their
/// own.
fn wrap_text(text: &str, max_width_pt: f64, font_size: f64) -> Vec<String> {
    let max_chars = ((max_width_pt / (font_size * AVG_GLYPH_WIDTH)).floor() as usize).max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\u{00A0}' => 0x20,
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}
