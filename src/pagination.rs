//! Pagination – groups a flat placement command stream into pages.
//!
//! The layout engine already decided where pages end; this module only cuts
//! the stream at each [`PlacementCommand::PageBreak`] and attaches the page
//! size the writers need.

use serde::{Deserialize, Serialize};

use crate::commands::PlacementCommand;
use crate::geometry::LayoutGeometry;

/// A complete deck ready for a writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Document title, used in writer metadata.
    #[serde(default = "Deck::default_title")]
    pub title: String,
    /// Page size in inches.
    pub page_width: f64,
    pub page_height: f64,
    /// Ordered list of pages.
    pub pages: Vec<SlidePage>,
}

/// One page (slide) of commands, none of which is a page break.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidePage {
    pub page_index: usize,
    pub commands: Vec<PlacementCommand>,
}

impl Deck {
    fn default_title() -> String {
        "slide-forge output".to_string()
    }

    /// All commands with page breaks re-inserted between pages.
    pub fn commands(&self) -> Vec<PlacementCommand> {
        let mut out = Vec::new();
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                out.push(PlacementCommand::PageBreak);
            }
            out.extend(page.commands.iter().cloned());
        }
        out
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Split `commands` at page breaks into a [`Deck`].
///
/// There is always at least one page. A trailing page break produces a
/// trailing empty page, mirroring what the layout engine asked for.
pub fn paginate(commands: &[PlacementCommand], geometry: &LayoutGeometry, title: &str) -> Deck {
    let mut pages = Vec::new();
    let mut current = SlidePage {
        page_index: 0,
        commands: Vec::new(),
    };

    for command in commands {
        if command.is_page_break() {
            let next = SlidePage {
                page_index: current.page_index + 1,
                commands: Vec::new(),
            };
            pages.push(std::mem::replace(&mut current, next));
        } else {
            current.commands.push(command.clone());
        }
    }
    pages.push(current);

    Deck {
        title: title.to_string(),
        page_width: geometry.page_width,
        page_height: geometry.page_height,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::nodes::MarkupNode;

    fn long_list() -> MarkupNode {
        MarkupNode::ordered_list((0..20).map(|i| format!("step {i}")))
    }

    #[test]
    fn single_page() {
        let g = LayoutGeometry::default();
        let commands = compute_layout(&[MarkupNode::paragraph("Short text")], &g);
        let deck = paginate(&commands, &g, "t");
        assert_eq!(deck.pages.len(), 1);
        assert_eq!(deck.pages[0].commands.len(), 1);
        assert_eq!((deck.page_width, deck.page_height), (10.0, 7.5));
    }

    #[test]
    fn empty_stream_has_one_empty_page() {
        let deck = paginate(&[], &LayoutGeometry::default(), "t");
        assert_eq!(deck.pages.len(), 1);
        assert!(deck.pages[0].commands.is_empty());
    }

    #[test]
    fn multiple_pages() {
        let g = LayoutGeometry::default();
        let nodes: Vec<MarkupNode> = (0..5).map(|_| long_list()).collect();
        let commands = compute_layout(&nodes, &g);
        let deck = paginate(&commands, &g, "t");
        // Lists 1-2, 3-4, 5.
        assert_eq!(deck.pages.len(), 3);
        assert_eq!(
            deck.pages.iter().map(|p| p.commands.len()).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert_eq!(deck.pages[2].page_index, 2);
        assert!(deck
            .pages
            .iter()
            .all(|p| p.commands.iter().all(|c| !c.is_page_break())));
    }

    #[test]
    fn trailing_break_gives_trailing_empty_page() {
        let g = LayoutGeometry::default();
        let commands = compute_layout(&[long_list(), long_list()], &g);
        assert!(commands.last().unwrap().is_page_break());
        let deck = paginate(&commands, &g, "t");
        assert_eq!(deck.pages.len(), 2);
        assert!(deck.pages[1].commands.is_empty());
    }

    #[test]
    fn commands_roundtrip_through_pages() {
        let g = LayoutGeometry::default();
        let nodes = vec![
            MarkupNode::heading1("Deck"),
            long_list(),
            long_list(),
            MarkupNode::paragraph("tail"),
        ];
        let commands = compute_layout(&nodes, &g);
        let deck = paginate(&commands, &g, "Deck");
        assert_eq!(deck.commands(), commands);
        assert_eq!(Deck::from_json(&deck.to_json().unwrap()).unwrap(), deck);
    }
}
