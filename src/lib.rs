//! # slide-forge – generated HTML fragment → slide deck pipeline
//!
//! This crate turns the HTML-like fragments a generative model writes into a
//! deterministic sequence of page-relative placement commands, then hands
//! them to a deck writer. The pipeline stages are:
//!
//! 1. **Clean** – strip a Markdown code fence ([`fence`]) and rewrite JSX
//!    `style={{ ... }}` attributes ([`style`])
//! 2. **Parse** – fragment → DOM tree ([`dom`])
//! 3. **Walk** – DOM tree → ordered layout nodes ([`walker`], [`nodes`])
//! 4. **Layout** – nodes → placement commands with page breaks ([`layout`])
//! 5. **Paginate** – group commands per slide ([`pagination`])
//! 6. **Write** – JSON or PDF output ([`writer`], [`render`])
//!
//! Generation ([`prompt`], [`llm`]) sits in front of stage 1 and is the only
//! part that performs I/O.

pub mod commands;
pub mod dom;
pub mod error;
pub mod fence;
pub mod geometry;
pub mod images;
pub mod layout;
pub mod llm;
pub mod nodes;
pub mod pagination;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod style;
pub mod templates;
pub mod walker;
pub mod writer;

// Re-exports for convenience
pub use commands::PlacementCommand;
pub use error::{Error, Result};
pub use geometry::LayoutGeometry;
pub use layout::compute_layout;
pub use pagination::{paginate, Deck};
pub use pipeline::{convert_markup, convert_to_deck, generate_deck, generate_markup, PipelineConfig};
