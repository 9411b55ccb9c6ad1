//! Deck writers – turn a [`Deck`] into an output format.
//!
//! The layout engine never depends on a concrete slide format. Anything that
//! can consume placement commands implements [`DeckWriter`].

use std::io::Write;

use crate::pagination::Deck;
use crate::Result;

/// A sink for a laid-out deck.
pub trait DeckWriter {
    /// Short format name, used by the CLI and in log lines.
    fn format_name(&self) -> &'static str;

    /// Write `deck` to `out`.
    fn write(&self, deck: &Deck, out: &mut dyn Write) -> Result<()>;

    /// Write `deck` into an in-memory buffer.
    fn write_to_vec(&self, deck: &Deck) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(deck, &mut buf)?;
        Ok(buf)
    }
}

/// Writes the deck as pretty-printed JSON, the lossless interchange form.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeckWriter;

impl DeckWriter for JsonDeckWriter {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn write(&self, deck: &Deck, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, deck)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
