//! Pipeline – ties together fence stripping, style normalisation, parsing,
//! walking, layout and pagination into single function calls.
//!
//! The conversion half ([`convert_markup`], [`convert_to_deck`]) is pure and
//! total. Only the generation half talks to a [`ChatClient`] and can fail.

use crate::commands::PlacementCommand;
use crate::dom::{body_children, parse_html};
use crate::fence::strip_code_fence;
use crate::geometry::LayoutGeometry;
use crate::layout::compute_layout;
use crate::llm::{ChatClient, DEFAULT_MODEL};
use crate::nodes::MarkupNode;
use crate::pagination::{paginate, Deck};
use crate::prompt::{build_messages, PromptInput};
use crate::style::normalize_jsx_styles;
use crate::walker::walk;
use crate::{Error, Result};

/// Configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Deck title handed to writers (default: "slide-forge output").
    pub title: String,
    /// Model identifier for generation (default: `gpt-4o-mini`).
    pub model: String,
    pub geometry: LayoutGeometry,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: "slide-forge output".to_string(),
            model: DEFAULT_MODEL.to_string(),
            geometry: LayoutGeometry::default(),
        }
    }
}

/// Raw generated text → clean HTML fragment (fence removed, JSX styles
/// rewritten to plain `style="..."`).
pub fn clean_markup(raw: &str) -> String {
    normalize_jsx_styles(&strip_code_fence(raw))
}

/// Raw generated text → ordered layout nodes.
pub fn parse_fragment(raw: &str) -> Vec<MarkupNode> {
    let html = clean_markup(raw);
    let dom = parse_html(&html);
    let nodes = walk(&body_children(&dom));
    log::debug!("Walked {} layout node(s) from {} bytes", nodes.len(), html.len());
    nodes
}

/// Raw generated text → placement commands. Never fails; unusable content is
/// dropped or replaced by placeholders.
pub fn convert_markup(raw: &str, geometry: &LayoutGeometry) -> Vec<PlacementCommand> {
    compute_layout(&parse_fragment(raw), geometry)
}

/// Raw generated text → paginated deck.
pub fn convert_to_deck(raw: &str, config: &PipelineConfig) -> Deck {
    let commands = convert_markup(raw, &config.geometry);
    let deck = paginate(&commands, &config.geometry, &config.title);
    log::info!(
        "Laid out {} command(s) on {} page(s)",
        commands.len(),
        deck.pages.len()
    );
    deck
}

/// Ask the model for a fragment and return it cleaned.
///
/// Upstream failures are returned unchanged so their message reaches the
/// caller verbatim.
pub fn generate_markup(client: &dyn ChatClient, input: &PromptInput, model: &str) -> Result<String> {
    let messages = build_messages(input);
    let completion = client.complete(&messages, model)?;
    let text = completion.first_text().ok_or(Error::EmptyCompletion)?;
    if let Some(usage) = &completion.usage {
        log::info!("Model used {} token(s)", usage.total_tokens);
    }
    Ok(clean_markup(text))
}

/// Generate a fragment and lay it out as a deck.
pub fn generate_deck(client: &dyn ChatClient, input: &PromptInput, config: &PipelineConfig) -> Result<Deck> {
    let markup = generate_markup(client, input, &config.model)?;
    Ok(convert_to_deck(&markup, config))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::llm::{ChatCompletion, ChatMessage, Choice, Role, Usage};

    /// Returns a canned reply and records what it was asked.
    struct FakeClient {
        reply: std::result::Result<Vec<String>, String>,
        seen: RefCell<Vec<(Vec<ChatMessage>, String)>>,
    }

    impl FakeClient {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(vec![text.to_string()]),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatClient for FakeClient {
        fn complete(&self, messages: &[ChatMessage], model: &str) -> Result<ChatCompletion> {
            self.seen
                .borrow_mut()
                .push((messages.to_vec(), model.to_string()));
            match &self.reply {
                Ok(texts) => Ok(ChatCompletion {
                    choices: texts
                        .iter()
                        .map(|t| Choice {
                            message: ChatMessage::assistant(t.clone()),
                            finish_reason: Some("stop".to_string()),
                        })
                        .collect(),
                    usage: Some(Usage {
                        prompt_tokens: 1,
                        completion_tokens: 1,
                        total_tokens: 2,
                    }),
                }),
                Err(message) => Err(Error::Upstream(message.clone())),
            }
        }
    }

    #[test]
    fn pipeline_basic() {
        let commands = convert_markup("<h1>Hello</h1><p>World</p>", &LayoutGeometry::default());
        assert_eq!(commands.len(), 2);
        assert!(commands.iter().all(|c| !c.is_page_break()));
    }

    #[test]
    fn clean_markup_strips_fence_and_jsx() {
        let raw = "```html\n<p style={{ \"color\": \"#ff0000\" }}>Hi</p>\n```";
        assert_eq!(clean_markup(raw), r#"<p style="color: #ff0000;">Hi</p>"#);
    }

    #[test]
    fn wrapper_document_is_unwrapped() {
        let nodes = parse_fragment("<html><head></head><body><h2>Inside</h2></body></html>");
        assert_eq!(nodes, vec![MarkupNode::heading2("Inside")]);
    }

    #[test]
    fn garbage_input_yields_no_commands() {
        for raw in ["", "   ", "```", "<<<>>>", "</p></ul>", "plain text only"] {
            assert!(convert_markup(raw, &LayoutGeometry::default()).is_empty(), "{raw:?}");
        }
    }

    #[test]
    fn generate_markup_uses_model_and_cleans_reply() {
        let client = FakeClient::replying("```html\n<h1>Solar</h1>\n```");
        let markup = generate_markup(&client, &PromptInput::Theme("Solar".to_string()), "test-model").unwrap();
        assert_eq!(markup, "<h1>Solar</h1>");

        let seen = client.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, "test-model");
        assert_eq!(seen[0].0[0].role, Role::System);
        assert!(seen[0].0[0].content.contains("Solar"));
    }

    #[test]
    fn generate_deck_lays_out_reply() {
        let client = FakeClient::replying("<h1>Deck</h1><h2>Intro</h2><p>Body</p>");
        let config = PipelineConfig {
            title: "Deck".to_string(),
            ..PipelineConfig::default()
        };
        let deck = generate_deck(&client, &PromptInput::Theme("Deck".to_string()), &config).unwrap();
        assert_eq!(deck.title, "Deck");
        assert_eq!(deck.pages.len(), 1);
        assert_eq!(deck.pages[0].commands.len(), 3);
        assert_eq!(client.seen.borrow()[0].1, DEFAULT_MODEL);
    }

    #[test]
    fn upstream_error_is_surfaced_verbatim() {
        let client = FakeClient::failing("OpenAI API key is not configured");
        let err = generate_deck(&client, &PromptInput::Theme("x".to_string()), &PipelineConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API key is not configured");
    }

    #[test]
    fn empty_completion_is_an_error() {
        let client = FakeClient {
            reply: Ok(Vec::new()),
            seen: RefCell::new(Vec::new()),
        };
        let err = generate_markup(&client, &PromptInput::Theme("x".to_string()), "m").unwrap_err();
        assert!(matches!(err, Error::EmptyCompletion));
    }
}
