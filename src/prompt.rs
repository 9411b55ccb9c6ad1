//! Prompt assembly for the generative model.
//!
//! The system prompt fixes the shape of the fragment we expect back (the tag
//! whitelist the walker understands, JSX-style inline styles, no wrappers).
//! The `{{theme}}` placeholder is replaced at every occurrence.

use crate::llm::ChatMessage;

/// Placeholder substituted with the presentation theme.
pub const THEME_PLACEHOLDER: &str = "{{theme}}";

const SYSTEM_PROMPT: &str = r#"You are an assistant that writes HTML (JSX-compatible) fragments which are converted into presentation slides.

Write a fragment about the theme below, structured so it converts cleanly into a slide deck.

# Theme

- Theme: "{{theme}}"

# Output format (important)

- Output the HTML/JSX fragment only. No explanations, no comments.
- Do not output wrapper elements such as `<html>`, `<head>`, `<body>` or `<div>`.
- The fragment must contain:
  - `<h1>`: the overall title (exactly one)
  - `<h2>`: sections (at least 2)
  - `<h3>`: subheadings (at least 1)
  - `<p>`: body text for each section
  - `<ul><li>`: bullet points
  - `<ol><li>`: steps
  - `<table>` with `<thead>` and `<tbody>`, 3 to 5 rows
  - `<strong>` and `<em>`: emphasis on key phrases

# Style rules (required)

- Write inline styles in React/JSX form: `style={{ ... }}`.
  - Example: `style={{ "border": "1px solid #ddd", "padding": "8px" }}`
- Give every `<td>` and `<th>` a minimal border and padding where possible.
- Use double quotes inside the object. CSS keys do not need to be camelCase.

# Suggested structure

1. `<h1>`: presentation title
2. Introduction (`<h2>` + `<p>`)
3. Key features (`<ul>`)
4. Details (`<h3>` + `<p>` + `<strong>` / `<em>`)
5. Data table (`<table>`)
6. Next steps (`<ol>`)
7. Closing summary `<p>`

# Tone

- Business register
- 1 to 3 sentences per section
- Concrete content that fits the theme "{{theme}}"

# Forbidden

- Meta text such as "Here is the HTML" or Markdown code fences
- `<script>` or `<style>` elements
- External link URLs (images may be written as `<img alt="..." />`)

Output only an HTML/JSX fragment that satisfies every rule above."#;

/// What the user handed us to build a deck from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    /// Short theme; the model writes all content.
    Theme(String),
    /// Free-form draft; the model restructures it into slide markup.
    Draft {
        /// Theme used in the system prompt.
        theme: String,
        text: String,
    },
}

impl PromptInput {
    pub fn theme(&self) -> &str {
        match self {
            PromptInput::Theme(theme) | PromptInput::Draft { theme, .. } => theme,
        }
    }
}

/// Replace every `{{theme}}` in the system prompt.
pub fn system_prompt(theme: &str) -> String {
    SYSTEM_PROMPT.replace(THEME_PLACEHOLDER, theme.trim())
}

/// System + user messages for one generation request.
pub fn build_messages(input: &PromptInput) -> Vec<ChatMessage> {
    let theme = input.theme().trim();
    let user = match input {
        PromptInput::Theme(_) => format!(
            "Generate an HTML fragment about the theme \"{theme}\" that converts cleanly into slides."
        ),
        PromptInput::Draft { text, .. } => format!(
            "Restructure the following draft about \"{theme}\" into an HTML fragment that \
             converts cleanly into slides. Keep its facts; do not invent figures.\n\n\
             <draft>\n{}\n</draft>",
            text.trim()
        ),
    };
    vec![ChatMessage::system(system_prompt(theme)), ChatMessage::user(user)]
}
