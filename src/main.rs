//! slideforge – command-line HTML fragment → slide deck converter.
//!
//! Usage:
//!   slideforge convert <input.html> [-o out.pdf] [--format json|pdf] [--geometry g.json]
//!   slideforge generate --theme "Remote work" [--model gpt-4o-mini] [-o deck.pdf]
//!   slideforge generate --draft notes.txt --theme "Q3 review"
//!   slideforge demo [--template business] [-o demo.pdf]
//!
//! If `-o` is omitted the deck is written next to the input file with the same
//! stem (e.g. `slides.html` → `slides.pdf`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use slide_forge::geometry::LayoutGeometry;
use slide_forge::pagination::Deck;
use slide_forge::pipeline::{convert_to_deck, PipelineConfig};
use slide_forge::render::PdfDeckWriter;
use slide_forge::templates::all_templates;
use slide_forge::writer::{DeckWriter, JsonDeckWriter};

/// Lay out generated HTML fragments as slide decks.
#[derive(Parser, Debug)]
#[command(name = "slideforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an HTML fragment file into a deck
    Convert {
        /// HTML fragment to convert (fenced or JSX-styled input is accepted)
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Ask the model for a fragment, then convert it
    Generate {
        /// Presentation theme
        #[arg(short, long)]
        theme: String,

        /// Draft text file to restructure instead of writing from scratch
        #[arg(short, long)]
        draft: Option<PathBuf>,

        /// Model identifier
        #[arg(short, long, default_value = slide_forge::llm::DEFAULT_MODEL)]
        model: String,

        /// Also save the cleaned fragment next to the deck
        #[arg(long)]
        save_markup: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render a bundled sample fragment
    Demo {
        /// Template name
        #[arg(short = 'n', long, default_value = "business")]
        template: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output path (default: derived from the input name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// JSON file overriding layout geometry fields
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// Deck title (default: input file stem)
    #[arg(long)]
    title: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Pdf,
}

impl Format {
    fn writer(self) -> Box<dyn DeckWriter> {
        match self {
            Format::Json => Box::new(JsonDeckWriter),
            Format::Pdf => Box::new(PdfDeckWriter),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Pdf => "pdf",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Command::Convert { input, output } => {
            let html = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let config = pipeline_config(&output, &input, None)?;
            let deck = convert_to_deck(&html, &config);
            write_deck(&deck, &output, &input)
        }
        Command::Generate {
            theme,
            draft,
            model,
            save_markup,
            output,
        } => generate(theme, draft, model, save_markup, output),
        Command::Demo { template, output } => {
            let Some((name, html)) = all_templates().into_iter().find(|(n, _)| *n == template) else {
                let names: Vec<_> = all_templates().into_iter().map(|(n, _)| n).collect();
                bail!("Unknown template '{template}' (available: {})", names.join(", "));
            };
            let stem = PathBuf::from(format!("demo-{name}"));
            let config = pipeline_config(&output, &stem, None)?;
            let deck = convert_to_deck(&html, &config);
            write_deck(&deck, &output, &stem)
        }
    }
}

#[cfg(feature = "openai")]
fn generate(
    theme: String,
    draft: Option<PathBuf>,
    model: String,
    save_markup: bool,
    output: OutputArgs,
) -> Result<()> {
    use slide_forge::llm::OpenAiClient;
    use slide_forge::pipeline::generate_markup;
    use slide_forge::prompt::PromptInput;

    let input = match &draft {
        Some(path) => PromptInput::Draft {
            theme: theme.clone(),
            text: fs::read_to_string(path)
                .with_context(|| format!("Failed to read draft {}", path.display()))?,
        },
        None => PromptInput::Theme(theme.clone()),
    };

    let client = OpenAiClient::from_env()?;
    let stem = draft.clone().unwrap_or_else(|| PathBuf::from(slug(&theme)));
    let config = pipeline_config(&output, &stem, Some(model))?;

    let markup = generate_markup(&client, &input, &config.model).context("Generation failed")?;
    if save_markup {
        let path = output_path(&output, &stem).with_extension("html");
        fs::write(&path, &markup).with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote fragment '{}'", path.display());
    }

    let deck = convert_to_deck(&markup, &config);
    write_deck(&deck, &output, &stem)
}

#[cfg(not(feature = "openai"))]
fn generate(
    _theme: String,
    _draft: Option<PathBuf>,
    _model: String,
    _save_markup: bool,
    _output: OutputArgs,
) -> Result<()> {
    bail!("slideforge was built without the `openai` feature; `generate` is unavailable")
}

fn pipeline_config(output: &OutputArgs, stem_source: &Path, model: Option<String>) -> Result<PipelineConfig> {
    let geometry = match &output.geometry {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read geometry {}", path.display()))?;
            LayoutGeometry::from_json(&json)
                .with_context(|| format!("Invalid geometry file {}", path.display()))?
        }
        None => LayoutGeometry::default(),
    };

    // Default title: stem of the input filename.
    let default_title = stem_source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("slide-forge output")
        .to_string();

    let mut config = PipelineConfig {
        title: output.title.clone().unwrap_or(default_title),
        geometry,
        ..PipelineConfig::default()
    };
    if let Some(model) = model {
        config.model = model;
    }
    Ok(config)
}

fn output_path(output: &OutputArgs, stem_source: &Path) -> PathBuf {
    output.output.clone().unwrap_or_else(|| {
        let mut o = stem_source.to_path_buf();
        o.set_extension(output.format.extension());
        o
    })
}

fn write_deck(deck: &Deck, output: &OutputArgs, stem_source: &Path) -> Result<()> {
    let path = output_path(output, stem_source);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    let writer = output.format.writer();
    let bytes = writer
        .write_to_vec(deck)
        .with_context(|| format!("Failed to render {} deck", writer.format_name()))?;
    fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    let pages = deck.pages.len();
    eprintln!(
        "Wrote '{}' ({} bytes, {} slide{})",
        path.display(),
        bytes.len(),
        pages,
        if pages == 1 { "" } else { "s" }
    );
    Ok(())
}

/// File-name-safe version of a theme.
#[cfg_attr(not(feature = "openai"), allow(dead_code))]
fn slug(theme: &str) -> String {
    let slug: String = theme
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let slug = slug.split('-').filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-");
    if slug.is_empty() {
        "deck".to_string()
    } else {
        slug
    }
}
