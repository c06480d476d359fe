//! CLI tool for generating presentation decks to improvise a talk with.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use talk_core::schemas::{self, SCHEMA_NAMES};
use talk_core::{GeneratorRegistry, OutlineFormatter, Presentation};
use talk_export::DeckWriter;
use talk_sources::SourceConfig;

/// Environment variable holding the Giphy API key.
const GIPHY_API_KEY_VAR: &str = "GIPHY_API_KEY";

/// Generate a random slide deck about a topic.
#[derive(Parser, Debug)]
#[command(name = "talk-gen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topic of the talk
    #[arg(short, long, default_value = "cat")]
    topic: String,

    /// Number of slides to generate
    #[arg(short, long, default_value = "10")]
    num_slides: usize,

    /// Presentation schema to use
    #[arg(short, long, default_value = "default")]
    schema: String,

    /// Presenter name (random when absent)
    #[arg(short, long)]
    presenter: Option<String>,

    /// Folder to save the deck into
    #[arg(short, long, default_value = "./output/")]
    output_folder: PathBuf,

    /// Save the deck to the output folder
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    save: bool,

    /// Open the saved deck afterwards
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    open: bool,

    /// Folder caching downloaded images
    #[arg(short, long, default_value = "./downloads/")]
    downloads: PathBuf,

    /// Seed making the talk reproducible for the same sources
    #[arg(long)]
    seed: Option<u64>,

    /// Print an outline of the deck to stdout
    #[arg(long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let presentation = generate(&args)?;

    if args.verbose {
        eprintln!(
            "Generated {} slides about '{}' for {}",
            presentation.slides.len(),
            presentation.topic,
            presentation.presenter
        );
    }
    for gap in &presentation.gaps {
        eprintln!(
            "Slide {}: no generator could fill it (tried {})",
            gap.index + 1,
            gap.attempted.join(", ")
        );
    }

    if args.print {
        let formatter = OutlineFormatter::new().with_generators(args.verbose);
        print!("{}", formatter.format_with_newline(&presentation));
    }

    if args.save {
        let path = save(&presentation, &args.output_folder)?;
        if args.verbose {
            eprintln!("Written to: {}", path.display());
        }
        if args.open {
            open_deck(&path);
        }
    }

    Ok(())
}

/// Build the sources and schema, then generate the deck.
fn generate(args: &Args) -> Result<Presentation> {
    let api_key = std::env::var(GIPHY_API_KEY_VAR).ok();
    let config = SourceConfig::default().with_giphy_api_key(api_key);
    let sources = talk_sources::online(&config).context("Failed to set up content sources")?;

    let registry =
        GeneratorRegistry::load(sources, &args.downloads).context("Failed to load bundled text data")?;
    let schema = schemas::by_name(&args.schema, &registry)
        .with_context(|| format!("Available schemas: {}", SCHEMA_NAMES.join(", ")))?;

    let presenter = match &args.presenter {
        Some(presenter) => presenter.clone(),
        None => {
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            registry.random_presenter(&mut rng)
        }
    };

    log::info!(
        "Generating {} slides about '{}' with schema '{}'",
        args.num_slides,
        args.topic,
        args.schema
    );

    let presentation = match args.seed {
        Some(seed) => schema.generate_presentation_with_seed(&args.topic, args.num_slides, &presenter, seed),
        None => schema.generate_presentation(&args.topic, args.num_slides, &presenter),
    };
    presentation.with_context(|| format!("Failed to generate a talk about '{}'", args.topic))
}

/// Save the deck under a name derived from its topic.
fn save(presentation: &Presentation, output_folder: &Path) -> Result<PathBuf> {
    DeckWriter::new()
        .save_default(presentation, output_folder)
        .with_context(|| format!("Failed to save deck into {}", output_folder.display()))
}

/// Open the saved deck with the system's default application.
fn open_deck(path: &Path) {
    if let Err(e) = open::that(path) {
        log::warn!("Could not open {}: {}", path.display(), e);
    }
}
