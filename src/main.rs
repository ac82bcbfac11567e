use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, CommandFactory, Parser};
use log::LevelFilter;
use praisedeck::{Pipeline, PipelineConfig, Request};

#[derive(Parser, Debug)]
#[command(name = "praisedeck")]
#[command(
    version,
    about = "Assemble the weekly service deck from a title deck, song decks and the announcements"
)]
struct Cli {
    /// Deck whose first slide opens the service
    #[arg(value_name = "TITLE_DECK")]
    title_deck: Option<PathBuf>,

    /// Song decks, appended in order
    #[arg(value_name = "SONG_DECK")]
    song_decks: Vec<PathBuf>,

    /// Pipeline settings (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the deck here instead of next to the title deck
    #[arg(long, short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let Some(title_deck) = cli.title_deck else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if cli.output_dir.is_some() {
        config.output_dir = cli.output_dir;
    }

    let request = Request::new(title_deck, cli.song_decks);
    let output = Pipeline::new(config)
        .run(&request)
        .with_context(|| format!("Failed to build deck from {}", request.title_deck.display()))?;
    println!("Successfully created {}", output.display());
    Ok(())
}
