use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use game_record::{
    ExtractionMethod, Pipeline,
    config::{Overrides, ProcessEnv, SelectionPolicy, Settings},
    search::{CandidateSelector, ConsoleSelector, TopRanked},
};

/// Resolve a localized game title to its English name and catalog metadata.
#[derive(Parser, Debug)]
#[command(name = "game-record", version, about)]
struct Cli {
    /// Localized game title, e.g. 泰坦陨落2
    title: String,

    /// API key for the name-resolution model
    #[arg(long)]
    api_key: Option<String>,

    /// API base URL for the name-resolution model
    #[arg(long)]
    api_base: Option<String>,

    /// Model (or Azure deployment) for name resolution
    #[arg(long)]
    model: Option<String>,

    /// JSON config file (default: ./config.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extraction strategy order: standard, assisted or heuristic
    #[arg(long)]
    method: Option<ExtractionMethod>,

    /// Choose among several candidates interactively
    #[arg(short, long)]
    interactive: bool,

    /// Debug logging on stderr
    #[arg(long)]
    debug: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.json_logs);

    match run(cli).await {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "game_record=debug,warn" } else { "warn" }));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<String> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(method) = cli.method {
        settings.extraction.method = method;
    }

    let selector: Box<dyn CandidateSelector> =
        if cli.interactive || settings.search.selection == SelectionPolicy::Interactive {
            Box::new(ConsoleSelector::stdio())
        } else {
            Box::new(TopRanked)
        };

    let overrides = Overrides {
        api_key: cli.api_key,
        api_base: cli.api_base,
        model: cli.model,
    };

    let pipeline = Pipeline::from_settings(&settings, &overrides, &ProcessEnv, selector)?;
    let record = pipeline.run(&cli.title).await?;

    serde_json::to_string_pretty(&record).context("failed to serialize record")
}
