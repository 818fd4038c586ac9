use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ladder_harvest::{
    config, EnvCredentials, FsSink, HarvestConfig, Harvester, MemorySink, RunReport, StorageSink,
};
use tracing_subscriber::EnvFilter;

// Example usage:
// RIOT_API_KEY="..." cargo run -- --platform EUW1 --pages 1 --top-per-page 5
// cargo run -- --event '{"top_page": 2, "top_player": 10, "platform": "KR"}' --dry-run

#[derive(Parser, Debug)]
#[command(name = "ladder-harvest", about = "Harvest ranked-ladder players and their recent match stats", version)]
struct Cli {
    /// JSON event with run options (`top_page`, `top_player`, `platform`, ...)
    #[arg(long)]
    event: Option<String>,

    /// Pages fetched per tier and division
    #[arg(long = "pages")]
    pages: Option<u32>,

    /// Players selected per page
    #[arg(long = "top-per-page")]
    top_per_page: Option<usize>,

    /// Platform code, e.g. JP1, EUW1, NA1
    #[arg(long)]
    platform: Option<String>,

    /// Recent matches fetched per player
    #[arg(long = "matches")]
    matches: Option<u32>,

    /// Environment variable holding the API key
    #[arg(long = "api-key-env", default_value = config::API_KEY_ENV)]
    api_key_env: String,

    /// Directory summaries are written to
    #[arg(long, env = "LADDER_HARVEST_OUT")]
    output: Option<PathBuf>,

    /// Keep summaries in memory instead of writing them
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn harvest_config(&self) -> ladder_harvest::Result<HarvestConfig> {
        let mut config = match &self.event {
            Some(event) => HarvestConfig::from_event(&serde_json::from_str::<serde_json::Value>(event)?)?,
            None => HarvestConfig::default(),
        };
        if let Some(pages) = self.pages {
            config.pages_per_division = pages;
        }
        if let Some(top) = self.top_per_page {
            config.top_per_page = top;
        }
        if let Some(platform) = &self.platform {
            config.platform = platform.clone();
        }
        if let Some(matches) = self.matches {
            config.recent_match_count = matches;
        }
        Ok(config)
    }
}

fn run(cli: &Cli) -> ladder_harvest::Result<RunReport> {
    let harvester = Harvester::builder()
        .config(cli.harvest_config()?)
        .credentials(EnvCredentials::new(&cli.api_key_env))
        .build()?;
    tracing::info!("{}", harvester);

    let mut sink: Box<dyn StorageSink> = if cli.dry_run {
        Box::new(MemorySink::new())
    } else {
        let dir = cli.output.clone().unwrap_or_else(config::default_output_dir);
        tracing::info!("Writing summaries under {}", dir.display());
        Box::new(FsSink::new(dir)?)
    };
    Ok(harvester.run(sink.as_mut()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = match run(&cli) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{}", report.message),
    }
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
