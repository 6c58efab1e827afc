//! # Main — CLI Entry Point
//!
//! Parses arguments, resolves the service base URL and hands off to
//! [`cli::run`]. Without positional ids the tool lists events (optionally
//! narrowed by search key, build attributes or state) as a summary table;
//! with ids it shows each event's builds in detail.
//!
//! ## Endpoint Selection
//!
//! - `--redhat`: Red Hat deployment (Fedora otherwise).
//! - `--stage` / `--qe` / `--dev`: environment tier, highest priority first;
//!   prod when none is given.
//! - `--url` / `REBUILD_EVENTS_URL`: explicit base URL, skips the table.
//! - `--config` / `REBUILD_EVENTS_CONFIG`: endpoint override file.
//!
//! Exits with status 1 when the deployment/environment pair has no URL.

mod cli;

use anyhow::Result;
use clap::Parser;
use rebuild_events::pages::DEFAULT_MAX_PAGES;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "rebuild-events",
    about = "Inspect rebuild events and their builds"
)]
struct Cli {
    /// Query the Red Hat deployment instead of Fedora
    #[arg(long)]
    redhat: bool,

    /// Use the stage environment
    #[arg(long)]
    stage: bool,

    /// Use the QE environment
    #[arg(long)]
    qe: bool,

    /// Use the dev environment
    #[arg(long)]
    dev: bool,

    /// Base URL of the service (overrides deployment/environment selection)
    #[arg(long, env = "REBUILD_EVENTS_URL")]
    url: Option<String>,

    /// Endpoint override file (default: ~/.rebuild-events/endpoints.toml)
    #[arg(long, env = "REBUILD_EVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in seconds (requests wait indefinitely when unset)
    #[arg(long, env = "REBUILD_EVENTS_TIMEOUT")]
    timeout: Option<u64>,

    /// Give up on a list endpoint after this many non-empty pages
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Only events with this search key
    #[arg(long)]
    search_key: Option<String>,

    /// Only events with a build producing this NVR
    #[arg(long)]
    rebuilt_nvr: Option<String>,

    /// Only events with a build of this original NVR
    #[arg(long)]
    original_nvr: Option<String>,

    /// Only events with a build of this artifact name
    #[arg(long)]
    name: Option<String>,

    /// Only events (or, with ids, builds) in this state; may be repeated
    #[arg(long = "state")]
    states: Vec<String>,

    /// Print events as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Event ids to show in detail
    event_ids: Vec<String>,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for machine consumption, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    let Some(base_url) = cli::resolve_base_url(&cli)? else {
        eprintln!(
            "No URL configured for deployment '{}' in environment '{}'",
            cli::deployment(&cli),
            cli::environment(&cli)
        );
        std::process::exit(1);
    };

    cli::run(&cli, &base_url)
}
