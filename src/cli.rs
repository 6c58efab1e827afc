//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim: endpoint resolution,
//! criteria assembly, retrieval and output.

use anyhow::{Context, Result};
use rebuild_events::client::{ApiClient, BuildFilter};
use rebuild_events::config::{self, EndpointTable};
use rebuild_events::endpoints::{Deployment, Environment};
use rebuild_events::render;
use rebuild_events::retrieval::{Criteria, Retriever};
use std::io::Write;
use std::time::Duration;
use tracing::info;

use super::Cli;

pub fn deployment(cli: &Cli) -> Deployment {
    Deployment::from_flag(cli.redhat)
}

pub fn environment(cli: &Cli) -> Environment {
    Environment::from_flags(cli.stage, cli.qe, cli.dev)
}

/// Base URL from `--url`, else from the endpoint table. `None` when the
/// selected deployment/environment pair is not configured.
pub fn resolve_base_url(cli: &Cli) -> Result<Option<String>> {
    if let Some(url) = &cli.url {
        url::Url::parse(url).with_context(|| format!("invalid --url {}", url))?;
        return Ok(Some(url.clone()));
    }

    let table = match cli.config.clone().or_else(config::default_config_path) {
        Some(path) => EndpointTable::load(&path)?,
        None => EndpointTable::builtin(),
    };
    Ok(table.resolve(deployment(cli), environment(cli)))
}

fn criteria_for(cli: &Cli) -> Criteria {
    Criteria {
        search_key: cli.search_key.clone(),
        builds: BuildFilter {
            rebuilt_nvr: cli.rebuilt_nvr.clone(),
            original_nvr: cli.original_nvr.clone(),
            name: cli.name.clone(),
        },
        states: cli.states.clone(),
        event_ids: cli.event_ids.clone(),
    }
}

/// Fetch events from `base_url` and print them.
pub fn run(cli: &Cli, base_url: &str) -> Result<()> {
    let client = ApiClient::new(base_url, cli.timeout.map(Duration::from_secs));
    let criteria = criteria_for(cli);
    info!(
        base_url = client.base_url(),
        direct = criteria.is_direct(),
        "querying events"
    );

    // Keep stdout clean for JSON consumers.
    let mut progress: Box<dyn Write> = if cli.json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    let retrieval = Retriever::new(&client)
        .with_max_pages(cli.max_pages)
        .retrieve(&criteria, &mut progress)?;
    drop(progress);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        writeln!(out, "{}", render::render_json(&retrieval.events)?)?;
    } else if criteria.is_direct() {
        writeln!(out)?;
        write!(out, "{}", render::render_details(&retrieval.events, &criteria.states))?;
    } else {
        writeln!(out)?;
        write!(out, "{}", render::render_summary(&retrieval.events)?)?;
    }
    Ok(())
}
