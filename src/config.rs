//! # Config — Endpoint Overrides
//!
//! Users can add or replace base URLs without rebuilding by writing a TOML
//! file, by default `~/.rebuild-events/endpoints.toml`:
//!
//! ```toml
//! [deployments.fedora]
//! prod = "https://rebuilds.fedoraproject.org"
//!
//! [deployments.redhat]
//! dev = "http://localhost:5000"
//! ```
//!
//! Entries in the file win over the built-in table in [`crate::endpoints`];
//! anything not mentioned falls through to it. A missing file is not an error.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::endpoints::{self, Deployment, Environment};

/// On-disk layout of the endpoints file.
#[derive(Debug, Default, Deserialize)]
pub struct EndpointFile {
    #[serde(default)]
    pub deployments: BTreeMap<String, BTreeMap<String, String>>,
}

/// Built-in endpoints plus user overrides.
#[derive(Debug, Default)]
pub struct EndpointTable {
    overrides: EndpointFile,
}

impl EndpointTable {
    /// Only the built-in table.
    pub fn builtin() -> Self {
        EndpointTable::default()
    }

    /// Parse overrides from TOML text. Every URL must parse as an absolute URL.
    pub fn from_toml(content: &str) -> Result<Self> {
        let overrides: EndpointFile = toml::from_str(content)?;
        for (deployment, tiers) in &overrides.deployments {
            for (env, raw) in tiers {
                url::Url::parse(raw).with_context(|| {
                    format!("invalid URL for {}/{}: {}", deployment, env, raw)
                })?;
            }
        }
        Ok(EndpointTable { overrides })
    }

    /// Load overrides from `path`; a missing file yields the built-in table.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)
                .with_context(|| format!("failed to load {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::builtin()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Base URL for the pair, preferring overrides.
    pub fn resolve(&self, deployment: Deployment, environment: Environment) -> Option<String> {
        self.overrides
            .deployments
            .get(deployment.as_str())
            .and_then(|tiers| tiers.get(environment.as_str()))
            .cloned()
            .or_else(|| endpoints::resolve(deployment, environment).map(str::to_string))
    }
}

/// `~/.rebuild-events/endpoints.toml`, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(|home| PathBuf::from(home).join(".rebuild-events").join("endpoints.toml"))
}
