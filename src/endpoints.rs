//! # Endpoints — Deployment/Environment to Base URL Resolution
//!
//! The service runs in a small, fixed set of deployments, each of which may be
//! hosted in several environment tiers. The mapping is a static two-level
//! table; a missing deployment or tier resolves to `None`.
//!
//! | Deployment | prod | stage | qe | dev |
//! |------------|------|-------|----|-----|
//! | `fedora`   | -    | -     | -  | -   |
//! | `redhat`   | yes  | yes   | yes| yes |
//!
//! User overrides layered on top of this table live in [`crate::config`].

use std::fmt;

/// A named provider hosting the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Deployment {
    Fedora,
    RedHat,
}

impl Deployment {
    pub const ALL: [Deployment; 2] = [Deployment::Fedora, Deployment::RedHat];

    pub fn as_str(self) -> &'static str {
        match self {
            Deployment::Fedora => "fedora",
            Deployment::RedHat => "redhat",
        }
    }

    pub fn from_flag(redhat: bool) -> Self {
        if redhat {
            Deployment::RedHat
        } else {
            Deployment::Fedora
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployment tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Environment {
    Prod,
    Stage,
    Qe,
    Dev,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Prod,
        Environment::Stage,
        Environment::Qe,
        Environment::Dev,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Stage => "stage",
            Environment::Qe => "qe",
            Environment::Dev => "dev",
        }
    }

    /// Pick the tier from CLI flags. Priority is stage > qe > dev, falling
    /// back to prod when none is set.
    pub fn from_flags(stage: bool, qe: bool, dev: bool) -> Self {
        if stage {
            Environment::Stage
        } else if qe {
            Environment::Qe
        } else if dev {
            Environment::Dev
        } else {
            Environment::Prod
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static FEDORA_URLS: &[(Environment, &str)] = &[];

static REDHAT_URLS: &[(Environment, &str)] = &[
    (Environment::Prod, "https://freshmaker.engineering.redhat.com"),
    (Environment::Stage, "https://freshmaker.stage.engineering.redhat.com"),
    (Environment::Qe, "https://freshmaker.qe.engineering.redhat.com"),
    (Environment::Dev, "https://freshmaker.dev.engineering.redhat.com"),
];

static URLS: &[(Deployment, &[(Environment, &str)])] = &[
    (Deployment::Fedora, FEDORA_URLS),
    (Deployment::RedHat, REDHAT_URLS),
];

/// Look up the built-in base URL for a deployment/environment pair.
pub fn resolve(deployment: Deployment, environment: Environment) -> Option<&'static str> {
    URLS.iter()
        .find(|(d, _)| *d == deployment)
        .and_then(|(_, tiers)| tiers.iter().find(|(e, _)| *e == environment))
        .map(|(_, url)| *url)
}
