//! # Client — Blocking HTTP Access to the Events API
//!
//! [`EventSource`] is the seam between the retrieval pipeline and the network.
//! [`ApiClient`] implements it with a blocking `ureq` agent:
//!
//! ```text
//! GET {base}/api/1/events?page={n}&per_page=100[&search_key={k}]
//! GET {base}/api/1/events/{id}
//! GET {base}/api/1/builds?page={n}&per_page=100[&rebuilt_nvr=..][&original_nvr=..][&name=..]
//! ```
//!
//! TLS certificate verification is disabled for every request. HTTP status
//! codes are not turned into errors by the agent: the single-event endpoint
//! reports a missing event with a JSON error body, which is decoded into
//! [`EventLookup::Failed`]. List endpoints must answer with a success status.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

use crate::pages::PAGE_SIZE;
use crate::records::{Build, Event, EventLookup, Page};

/// Build-attribute filters for the builds list endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildFilter {
    pub rebuilt_nvr: Option<String>,
    pub original_nvr: Option<String>,
    pub name: Option<String>,
}

impl BuildFilter {
    pub fn is_empty(&self) -> bool {
        self.rebuilt_nvr.is_none() && self.original_nvr.is_none() && self.name.is_none()
    }
}

/// Read access to events and builds.
pub trait EventSource {
    /// One page of the events list, optionally narrowed by search key.
    fn events_page(&self, page: u32, search_key: Option<&str>) -> Result<Vec<Event>>;

    /// One page of the builds list matching `filter`.
    fn builds_page(&self, page: u32, filter: &BuildFilter) -> Result<Vec<Build>>;

    /// A single event by id. Error payloads come back as `EventLookup::Failed`.
    fn event(&self, id: &str) -> Result<EventLookup>;
}

fn push_query(url: &mut String, key: &str, value: &str) {
    url.push('&');
    url.push_str(key);
    url.push('=');
    url.push_str(&urlencoding::encode(value));
}

/// `GET /api/1/events` URL for a page.
pub fn events_url(base: &str, page: u32, search_key: Option<&str>) -> String {
    let mut url = format!(
        "{}/api/1/events?page={}&per_page={}",
        base.trim_end_matches('/'),
        page,
        PAGE_SIZE
    );
    if let Some(key) = search_key {
        push_query(&mut url, "search_key", key);
    }
    url
}

/// `GET /api/1/builds` URL for a page.
pub fn builds_url(base: &str, page: u32, filter: &BuildFilter) -> String {
    let mut url = format!(
        "{}/api/1/builds?page={}&per_page={}",
        base.trim_end_matches('/'),
        page,
        PAGE_SIZE
    );
    if let Some(v) = &filter.rebuilt_nvr {
        push_query(&mut url, "rebuilt_nvr", v);
    }
    if let Some(v) = &filter.original_nvr {
        push_query(&mut url, "original_nvr", v);
    }
    if let Some(v) = &filter.name {
        push_query(&mut url, "name", v);
    }
    url
}

/// `GET /api/1/events/{id}` URL.
pub fn event_url(base: &str, id: &str) -> String {
    format!(
        "{}/api/1/events/{}",
        base.trim_end_matches('/'),
        urlencoding::encode(id)
    )
}

/// HTTP implementation of [`EventSource`].
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Create a client for `base_url`. `timeout` bounds each whole request;
    /// `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::config::Config::builder()
                .tls_config(
                    ureq::tls::TlsConfig::builder()
                        .disable_verification(true)
                        .build(),
                )
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build(),
        );

        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> Result<ureq::http::Response<ureq::Body>> {
        debug!(url, "GET");
        let resp = self
            .agent
            .get(url)
            .call()
            .with_context(|| format!("request to {} failed", url))?;
        debug!(url, status = resp.status().as_u16(), "response");
        Ok(resp)
    }

    fn get_page<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut resp = self.get(url)?;
        if !resp.status().is_success() {
            let body = resp.body_mut().read_to_string().unwrap_or_default();
            anyhow::bail!("{} returned HTTP {}: {}", url, resp.status().as_u16(), body.trim());
        }
        let page: Page<T> = resp
            .body_mut()
            .read_json()
            .with_context(|| format!("malformed list response from {}", url))?;
        Ok(page.items)
    }
}

impl EventSource for ApiClient {
    fn events_page(&self, page: u32, search_key: Option<&str>) -> Result<Vec<Event>> {
        self.get_page(&events_url(&self.base_url, page, search_key))
    }

    fn builds_page(&self, page: u32, filter: &BuildFilter) -> Result<Vec<Build>> {
        self.get_page(&builds_url(&self.base_url, page, filter))
    }

    fn event(&self, id: &str) -> Result<EventLookup> {
        let url = event_url(&self.base_url, id);
        let mut resp = self.get(&url)?;
        let lookup: EventLookup = resp
            .body_mut()
            .read_json()
            .with_context(|| format!("malformed event response from {}", url))?;
        Ok(lookup)
    }
}
