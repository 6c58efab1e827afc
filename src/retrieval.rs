//! # Retrieval — Event/Build Lookup Pipeline
//!
//! Turns a set of [`Criteria`] into an ordered list of events. There are two
//! entry points, chosen per invocation:
//!
//! - **Direct lookup**: explicit event ids are fetched one request each.
//!   Error payloads are reported and skipped; the rest is sorted by id.
//! - **Search**: either a build-attribute search (page through builds, collect
//!   distinct event ids in first-seen order, then direct lookup) or an event
//!   search (page through events, optionally narrow by state, sort by id).
//!
//! Operator-facing progress lines are written to the supplied writer as the
//! fetch proceeds. Everything runs sequentially with one request in flight.

use anyhow::Result;
use std::collections::HashSet;
use std::io::Write;
use tracing::{debug, info};

use crate::client::{BuildFilter, EventSource};
use crate::pages::{Pages, DEFAULT_MAX_PAGES};
use crate::records::{Event, EventLookup};

/// Filters supplied once per invocation.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    pub search_key: Option<String>,
    pub builds: BuildFilter,
    /// Accepted state names. Empty means no state filtering.
    pub states: Vec<String>,
    /// Explicit event ids; when present, everything else except `states` is ignored.
    pub event_ids: Vec<String>,
}

impl Criteria {
    /// Whether the invocation asked for specific events by id.
    pub fn is_direct(&self) -> bool {
        !self.event_ids.is_empty()
    }
}

/// An id whose lookup returned an error payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupFailure {
    pub id: String,
    pub message: String,
}

/// Events found, sorted by id, plus the ids that could not be fetched.
#[derive(Clone, Debug, Default)]
pub struct Retrieval {
    pub events: Vec<Event>,
    pub failures: Vec<LookupFailure>,
}

pub struct Retriever<'a> {
    source: &'a dyn EventSource,
    max_pages: u32,
}

impl<'a> Retriever<'a> {
    pub fn new(source: &'a dyn EventSource) -> Self {
        Retriever {
            source,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Dispatch to direct lookup or search depending on `criteria`.
    pub fn retrieve(&self, criteria: &Criteria, out: &mut dyn Write) -> Result<Retrieval> {
        if criteria.is_direct() {
            self.fetch_by_ids(&criteria.event_ids, out)
        } else {
            self.search(criteria, out)
        }
    }

    /// Fetch each id in order; skip ids answered with an error payload.
    pub fn fetch_by_ids<S: AsRef<str>>(&self, ids: &[S], out: &mut dyn Write) -> Result<Retrieval> {
        let mut retrieval = Retrieval::default();
        for id in ids {
            let id = id.as_ref();
            writeln!(out, "Fetching event {}", id)?;
            match self.source.event(id)? {
                EventLookup::Found(event) => retrieval.events.push(event),
                EventLookup::Failed(message) => {
                    writeln!(out, "Error fetching event {}: {}", id, message)?;
                    retrieval.failures.push(LookupFailure {
                        id: id.to_string(),
                        message,
                    });
                }
            }
        }
        retrieval.events.sort_by_key(|e| e.id);
        info!(
            found = retrieval.events.len(),
            failed = retrieval.failures.len(),
            "direct lookup finished"
        );
        Ok(retrieval)
    }

    /// Search by build attributes when any are set, otherwise by events.
    pub fn search(&self, criteria: &Criteria, out: &mut dyn Write) -> Result<Retrieval> {
        if criteria.builds.is_empty() {
            let events = self.search_events(criteria.search_key.as_deref(), &criteria.states, out)?;
            Ok(Retrieval {
                events,
                failures: Vec::new(),
            })
        } else {
            let ids = self.event_ids_for_builds(&criteria.builds, out)?;
            self.fetch_by_ids(&ids, out)
        }
    }

    /// Distinct event ids referenced by matching builds, in first-seen order.
    pub fn event_ids_for_builds(&self, filter: &BuildFilter, out: &mut dyn Write) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let pages = Pages::with_max_pages(
            |page| {
                writeln!(out, "Fetching builds page {}", page)?;
                self.source.builds_page(page, filter)
            },
            self.max_pages,
        );
        for page in pages {
            for build in page? {
                let event_id = build
                    .event_id
                    .ok_or_else(|| anyhow::anyhow!("build {} has no event_id", build.id))?;
                if seen.insert(event_id) {
                    ids.push(event_id.to_string());
                }
            }
        }
        debug!(events = ids.len(), "collected event ids from builds");
        Ok(ids)
    }

    /// Page through events, keep those in `states` (exact names) when given,
    /// and sort by id.
    pub fn search_events(
        &self,
        search_key: Option<&str>,
        states: &[String],
        out: &mut dyn Write,
    ) -> Result<Vec<Event>> {
        let mut events = Pages::with_max_pages(
            |page| {
                writeln!(out, "Fetching events page {}", page)?;
                self.source.events_page(page, search_key)
            },
            self.max_pages,
        )
        .flatten_all()?;

        if !states.is_empty() {
            let mut kept = Vec::with_capacity(events.len());
            for event in events {
                let name = event.state_name()?;
                if states.iter().any(|s| s == name) {
                    kept.push(event);
                }
            }
            events = kept;
        }

        events.sort_by_key(|e| e.id);
        info!(events = events.len(), "event search finished");
        Ok(events)
    }
}
