//! # Records — Event and Build Payloads
//!
//! Serde types for the JSON returned by the `/api/1/events` and
//! `/api/1/builds` endpoints, plus the fixed code tables used to decode an
//! event's numeric type and state.
//!
//! The single-event endpoint answers with either an event object or an error
//! object (`{"error": ..., "message": ...}`) on an otherwise readable
//! response. [`EventLookup`] turns that into an explicit tagged result.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Event type names, indexed by `event_type_id`.
pub static EVENT_TYPES: [&str; 13] = [
    "MBSModuleStateChangeEvent",
    "GitModuleMetadataChangeEvent",
    "GitRPMSpecChangeEvent",
    "TestingEvent",
    "GitDockerfileChangeEvent",
    "BodhiUpdateCompleteStableEvent",
    "KojiTaskStateChangeEvent",
    "BrewSignRPMEvent",
    "ErrataAdvisoryRPMsSignedEvent",
    "BrewContainerTaskStateChangeEvent",
    "ErrataAdvisoryStateChangedEvent",
    "FreshmakerManualRebuildEvent",
    "ODCSComposeStateChangeEvent",
];

/// Event state names, indexed by `state`.
pub static EVENT_STATES: [&str; 5] = ["INITIALIZED", "BUILDING", "COMPLETE", "FAILED", "SKIPPED"];

fn lookup(table: &'static [&'static str], code: i64, what: &str) -> Result<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|i| table.get(i).copied())
        .ok_or_else(|| anyhow::anyhow!("unknown {} code {}", what, code))
}

/// Decode an event type code.
pub fn event_type_name(code: i64) -> Result<&'static str> {
    lookup(&EVENT_TYPES, code, "event type")
}

/// Decode an event state code.
pub fn event_state_name(code: i64) -> Result<&'static str> {
    lookup(&EVENT_STATES, code, "event state")
}

/// A single rebuild attempt belonging to an event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: i64,
    /// Only populated by the builds list endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    /// Build-system task id.
    #[serde(default)]
    pub build_id: Option<i64>,
    #[serde(default)]
    pub state_name: String,
    #[serde(default)]
    pub original_nvr: Option<String>,
    #[serde(default)]
    pub rebuilt_nvr: Option<String>,
    #[serde(default)]
    pub state_reason: Option<String>,
}

/// A triggering change recorded by the service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub event_type_id: i64,
    pub state: i64,
    #[serde(default)]
    pub search_key: Option<String>,
    #[serde(default)]
    pub state_reason: Option<String>,
    #[serde(default)]
    pub builds: Vec<Build>,
}

impl Event {
    pub fn type_name(&self) -> Result<&'static str> {
        event_type_name(self.event_type_id)
    }

    pub fn state_name(&self) -> Result<&'static str> {
        event_state_name(self.state)
    }
}

/// One page of a list endpoint.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
}

/// Outcome of fetching a single event by id.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "RawEventResponse")]
pub enum EventLookup {
    Found(Event),
    /// The service answered with an error payload instead of an event.
    Failed(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEventResponse {
    Error {
        error: serde_json::Value,
        #[serde(default)]
        message: Option<String>,
    },
    Event(Event),
}

impl From<RawEventResponse> for EventLookup {
    fn from(raw: RawEventResponse) -> Self {
        match raw {
            RawEventResponse::Event(event) => EventLookup::Found(event),
            RawEventResponse::Error { error, message } => {
                let error = match error {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                match message {
                    Some(m) if !m.is_empty() && m != error => {
                        EventLookup::Failed(format!("{}: {}", error, m))
                    }
                    _ => EventLookup::Failed(error),
                }
            }
        }
    }
}

impl EventLookup {
    /// Decode a single-event response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}
