//! # Render — Summary and Detail Tables
//!
//! Two layouts, chosen by whether explicit event ids were requested:
//!
//! - **Summary**: one row per event (`ID TYPE STATE SEARCH KEY BUILDS STATE REASON`).
//! - **Detail**: an `Event <id>` heading per event followed by its builds
//!   (`BUILD ID TASK ID STATE ORIGINAL NVR REBUILT NVR STATE REASON`). An
//!   active state filter keeps only builds whose state matches ignoring case.
//!
//! Columns are left-aligned and sized to their widest cell.

use anyhow::Result;

use crate::records::{Build, Event};

/// Display width of the search key column.
pub const SEARCH_KEY_WIDTH: usize = 20;

const SUMMARY_HEADERS: [&str; 6] = ["ID", "TYPE", "STATE", "SEARCH KEY", "BUILDS", "STATE REASON"];

const DETAIL_HEADERS: [&str; 6] = [
    "BUILD ID",
    "TASK ID",
    "STATE",
    "ORIGINAL NVR",
    "REBUILT NVR",
    "STATE REASON",
];

/// A plain text table.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }

    fn line(cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
            .collect();
        padded.join("  ").trim_end().to_string()
    }

    /// Header, a dashed rule, then one line per row. Always ends with a newline.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let mut out = String::new();
        out.push_str(&Self::line(&self.headers, &widths));
        out.push('\n');
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&Self::line(row, &widths));
            out.push('\n');
        }
        out
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// First [`SEARCH_KEY_WIDTH`] characters of a search key.
pub fn truncate_search_key(key: &str) -> String {
    key.chars().take(SEARCH_KEY_WIDTH).collect()
}

/// One row per event. Fails on an unknown type or state code.
pub fn summary_table(events: &[Event]) -> Result<Table> {
    let mut table = Table::new(&SUMMARY_HEADERS);
    for event in events {
        table.push_row(vec![
            event.id.to_string(),
            event.type_name()?.to_string(),
            event.state_name()?.to_string(),
            truncate_search_key(event.search_key.as_deref().unwrap_or_default()),
            event.builds.len().to_string(),
            opt(&event.state_reason),
        ]);
    }
    Ok(table)
}

fn state_matches(build: &Build, states: &[String]) -> bool {
    states.is_empty()
        || states
            .iter()
            .any(|s| s.to_lowercase() == build.state_name.to_lowercase())
}

/// Builds of one event, narrowed to `states` (case-insensitive) when non-empty.
pub fn detail_table(event: &Event, states: &[String]) -> Table {
    let mut table = Table::new(&DETAIL_HEADERS);
    for build in event.builds.iter().filter(|b| state_matches(b, states)) {
        table.push_row(vec![
            build.id.to_string(),
            opt(&build.build_id),
            build.state_name.clone(),
            opt(&build.original_nvr),
            opt(&build.rebuilt_nvr),
            opt(&build.state_reason),
        ]);
    }
    table
}

/// Summary layout as text.
pub fn render_summary(events: &[Event]) -> Result<String> {
    Ok(summary_table(events)?.render())
}

/// Detail layout as text: a heading and build table per event.
pub fn render_details(events: &[Event], states: &[String]) -> String {
    let mut out = String::new();
    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Event {}\n", event.id));
        out.push_str(&detail_table(event, states).render());
    }
    out
}

/// Events as pretty-printed JSON.
pub fn render_json(events: &[Event]) -> Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}
