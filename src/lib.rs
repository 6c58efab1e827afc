//! Read-only client for a build-automation service's event and build records.
//!
//! The flow is endpoint resolution ([`endpoints`], [`config`]) feeding the
//! retrieval pipeline ([`client`], [`pages`], [`retrieval`]), whose ordered
//! events are handed to [`render`].

pub mod client;
pub mod config;
pub mod endpoints;
pub mod pages;
pub mod records;
pub mod render;
pub mod retrieval;
