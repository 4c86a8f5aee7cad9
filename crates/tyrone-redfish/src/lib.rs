#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(dead_code, unused, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Client library for the Redfish management API exposed by server BMCs.
//!
//! Layout:
//! - `config.rs`: immutable connection settings
//! - `client.rs`: the single shared HTTP client (basic auth, TLS toggle)
//! - `discovery.rs`: service root to first system/chassis resolution
//! - `extract.rs`: JSON field helpers and fail-soft field tables
//! - `power.rs`, `led.rs`, `boot.rs`: write-capable capabilities
//! - `storage.rs`: controller/drive/volume inventory walk
//! - `telemetry/`: per-category sample collection and the polling loop
//!
//! Every capability borrows a [`RedfishClient`] and works from explicitly
//! discovered endpoints; nothing is cached between calls.

pub mod boot;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod led;
pub mod power;
pub mod storage;
pub mod telemetry;

pub use boot::{BootControl, BootInfo, BootMode, BootOverrideEnabled};
pub use client::RedfishClient;
pub use config::ConnectionConfig;
pub use discovery::{ServiceEndpoints, discover, discover_system};
pub use error::{InvalidValue, RedfishError, RedfishResult};
pub use led::{IndicatorLed, LedControl};
pub use power::{PowerControl, ResetType};
pub use storage::{StorageInventory, bytes_to_gb, format_bytes};
pub use telemetry::{TelemetryCategory, TelemetryCollector, TelemetrySample};
