#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(dead_code, unused, clippy::all, clippy::pedantic, clippy::nursery)]

//! Logging primitives shared across the Tyrone Redfish workspace.
//!
//! Diagnostics are emitted through `tracing`; this crate owns the single place
//! where the global subscriber is installed so every binary reports failures
//! the same way (and never on stdout, which carries command output).

pub mod error;
pub mod init;

pub use error::{LoggingError, Result};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
