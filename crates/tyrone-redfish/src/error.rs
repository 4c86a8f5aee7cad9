//! Error types for Redfish operations.

use reqwest::Method;
use thiserror::Error;

/// Result alias for Redfish operations.
pub type RedfishResult<T> = Result<T, RedfishError>;

/// Failures raised while talking to a Redfish service.
#[derive(Debug, Error)]
pub enum RedfishError {
    /// The request never produced an HTTP response (refused, timeout, TLS).
    #[error("{method} {url} failed")]
    Transport {
        /// HTTP method of the failed request.
        method: Method,
        /// Absolute request URL.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body was not the JSON document we expected.
    #[error("response from {url} is not valid JSON")]
    Decode {
        /// Absolute request URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A required field is absent from a resource.
    #[error("{resource} has no '{field}' field")]
    MissingField {
        /// Resource that was inspected.
        resource: String,
        /// Field name that was expected.
        field: String,
    },
    /// A resource does not link to a required child resource.
    #[error("{resource} does not link to '{link}'")]
    MissingLink {
        /// Resource that was inspected.
        resource: String,
        /// Link name that was expected.
        link: String,
    },
    /// A collection exists but contains no members.
    #[error("collection {collection} has no members")]
    NoMembers {
        /// Collection URL.
        collection: String,
    },
    /// A resource reference could not be turned into a URL.
    #[error("invalid URL '{value}': {reason}")]
    InvalidUrl {
        /// Offending reference.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// A caller-supplied value is outside a closed set.
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
    /// The service answered with a non-success status code.
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        /// HTTP method of the request.
        method: Method,
        /// Absolute request URL.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// A write succeeded at the HTTP layer with a status we do not accept.
    #[error("{operation} returned unexpected HTTP {status}")]
    UnexpectedStatus {
        /// Name of the write operation.
        operation: &'static str,
        /// Response status code.
        status: u16,
    },
    /// The connection settings cannot be used.
    #[error("invalid connection config: {0}")]
    Config(String),
}

/// A value rejected before any request was issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}'; expected one of: {}", .allowed.join(", "))]
pub struct InvalidValue {
    /// What kind of value was parsed (for example `power action`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
    /// Accepted spellings.
    pub allowed: Vec<&'static str>,
}

impl InvalidValue {
    pub(crate) fn new(kind: &'static str, value: &str, allowed: &[&'static str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            allowed: allowed.to_vec(),
        }
    }
}
