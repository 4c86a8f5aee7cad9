//! Shared HTTP client for Redfish services.
//!
//! One [`RedfishClient`] owns the session for an invocation: basic auth on
//! every request, the TLS-verification toggle, a timeout, and the request id
//! header. Every failed round trip is logged once at `warn` and surfaced as a
//! typed [`RedfishError`].

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, IF_MATCH};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{RedfishError, RedfishResult};

/// Header carrying the per-invocation trace identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Path of the Redfish service root.
pub const SERVICE_ROOT_PATH: &str = "/redfish/v1/";

/// Authenticated session against one BMC.
#[derive(Debug, Clone)]
pub struct RedfishClient {
    http: Client,
    base_url: Url,
    host: String,
    username: String,
    password: String,
}

impl RedfishClient {
    /// Validate `config` and open a session against `https://host:port/`.
    ///
    /// # Errors
    ///
    /// Returns an error when the config is unusable or the HTTP client
    /// cannot be built.
    pub fn connect(config: &ConnectionConfig, request_id: Option<&str>) -> RedfishResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        Self::with_base_url(config, base_url, request_id)
    }

    /// Open a session against an explicit base URL (plain HTTP mocks in tests).
    ///
    /// # Errors
    ///
    /// Returns an error when the request id is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn with_base_url(
        config: &ConnectionConfig,
        base_url: Url,
        request_id: Option<&str>,
    ) -> RedfishResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(request_id) = request_id {
            let value = HeaderValue::from_str(request_id).map_err(|_| {
                RedfishError::Config("request id contains invalid characters".into())
            })?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .default_headers(default_headers)
            .build()
            .map_err(|err| RedfishError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            host: config.host.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Base URL every resource reference is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Host name as configured, used to stamp telemetry samples.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL of the service root.
    ///
    /// # Errors
    ///
    /// Returns [`RedfishError::InvalidUrl`] if the base URL cannot be joined.
    pub fn service_root(&self) -> RedfishResult<Url> {
        self.resolve(SERVICE_ROOT_PATH)
    }

    /// Resolve an `@odata.id` (absolute path or full URL) against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RedfishError::InvalidUrl`] when the reference does not parse.
    pub fn resolve(&self, reference: &str) -> RedfishResult<Url> {
        self.base_url
            .join(reference)
            .map_err(|err| RedfishError::InvalidUrl {
                value: reference.to_string(),
                reason: err.to_string(),
            })
    }

    /// GET a resource and decode its JSON body.
    ///
    /// # Errors
    ///
    /// Returns transport, status, or decode errors.
    pub async fn get_json(&self, url: &Url) -> RedfishResult<Value> {
        let response = self.send(Method::GET, url, None).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| transport_failure(Method::GET, url, source))?;
        serde_json::from_slice(&bytes).map_err(|source| {
            warn!(url = %url, error = %source, "response body is not valid JSON");
            RedfishError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }

    /// POST a JSON body with `If-Match: *` and return the success status.
    ///
    /// # Errors
    ///
    /// Returns transport or non-2xx status errors.
    pub async fn post_json(&self, url: &Url, body: &Value) -> RedfishResult<StatusCode> {
        let response = self.send(Method::POST, url, Some(body)).await?;
        Ok(response.status())
    }

    /// PATCH a JSON body with `If-Match: *` and return the success status.
    ///
    /// # Errors
    ///
    /// Returns transport or non-2xx status errors.
    pub async fn patch_json(&self, url: &Url, body: &Value) -> RedfishResult<StatusCode> {
        let response = self.send(Method::PATCH, url, Some(body)).await?;
        Ok(response.status())
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> RedfishResult<Response> {
        debug!(method = %method, url = %url, "redfish request");
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = body {
            request = request.header(IF_MATCH, "*").json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| transport_failure(method.clone(), url, source))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                "redfish request rejected"
            );
            return Err(RedfishError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(method = %method, url = %url, status = status.as_u16(), "redfish response");
        Ok(response)
    }
}

fn transport_failure(method: Method, url: &Url, source: reqwest::Error) -> RedfishError {
    warn!(method = %method, url = %url, error = %source, "redfish request failed");
    RedfishError::Transport {
        method,
        url: url.to_string(),
        source,
    }
}

/// Writes succeed only on 200, 202, or 204.
///
/// # Errors
///
/// Returns [`RedfishError::UnexpectedStatus`] for any other status.
pub fn ensure_write_accepted(operation: &'static str, status: StatusCode) -> RedfishResult<()> {
    if matches!(
        status,
        StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
    ) {
        Ok(())
    } else {
        warn!(operation, status = status.as_u16(), "write returned unexpected status");
        Err(RedfishError::UnexpectedStatus {
            operation,
            status: status.as_u16(),
        })
    }
}

/// `url` with one more path segment, e.g. `.../Chassis/1` + `Thermal`.
///
/// # Errors
///
/// Returns [`RedfishError::InvalidUrl`] for URLs that cannot carry a path.
pub fn child_url(url: &Url, segment: &str) -> RedfishResult<Url> {
    let mut child = url.clone();
    child
        .path_segments_mut()
        .map_err(|()| RedfishError::InvalidUrl {
            value: url.to_string(),
            reason: "URL cannot be a base".into(),
        })?
        .pop_if_empty()
        .push(segment);
    Ok(child)
}

#[cfg(test)]
pub(crate) mod test_support {
    use httpmock::MockServer;

    use super::RedfishClient;
    use crate::config::ConnectionConfig;
    use crate::error::RedfishResult;

    pub(crate) fn mock_client(server: &MockServer) -> RedfishResult<RedfishClient> {
        let config = ConnectionConfig::new("127.0.0.1", "root", "secret");
        let base_url = server
            .base_url()
            .parse()
            .map_err(|err: url::ParseError| crate::error::RedfishError::InvalidUrl {
                value: server.base_url(),
                reason: err.to_string(),
            })?;
        RedfishClient::with_base_url(&config, base_url, Some("trace-1"))
    }
}
