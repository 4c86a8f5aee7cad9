//! Connection settings shared by every command.

use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

use url::Url;

use crate::error::{RedfishError, RedfishResult};

/// Default HTTPS port of a BMC.
pub const DEFAULT_PORT: u16 = 443;
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable connection settings for one BMC.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// BMC host name or IP address.
    pub host: String,
    /// HTTPS port.
    pub port: u16,
    /// Basic-auth user.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Verify the BMC certificate (self-signed certificates are the norm).
    pub verify_tls: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Settings with the default port, timeout, and TLS verification off.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            verify_tls: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reject settings that cannot produce a working session.
    ///
    /// # Errors
    ///
    /// Returns [`RedfishError::Config`] for an empty host or user, or port 0.
    pub fn validate(&self) -> RedfishResult<()> {
        if self.host.trim().is_empty() {
            return Err(RedfishError::Config("host must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(RedfishError::Config("username must not be empty".into()));
        }
        if self.port == 0 {
            return Err(RedfishError::Config("port must be between 1 and 65535".into()));
        }
        Ok(())
    }

    /// `https://host:port/` for this BMC.
    ///
    /// # Errors
    ///
    /// Returns [`RedfishError::InvalidUrl`] when the host is not a valid URL host.
    pub fn base_url(&self) -> RedfishResult<Url> {
        let host = self.host.trim();
        let host = if host.parse::<Ipv6Addr>().is_ok() {
            format!("[{host}]")
        } else {
            host.to_string()
        };
        let raw = format!("https://{host}:{}/", self.port);
        Url::parse(&raw).map_err(|err| RedfishError::InvalidUrl {
            value: raw,
            reason: err.to_string(),
        })
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_uses_https_and_port() -> RedfishResult<()> {
        let mut config = ConnectionConfig::new("bmc.example", "root", "secret");
        assert_eq!(config.base_url()?.as_str(), "https://bmc.example/");
        config.port = 8443;
        assert_eq!(config.base_url()?.as_str(), "https://bmc.example:8443/");
        Ok(())
    }

    #[test]
    fn base_url_brackets_ipv6_literals() -> RedfishResult<()> {
        let mut config = ConnectionConfig::new("fe80::1", "root", "secret");
        config.port = 8443;
        assert_eq!(config.base_url()?.as_str(), "https://[fe80::1]:8443/");
        Ok(())
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        let mut config = ConnectionConfig::new(" ", "root", "secret");
        assert!(matches!(config.validate(), Err(RedfishError::Config(_))));
        config.host = "10.0.0.5".into();
        config.port = 0;
        assert!(matches!(config.validate(), Err(RedfishError::Config(_))));
        config.port = DEFAULT_PORT;
        config.username = String::new();
        assert!(matches!(config.validate(), Err(RedfishError::Config(_))));
        config.username = "root".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = ConnectionConfig::new("bmc", "root", "hunter2");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }
}
