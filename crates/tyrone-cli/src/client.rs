//! CLI error type, connection context, and credential prompting.

use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::anyhow;
use tyrone_redfish::{ConnectionConfig, InvalidValue, RedfishClient, RedfishError};

use crate::cli::ConnectionArgs;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Cancelled,
    Interrupted { samples: u64 },
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Failure(_) | Self::Cancelled | Self::Interrupted { .. } => {
                1
            }
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::Cancelled => "operation cancelled by user".to_string(),
            Self::Interrupted { samples } => {
                format!("monitoring interrupted after {samples} samples")
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<RedfishError> for CliError {
    fn from(error: RedfishError) -> Self {
        match error {
            RedfishError::InvalidValue(invalid) => Self::from(invalid),
            other => Self::Failure(other.into()),
        }
    }
}

impl From<InvalidValue> for CliError {
    fn from(invalid: InvalidValue) -> Self {
        Self::Validation(invalid.to_string())
    }
}

/// Application context passed to command handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    pub(crate) client: RedfishClient,
}

impl AppContext {
    /// Resolve credentials and open a session for one invocation.
    pub(crate) fn connect(
        args: &ConnectionArgs,
        timeout_secs: u64,
        trace_id: &str,
    ) -> CliResult<Self> {
        let password = resolve_password(args.password.as_deref())?;
        let mut config = ConnectionConfig::new(args.host.clone(), args.username.clone(), password);
        config.port = args.port;
        config.verify_tls = args.verify_ssl;
        config.timeout = Duration::from_secs(timeout_secs);

        let client = RedfishClient::connect(&config, Some(trace_id)).map_err(|err| {
            if matches!(err, RedfishError::Config(_)) {
                CliError::validation(err.to_string())
            } else {
                CliError::from(err)
            }
        })?;
        Ok(Self { client })
    }
}

/// Password from the flag/environment, else an interactive prompt.
pub(crate) fn resolve_password(provided: Option<&str>) -> CliResult<String> {
    if let Some(password) = provided {
        if password.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(password.to_string());
    }

    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password("Password: ").map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if password.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(password)
    } else {
        Err(CliError::validation(
            "password required; supply via --password or TYRONE_REDFISH_PASSWORD when running non-interactively",
        ))
    }
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed.
pub(crate) async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::debug!(error = %err, "interrupt handler unavailable");
        std::future::pending::<()>().await;
    }
}

/// Run a single-shot handler, abandoning it on Ctrl-C.
pub(crate) async fn interruptible<F>(handler: F) -> CliResult<()>
where
    F: Future<Output = CliResult<()>>,
{
    tokio::select! {
        biased;
        result = handler => result,
        () = shutdown_signal() => Err(CliError::Cancelled),
    }
}
