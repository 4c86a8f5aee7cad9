//! Command handlers, one module per capability.

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::CliResult;
use crate::output::emit;

pub(crate) mod led;
pub(crate) mod power;
pub(crate) mod pxe;
pub(crate) mod storage;
pub(crate) mod telemetry;

/// Result of a write action.
#[derive(Debug, Serialize)]
pub(crate) struct Confirmation {
    pub(crate) status: &'static str,
    pub(crate) message: String,
}

/// Print a success message for a completed write.
pub(crate) fn confirm(format: OutputFormat, message: String) -> CliResult<()> {
    let confirmation = Confirmation {
        status: "success",
        message,
    };
    emit(format, &confirmation, |done| done.message.clone())
}
