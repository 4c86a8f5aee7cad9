//! System power state and reset actions.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use url::Url;

use crate::client::{RedfishClient, child_url, ensure_write_accepted};
use crate::discovery::discover_system;
use crate::error::{InvalidValue, RedfishResult};
use crate::extract::{lookup, text};

const RESET_ACTION: &str = "#ComputerSystem.Reset";

/// `ResetType` values accepted by `ComputerSystem.Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetType {
    /// Power on.
    On,
    /// Immediate power off.
    ForceOff,
    /// Orderly OS shutdown.
    GracefulShutdown,
    /// Orderly OS restart.
    GracefulRestart,
    /// Immediate restart.
    ForceRestart,
    /// Non-maskable interrupt.
    Nmi,
    /// Power on regardless of current state.
    ForceOn,
    /// Simulate a press of the power button.
    PushPowerButton,
}

impl ResetType {
    /// Every reset type, in the order they are documented.
    pub const ALL: [Self; 8] = [
        Self::On,
        Self::ForceOff,
        Self::GracefulShutdown,
        Self::GracefulRestart,
        Self::ForceRestart,
        Self::Nmi,
        Self::ForceOn,
        Self::PushPowerButton,
    ];

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::ForceOff => "ForceOff",
            Self::GracefulShutdown => "GracefulShutdown",
            Self::GracefulRestart => "GracefulRestart",
            Self::ForceRestart => "ForceRestart",
            Self::Nmi => "Nmi",
            Self::ForceOn => "ForceOn",
            Self::PushPowerButton => "PushPowerButton",
        }
    }
}

impl Display for ResetType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResetType {
    type Err = InvalidValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reset| reset.as_str() == value)
            .ok_or_else(|| {
                InvalidValue::new(
                    "power action",
                    value,
                    &Self::ALL.map(Self::as_str),
                )
            })
    }
}

/// Power operations on one discovered system.
#[derive(Debug, Clone)]
pub struct PowerControl<'a> {
    client: &'a RedfishClient,
    system: Url,
}

impl<'a> PowerControl<'a> {
    /// Operate on an already resolved system URL.
    #[must_use]
    pub const fn new(client: &'a RedfishClient, system: Url) -> Self {
        Self { client, system }
    }

    /// Resolve the first system and operate on it.
    ///
    /// # Errors
    ///
    /// Propagates discovery failures.
    pub async fn discover(client: &'a RedfishClient) -> RedfishResult<Self> {
        let system = discover_system(client).await?;
        Ok(Self::new(client, system))
    }

    /// Current `PowerState`, `"Unknown"` when the BMC omits it.
    ///
    /// # Errors
    ///
    /// Fails when the system resource cannot be read.
    pub async fn state(&self) -> RedfishResult<String> {
        let system = self.client.get_json(&self.system).await?;
        Ok(text(&system, &["PowerState"]))
    }

    /// Validate `action` and issue the reset; nothing is sent for an unknown action.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RedfishError::InvalidValue`] before any request for
    /// an unknown action, otherwise the errors of [`Self::reset`].
    pub async fn set_state(&self, action: &str) -> RedfishResult<()> {
        let reset = action.parse::<ResetType>()?;
        self.reset(reset).await
    }

    /// POST `{"ResetType": ...}` to the system's reset action.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-2xx responses, or a 2xx other than
    /// 200, 202, and 204.
    pub async fn reset(&self, reset: ResetType) -> RedfishResult<()> {
        let system = self.client.get_json(&self.system).await?;
        let target = self.reset_target(&system)?;
        let status = self
            .client
            .post_json(&target, &json!({ "ResetType": reset.as_str() }))
            .await?;
        ensure_write_accepted("power reset", status)?;
        info!(action = %reset, "power action accepted");
        Ok(())
    }

    /// Reset types the BMC advertises through `@Redfish.ActionInfo`, or
    /// inline `ResetType@Redfish.AllowableValues` when no action info exists.
    ///
    /// # Errors
    ///
    /// Fails when the system or action info resource cannot be read.
    pub async fn allowable_actions(&self) -> RedfishResult<Vec<String>> {
        let system = self.client.get_json(&self.system).await?;
        let action = lookup(&system, &["Actions", RESET_ACTION]);

        if let Some(info) = action
            .and_then(|action| action.get("@Redfish.ActionInfo"))
            .and_then(Value::as_str)
        {
            let info_url = self.client.resolve(info)?;
            let info = self.client.get_json(&info_url).await?;
            return Ok(info
                .get("Parameters")
                .and_then(Value::as_array)
                .and_then(|params| params.first())
                .map(|param| string_list(param.get("AllowableValues")))
                .unwrap_or_default());
        }

        Ok(string_list(
            action.and_then(|action| action.get("ResetType@Redfish.AllowableValues")),
        ))
    }

    fn reset_target(&self, system: &Value) -> RedfishResult<Url> {
        match lookup(system, &["Actions", RESET_ACTION, "target"]).and_then(Value::as_str) {
            Some(target) => self.client.resolve(target),
            None => {
                let actions = child_url(&self.system, "Actions")?;
                child_url(&actions, "ComputerSystem.Reset")
            }
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
