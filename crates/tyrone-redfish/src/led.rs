//! Chassis identification LED.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use url::Url;

use crate::client::{RedfishClient, ensure_write_accepted};
use crate::discovery::discover_system;
use crate::error::{InvalidValue, RedfishError, RedfishResult};
use crate::extract::allowable_values;

const FIELD: &str = "IndicatorLED";
const ALLOWABLE: &str = "IndicatorLED@Redfish.AllowableValues";

/// `IndicatorLED` states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorLed {
    /// Light off.
    Off,
    /// Light steadily on.
    Lit,
    /// Light blinking.
    Blinking,
}

impl IndicatorLed {
    /// Every state.
    pub const ALL: [Self; 3] = [Self::Off, Self::Lit, Self::Blinking];

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Lit => "Lit",
            Self::Blinking => "Blinking",
        }
    }
}

impl Display for IndicatorLed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorLed {
    type Err = InvalidValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| InvalidValue::new("LED state", value, &Self::ALL.map(Self::as_str)))
    }
}

/// LED operations on one discovered system.
#[derive(Debug, Clone)]
pub struct LedControl<'a> {
    client: &'a RedfishClient,
    system: Url,
}

impl<'a> LedControl<'a> {
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

    /// Current `IndicatorLED` value as reported (vendors may add states).
    ///
    /// # Errors
    ///
    /// Fails when the system cannot be read or does not report the field.
    pub async fn state(&self) -> RedfishResult<String> {
        let system = self.client.get_json(&self.system).await?;
        system
            .get(FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RedfishError::MissingField {
                resource: self.system.to_string(),
                field: FIELD.to_string(),
            })
    }

    /// Validate `state` and PATCH it; nothing is sent for an unknown state.
    ///
    /// # Errors
    ///
    /// Returns [`RedfishError::InvalidValue`] before any request, otherwise
    /// the errors of [`Self::set`].
    pub async fn set_state(&self, state: &str) -> RedfishResult<()> {
        let state = state.parse::<IndicatorLed>()?;
        self.set(state).await
    }

    /// PATCH `{"IndicatorLED": state}` onto the system.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or a rejected status.
    pub async fn set(&self, state: IndicatorLed) -> RedfishResult<()> {
        let status = self
            .client
            .patch_json(&self.system, &json!({ FIELD: state.as_str() }))
            .await?;
        ensure_write_accepted("LED update", status)?;
        info!(state = %state, "indicator LED updated");
        Ok(())
    }

    /// States advertised by `IndicatorLED@Redfish.AllowableValues`.
    ///
    /// # Errors
    ///
    /// Fails when the system cannot be read.
    pub async fn allowable_states(&self) -> RedfishResult<Vec<String>> {
        let system = self.client.get_json(&self.system).await?;
        Ok(allowable_values(&system, ALLOWABLE))
    }
}
