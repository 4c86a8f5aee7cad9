//! Boot source override (PXE and other one-shot or persistent targets).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::client::{RedfishClient, ensure_write_accepted};
use crate::discovery::discover_system;
use crate::error::{InvalidValue, RedfishResult};
use crate::extract::{allowable_values, lookup, text};

/// Target used by the PXE shortcuts.
pub const PXE_TARGET: &str = "Pxe";

/// `BootSourceOverrideEnabled` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BootOverrideEnabled {
    /// No override; firmware boot order applies.
    Disabled,
    /// Override applies to the next boot only.
    #[default]
    Once,
    /// Override applies until disabled.
    Continuous,
}

impl BootOverrideEnabled {
    /// Every value.
    pub const ALL: [Self; 3] = [Self::Disabled, Self::Once, Self::Continuous];

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Once => "Once",
            Self::Continuous => "Continuous",
        }
    }
}

impl Display for BootOverrideEnabled {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootOverrideEnabled {
    type Err = InvalidValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|enabled| enabled.as_str() == value)
            .ok_or_else(|| {
                InvalidValue::new("boot override setting", value, &Self::ALL.map(Self::as_str))
            })
    }
}

/// `BootSourceOverrideMode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BootMode {
    /// BIOS compatibility boot.
    Legacy,
    /// UEFI boot.
    #[default]
    #[serde(rename = "UEFI")]
    Uefi,
}

impl BootMode {
    /// Every mode.
    pub const ALL: [Self; 2] = [Self::Legacy, Self::Uefi];

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "Legacy",
            Self::Uefi => "UEFI",
        }
    }
}

impl Display for BootMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootMode {
    type Err = InvalidValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| InvalidValue::new("boot mode", value, &Self::ALL.map(Self::as_str)))
    }
}

/// Current boot override settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootInfo {
    /// `BootSourceOverrideEnabled`.
    pub boot_source_override_enabled: String,
    /// `BootSourceOverrideTarget`.
    pub boot_source_override_target: String,
    /// `BootSourceOverrideMode`.
    pub boot_source_override_mode: String,
    /// `UefiTargetBootSourceOverride`.
    pub uefi_target_boot_source_override: String,
    /// `BootOrder`.
    pub boot_order: Vec<String>,
}

impl BootInfo {
    /// Extract from a `ComputerSystem` resource.
    #[must_use]
    pub fn from_system(system: &Value) -> Self {
        Self {
            boot_source_override_enabled: text(system, &["Boot", "BootSourceOverrideEnabled"]),
            boot_source_override_target: text(system, &["Boot", "BootSourceOverrideTarget"]),
            boot_source_override_mode: text(system, &["Boot", "BootSourceOverrideMode"]),
            uefi_target_boot_source_override: text(
                system,
                &["Boot", "UefiTargetBootSourceOverride"],
            ),
            boot_order: lookup(system, &["Boot", "BootOrder"])
                .and_then(Value::as_array)
                .map(|order| {
                    order
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Boot override operations on one discovered system.
#[derive(Debug, Clone)]
pub struct BootControl<'a> {
    client: &'a RedfishClient,
    system: Url,
}

impl<'a> BootControl<'a> {
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

    /// Read the current override settings and boot order.
    ///
    /// # Errors
    ///
    /// Fails when the system cannot be read.
    pub async fn boot_info(&self) -> RedfishResult<BootInfo> {
        let system = self.client.get_json(&self.system).await?;
        Ok(BootInfo::from_system(&system))
    }

    /// Targets advertised by `Boot.BootSourceOverrideTarget@Redfish.AllowableValues`.
    ///
    /// # Errors
    ///
    /// Fails when the system cannot be read.
    pub async fn allowable_targets(&self) -> RedfishResult<Vec<String>> {
        let system = self.client.get_json(&self.system).await?;
        Ok(system
            .get("Boot")
            .map(|boot| allowable_values(boot, "BootSourceOverrideTarget@Redfish.AllowableValues"))
            .unwrap_or_default())
    }

    /// PATCH a full override (enabled, target, mode).
    ///
    /// # Errors
    ///
    /// Fails on transport errors or a rejected status.
    pub async fn set_boot_target(
        &self,
        target: &str,
        enabled: BootOverrideEnabled,
        mode: BootMode,
    ) -> RedfishResult<()> {
        let body = json!({
            "Boot": {
                "BootSourceOverrideEnabled": enabled.as_str(),
                "BootSourceOverrideTarget": target,
                "BootSourceOverrideMode": mode.as_str(),
            }
        });
        self.write("boot override", &body).await?;
        info!(target, %enabled, %mode, "boot override set");
        Ok(())
    }

    /// PXE on the next boot only.
    ///
    /// # Errors
    ///
    /// See [`Self::set_boot_target`].
    pub async fn pxe_once(&self, mode: BootMode) -> RedfishResult<()> {
        self.set_boot_target(PXE_TARGET, BootOverrideEnabled::Once, mode)
            .await
    }

    /// PXE on every boot until disabled.
    ///
    /// # Errors
    ///
    /// See [`Self::set_boot_target`].
    pub async fn pxe_continuous(&self, mode: BootMode) -> RedfishResult<()> {
        self.set_boot_target(PXE_TARGET, BootOverrideEnabled::Continuous, mode)
            .await
    }

    /// Turn the override off, leaving target and mode untouched.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or a rejected status.
    pub async fn disable_override(&self) -> RedfishResult<()> {
        let body = json!({
            "Boot": { "BootSourceOverrideEnabled": BootOverrideEnabled::Disabled.as_str() }
        });
        self.write("boot override disable", &body).await?;
        info!("boot override disabled");
        Ok(())
    }

    async fn write(&self, operation: &'static str, body: &Value) -> RedfishResult<()> {
        let target = self.settings_target().await?;
        let status = self.client.patch_json(&target, body).await?;
        ensure_write_accepted(operation, status)
    }

    /// The system's pending-settings resource when it has one, else the system.
    async fn settings_target(&self) -> RedfishResult<Url> {
        let system = self.client.get_json(&self.system).await?;
        match lookup(&system, &["@Redfish.Settings", "SettingsObject", "@odata.id"])
            .and_then(Value::as_str)
        {
            Some(reference) => {
                let url = self.client.resolve(reference)?;
                debug!(settings = %url, "writing boot override to settings object");
                Ok(url)
            }
            None => Ok(self.system.clone()),
        }
    }
}
