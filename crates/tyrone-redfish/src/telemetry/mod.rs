//! Telemetry sampling across system, chassis, and component resources.
//!
//! Each category is collected independently; every record of one category
//! call shares a timestamp. `collect_selected` keeps going when a category
//! fails so one broken sensor collection does not hide the rest.

mod fields;
pub mod monitor;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::client::{RedfishClient, child_url};
use crate::discovery::{ServiceEndpoints, discover};
use crate::error::{InvalidValue, RedfishError, RedfishResult};
use crate::extract::{Field, extend_fields, extract_fields, link_ids, member_ids, odata_id};

pub use monitor::{MonitorCycle, MonitorOutcome, MonitorPlan, Ticker, TokioTicker, monitor};

/// Telemetry categories, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryCategory {
    /// Power state, health, identity, boot source, summaries.
    System,
    /// Temperatures and fans.
    Thermal,
    /// Power control, voltages, power supplies.
    Power,
    /// CPUs (plus metrics when linked).
    Processor,
    /// DIMMs (plus metrics when linked).
    Memory,
    /// Network interfaces.
    Network,
    /// Storage controllers and drives.
    Storage,
}

impl TelemetryCategory {
    /// Every category, in collection order.
    pub const ALL: [Self; 7] = [
        Self::System,
        Self::Thermal,
        Self::Power,
        Self::Processor,
        Self::Memory,
        Self::Network,
        Self::Storage,
    ];

    /// Lowercase name used in samples and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Thermal => "thermal",
            Self::Power => "power",
            Self::Processor => "processor",
            Self::Memory => "memory",
            Self::Network => "network",
            Self::Storage => "storage",
        }
    }
}

impl Display for TelemetryCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TelemetryCategory {
    type Err = InvalidValue;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| {
                InvalidValue::new(
                    "telemetry category",
                    value,
                    &Self::ALL.map(Self::as_str),
                )
            })
    }
}

/// One flat telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySample {
    /// Local wall-clock time of the category collection.
    pub timestamp: String,
    /// Host the sample was read from.
    pub host: String,
    /// Category this record belongs to.
    pub category: TelemetryCategory,
    /// Record type within the category (`fan`, `voltage`, ...); the system
    /// record has none.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Extracted fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TelemetrySample {
    /// Field value by key, `None` when absent.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Collects telemetry from resolved endpoints.
#[derive(Debug, Clone)]
pub struct TelemetryCollector<'a> {
    client: &'a RedfishClient,
    endpoints: ServiceEndpoints,
}

impl<'a> TelemetryCollector<'a> {
    /// Collect from already resolved endpoints.
    #[must_use]
    pub const fn new(client: &'a RedfishClient, endpoints: ServiceEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Discover endpoints and collect from them.
    ///
    /// # Errors
    ///
    /// Propagates discovery failures.
    pub async fn discover(client: &'a RedfishClient) -> RedfishResult<Self> {
        let endpoints = discover(client).await?;
        Ok(Self::new(client, endpoints))
    }

    /// Endpoints this collector reads from.
    #[must_use]
    pub const fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Every category, skipping the ones that fail.
    pub async fn collect_all(&self) -> Vec<TelemetrySample> {
        self.collect_selected(&TelemetryCategory::ALL).await
    }

    /// The given categories in order, skipping the ones that fail.
    pub async fn collect_selected(
        &self,
        categories: &[TelemetryCategory],
    ) -> Vec<TelemetrySample> {
        let mut samples = Vec::new();
        for &category in categories {
            match self.collect(category).await {
                Ok(mut collected) => {
                    debug!(%category, records = collected.len(), "telemetry collected");
                    samples.append(&mut collected);
                }
                Err(err) => warn!(%category, error = %err, "telemetry category unavailable"),
            }
        }
        samples
    }

    /// One category.
    ///
    /// # Errors
    ///
    /// Fails when the category's top-level resource cannot be read or, for
    /// chassis categories, when no chassis was discovered. Individual
    /// members that fail are skipped.
    pub async fn collect(
        &self,
        category: TelemetryCategory,
    ) -> RedfishResult<Vec<TelemetrySample>> {
        let stamp = Stamp {
            timestamp: now_timestamp(),
            host: self.client.host(),
            category,
        };
        match category {
            TelemetryCategory::System => self.system(&stamp).await,
            TelemetryCategory::Thermal => self.thermal(&stamp).await,
            TelemetryCategory::Power => self.power(&stamp).await,
            TelemetryCategory::Processor => {
                self.members_with_metrics(
                    &stamp,
                    "Processors",
                    "cpu",
                    fields::PROCESSOR,
                    "ProcessorMetrics",
                    fields::PROCESSOR_METRICS,
                )
                .await
            }
            TelemetryCategory::Memory => {
                self.members_with_metrics(
                    &stamp,
                    "Memory",
                    "dimm",
                    fields::MEMORY,
                    "MemoryMetrics",
                    fields::MEMORY_METRICS,
                )
                .await
            }
            TelemetryCategory::Network => self.network(&stamp).await,
            TelemetryCategory::Storage => self.storage(&stamp).await,
        }
    }

    async fn system(&self, stamp: &Stamp<'_>) -> RedfishResult<Vec<TelemetrySample>> {
        let system = self.client.get_json(&self.endpoints.system).await?;
        let mut record = extract_fields(&system, fields::SYSTEM);
        record.insert(
            "boot_source".into(),
            Value::Object(extract_fields(&system, fields::BOOT_SOURCE)),
        );
        record.insert(
            "processor_summary".into(),
            Value::Object(extract_fields(&system, fields::PROCESSOR_SUMMARY)),
        );
        record.insert(
            "memory_summary".into(),
            Value::Object(extract_fields(&system, fields::MEMORY_SUMMARY)),
        );
        Ok(vec![stamp.sample(None, record)])
    }

    async fn thermal(&self, stamp: &Stamp<'_>) -> RedfishResult<Vec<TelemetrySample>> {
        let thermal = self.client.get_json(&self.chassis_child("Thermal")?).await?;
        let mut samples =
            stamp.sensors(&thermal, "Temperatures", "temperature", fields::TEMPERATURE);
        samples.extend(stamp.sensors(&thermal, "Fans", "fan", fields::FAN));
        Ok(samples)
    }

    async fn power(&self, stamp: &Stamp<'_>) -> RedfishResult<Vec<TelemetrySample>> {
        let power = self.client.get_json(&self.chassis_child("Power")?).await?;
        let mut samples =
            stamp.sensors(&power, "PowerControl", "power_control", fields::POWER_CONTROL);
        samples.extend(stamp.sensors(&power, "Voltages", "voltage", fields::VOLTAGE));
        samples.extend(stamp.sensors(
            &power,
            "PowerSupplies",
            "power_supply",
            fields::POWER_SUPPLY,
        ));
        Ok(samples)
    }

    async fn members_with_metrics(
        &self,
        stamp: &Stamp<'_>,
        collection: &str,
        kind: &str,
        table: &[Field],
        metrics_link: &str,
        metrics_table: &[Field],
    ) -> RedfishResult<Vec<TelemetrySample>> {
        let mut samples = Vec::new();
        for member in self.system_members(collection).await? {
            let mut record = extract_fields(&member, table);
            if let Some(reference) = odata_id(&member, metrics_link)
                && let Some(metrics) = self.fetch_soft(reference).await
            {
                extend_fields(&mut record, &metrics, metrics_table);
            }
            samples.push(stamp.sample(Some(kind), record));
        }
        Ok(samples)
    }

    async fn network(&self, stamp: &Stamp<'_>) -> RedfishResult<Vec<TelemetrySample>> {
        let mut samples = Vec::new();
        for nic in self.system_members("NetworkInterfaces").await? {
            let mut record = extract_fields(&nic, fields::NETWORK_INTERFACE);
            if let Some(reference) = odata_id(&nic, "NetworkPorts")
                && let Some(ports) = self.fetch_soft(reference).await
            {
                record.insert("ports".into(), Value::from(member_ids(&ports).len()));
            }
            samples.push(stamp.sample(Some("interface"), record));
        }
        Ok(samples)
    }

    async fn storage(&self, stamp: &Stamp<'_>) -> RedfishResult<Vec<TelemetrySample>> {
        let mut samples = Vec::new();
        for controller in self.system_members("Storage").await? {
            samples.push(stamp.sample(
                Some("controller"),
                extract_fields(&controller, fields::STORAGE_CONTROLLER),
            ));
            for drive_ref in link_ids(&controller, "Drives") {
                if let Some(drive) = self.fetch_soft(drive_ref).await {
                    samples.push(
                        stamp.sample(Some("drive"), extract_fields(&drive, fields::STORAGE_DRIVE)),
                    );
                }
            }
        }
        Ok(samples)
    }

    /// GET `{system}/{collection}` and every member, skipping failed members.
    async fn system_members(&self, collection: &str) -> RedfishResult<Vec<Value>> {
        let url = child_url(&self.endpoints.system, collection)?;
        let listing = self.client.get_json(&url).await?;
        let mut members = Vec::new();
        for reference in member_ids(&listing) {
            if let Some(member) = self.fetch_soft(reference).await {
                members.push(member);
            }
        }
        Ok(members)
    }

    async fn fetch_soft(&self, reference: &str) -> Option<Value> {
        let fetched = match self.client.resolve(reference) {
            Ok(url) => self.client.get_json(&url).await,
            Err(err) => Err(err),
        };
        match fetched {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(reference, error = %err, "skipping telemetry resource");
                None
            }
        }
    }

    fn chassis_child(&self, segment: &str) -> RedfishResult<Url> {
        let chassis = self
            .endpoints
            .chassis
            .as_ref()
            .ok_or_else(|| RedfishError::MissingLink {
                resource: "service root".to_string(),
                link: "Chassis".to_string(),
            })?;
        child_url(chassis, segment)
    }
}

struct Stamp<'a> {
    timestamp: String,
    host: &'a str,
    category: TelemetryCategory,
}

impl Stamp<'_> {
    fn sample(&self, kind: Option<&str>, fields: Map<String, Value>) -> TelemetrySample {
        TelemetrySample {
            timestamp: self.timestamp.clone(),
            host: self.host.to_string(),
            category: self.category,
            kind: kind.map(str::to_string),
            fields,
        }
    }

    fn sensors(
        &self,
        resource: &Value,
        array: &str,
        kind: &str,
        table: &[Field],
    ) -> Vec<TelemetrySample> {
        resource
            .get(array)
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| self.sample(Some(kind), extract_fields(entry, table)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Local time with microseconds, e.g. `2025-01-31T14:02:07.123456`.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::mock_client;
    use httpmock::prelude::*;
    use serde_json::json;

    fn endpoints(client: &RedfishClient, with_chassis: bool) -> RedfishResult<ServiceEndpoints> {
        Ok(ServiceEndpoints {
            system: client.resolve("/redfish/v1/Systems/1")?,
            chassis: if with_chassis {
                Some(client.resolve("/redfish/v1/Chassis/1")?)
            } else {
                None
            },
        })
    }

    #[test]
    fn categories_parse_case_insensitively() {
        assert_eq!("Thermal".parse::<TelemetryCategory>(), Ok(TelemetryCategory::Thermal));
        assert!("gpu".parse::<TelemetryCategory>().is_err());
        assert_eq!(TelemetryCategory::ALL[0], TelemetryCategory::System);
        assert_eq!(TelemetryCategory::ALL[6], TelemetryCategory::Storage);
    }

    #[test]
    fn sample_serializes_flat_with_type_key() -> Result<(), serde_json::Error> {
        let mut fields = Map::new();
        fields.insert("reading_rpm".into(), json!(5400));
        let sample = TelemetrySample {
            timestamp: "2025-01-31T14:02:07.000000".into(),
            host: "bmc".into(),
            category: TelemetryCategory::Thermal,
            kind: Some("fan".into()),
            fields,
        };
        let value = serde_json::to_value(&sample)?;
        assert_eq!(value["category"], "thermal");
        assert_eq!(value["type"], "fan");
        assert_eq!(value["reading_rpm"], 5400);
        Ok(())
    }

    #[tokio::test]
    async fn system_sample_nests_summaries() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1");
            then.status(200).json_body(json!({
                "PowerState": "On",
                "Status": {"Health": "OK", "State": "Enabled"},
                "ProcessorSummary": {"Count": 2, "Model": "Xeon"},
                "Boot": {"BootSourceOverrideTarget": "Pxe"}
            }));
        });

        let client = mock_client(&server)?;
        let collector = TelemetryCollector::new(&client, endpoints(&client, false)?);
        let samples = collector.collect(TelemetryCategory::System).await?;
        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.kind, None);
        assert_eq!(sample.host, "127.0.0.1");
        assert_eq!(sample.field("power_state"), Some(&json!("On")));
        assert_eq!(sample.field("model"), Some(&json!("Unknown")));
        assert_eq!(sample.fields["processor_summary"]["count"], 2);
        assert_eq!(sample.fields["memory_summary"]["total_system_memory_gib"], 0);
        assert_eq!(sample.fields["boot_source"]["boot_source_override_target"], "Pxe");
        Ok(())
    }

    #[tokio::test]
    async fn thermal_lists_temperatures_then_fans() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Chassis/1/Thermal");
            then.status(200).json_body(json!({
                "Temperatures": [{"MemberId": "0", "Name": "CPU1 Temp", "ReadingCelsius": 41}],
                "Fans": [{"MemberId": "0", "Name": "FAN1", "Reading": 5400}]
            }));
        });

        let client = mock_client(&server)?;
        let collector = TelemetryCollector::new(&client, endpoints(&client, true)?);
        let samples = collector.collect(TelemetryCategory::Thermal).await?;
        let kinds: Vec<_> = samples.iter().map(|s| s.kind.as_deref()).collect();
        assert_eq!(kinds, vec![Some("temperature"), Some("fan")]);
        assert_eq!(samples[0].field("reading_celsius"), Some(&json!(41)));
        assert_eq!(samples[0].field("upper_threshold_critical"), Some(&Value::Null));
        assert_eq!(samples[1].field("reading_units"), Some(&json!("RPM")));
        assert_eq!(samples[0].timestamp, samples[1].timestamp);
        Ok(())
    }

    #[tokio::test]
    async fn processor_merges_metrics_when_linked() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Processors");
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/redfish/v1/Systems/1/Processors/CPU1"}
            ]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Processors/CPU1");
            then.status(200).json_body(json!({
                "Id": "CPU1", "TotalCores": 32,
                "ProcessorMetrics": {"@odata.id": "/redfish/v1/Systems/1/Processors/CPU1/ProcessorMetrics"}
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/Processors/CPU1/ProcessorMetrics");
            then.status(200).json_body(json!({"TemperatureCelsius": 55}));
        });

        let client = mock_client(&server)?;
        let collector = TelemetryCollector::new(&client, endpoints(&client, false)?);
        let samples = collector.collect(TelemetryCategory::Processor).await?;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].kind.as_deref(), Some("cpu"));
        assert_eq!(samples[0].field("total_cores"), Some(&json!(32)));
        assert_eq!(samples[0].field("temperature_celsius"), Some(&json!(55)));
        assert_eq!(samples[0].field("cache_metrics"), Some(&json!({})));
        Ok(())
    }

    #[tokio::test]
    async fn network_counts_ports() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/NetworkInterfaces");
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/redfish/v1/Systems/1/NetworkInterfaces/NIC.1"}
            ]}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/NetworkInterfaces/NIC.1");
            then.status(200).json_body(json!({
                "Id": "NIC.1",
                "NetworkPorts": {"@odata.id": "/redfish/v1/Systems/1/NetworkInterfaces/NIC.1/Ports"}
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/NetworkInterfaces/NIC.1/Ports");
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/p/1"}, {"@odata.id": "/p/2"}
            ]}));
        });

        let client = mock_client(&server)?;
        let collector = TelemetryCollector::new(&client, endpoints(&client, false)?);
        let samples = collector.collect(TelemetryCategory::Network).await?;
        assert_eq!(samples[0].field("ports"), Some(&json!(2)));
        Ok(())
    }

    #[tokio::test]
    async fn collect_selected_skips_failed_categories() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1");
            then.status(200).json_body(json!({"PowerState": "Off"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Memory");
            then.status(500);
        });

        let client = mock_client(&server)?;
        let collector = TelemetryCollector::new(&client, endpoints(&client, false)?);
        let samples = collector
            .collect_selected(&[
                TelemetryCategory::Thermal,
                TelemetryCategory::System,
                TelemetryCategory::Memory,
            ])
            .await;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].category, TelemetryCategory::System);
        Ok(())
    }
}
