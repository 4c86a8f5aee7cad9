//! Storage inventory: controllers, drives, and volumes.
//!
//! The walk is system -> `Storage` collection -> each controller -> its
//! drives and volumes. Sub-resources that fail to load are logged and
//! skipped; missing fields fall back to `"Unknown"`, `0`, or `{}` so a
//! partial inventory is still reported.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::warn;
use url::Url;

use crate::client::RedfishClient;
use crate::discovery::discover_system;
use crate::error::{RedfishError, RedfishResult};
use crate::extract::{link_ids, lookup, member_ids, odata_id, text, text_or};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// A physical drive as reported by its controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveRecord {
    /// `Id`.
    pub id: String,
    /// `Name`.
    pub name: String,
    /// `Manufacturer`.
    pub manufacturer: String,
    /// `Model`.
    pub model: String,
    /// `SerialNumber`.
    pub serial_number: String,
    /// `PartNumber`.
    pub part_number: String,
    /// `Revision`.
    pub revision: String,
    /// `CapacityBytes`, 0 when unreported.
    pub capacity_bytes: u64,
    /// Capacity in GiB rounded to two decimals.
    pub capacity_gb: f64,
    /// `MediaType` (HDD, SSD).
    pub media_type: String,
    /// `Protocol` (SAS, SATA, NVMe).
    pub protocol: String,
    /// `RotationSpeedRPM`, absent for solid state media.
    pub rotation_speed_rpm: Option<Number>,
    /// `Interface`.
    pub interface: String,
    /// `Status` object verbatim.
    pub status: Value,
    /// `PhysicalLocation` object verbatim.
    pub location: Value,
    /// `FailurePredicted`.
    pub failure_predicted: bool,
    /// `HotspareType`.
    pub hot_spare_type: String,
    /// `EncryptionAbility`.
    pub encryption_ability: String,
    /// `EncryptionStatus`.
    pub encryption_status: String,
    /// `IndicatorLED`.
    pub indicator_led: String,
    /// `PredictiveFailureAnalysis` object verbatim.
    pub predictive_failure_analysis: Value,
}

impl DriveRecord {
    /// Extract a drive record from a `Drive` resource.
    #[must_use]
    pub fn from_resource(drive: &Value) -> Self {
        let capacity_bytes = u64_at(drive, "CapacityBytes");
        Self {
            id: text(drive, &["Id"]),
            name: text(drive, &["Name"]),
            manufacturer: text(drive, &["Manufacturer"]),
            model: text(drive, &["Model"]),
            serial_number: text(drive, &["SerialNumber"]),
            part_number: text(drive, &["PartNumber"]),
            revision: text(drive, &["Revision"]),
            capacity_bytes,
            capacity_gb: bytes_to_gb(capacity_bytes),
            media_type: text(drive, &["MediaType"]),
            protocol: text(drive, &["Protocol"]),
            rotation_speed_rpm: match drive.get("RotationSpeedRPM") {
                Some(Value::Number(rpm)) => Some(rpm.clone()),
                _ => None,
            },
            interface: text(drive, &["Interface"]),
            status: object_at(drive, "Status"),
            location: object_at(drive, "PhysicalLocation"),
            failure_predicted: bool_at(drive, "FailurePredicted"),
            hot_spare_type: text_or(drive, &["HotspareType"], "None"),
            encryption_ability: text_or(drive, &["EncryptionAbility"], "None"),
            encryption_status: text_or(drive, &["EncryptionStatus"], "Unencrypted"),
            indicator_led: text(drive, &["IndicatorLED"]),
            predictive_failure_analysis: object_at(drive, "PredictiveFailureAnalysis"),
        }
    }

    /// `Status.Health`, `"Unknown"` when absent.
    #[must_use]
    pub fn health(&self) -> String {
        text(&self.status, &["Health"])
    }
}

/// A logical volume exposed by a controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRecord {
    /// `Id`.
    pub id: String,
    /// `Name`.
    pub name: String,
    /// `VolumeType`.
    pub volume_type: String,
    /// `CapacityBytes`, 0 when unreported.
    pub capacity_bytes: u64,
    /// Capacity in GiB rounded to two decimals.
    pub capacity_gb: f64,
    /// `RAIDType`.
    pub raid_type: String,
    /// `Status` object verbatim.
    pub status: Value,
    /// `Encrypted`.
    pub encrypted: bool,
    /// `BlockSizeBytes`.
    pub block_size_bytes: u64,
    /// `OptimumIOSizeBytes`.
    pub optimum_io_size_bytes: u64,
    /// `Links.Drives` references verbatim.
    pub drives: Value,
    /// `Identifiers` verbatim.
    pub identifiers: Value,
}

impl VolumeRecord {
    /// Extract a volume record from a `Volume` resource.
    #[must_use]
    pub fn from_resource(volume: &Value) -> Self {
        let capacity_bytes = u64_at(volume, "CapacityBytes");
        Self {
            id: text(volume, &["Id"]),
            name: text(volume, &["Name"]),
            volume_type: text(volume, &["VolumeType"]),
            capacity_bytes,
            capacity_gb: bytes_to_gb(capacity_bytes),
            raid_type: text(volume, &["RAIDType"]),
            status: object_at(volume, "Status"),
            encrypted: bool_at(volume, "Encrypted"),
            block_size_bytes: u64_at(volume, "BlockSizeBytes"),
            optimum_io_size_bytes: u64_at(volume, "OptimumIOSizeBytes"),
            drives: lookup(volume, &["Links", "Drives"])
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
            identifiers: volume
                .get("Identifiers")
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new())),
        }
    }

    /// `Status.Health`, `"Unknown"` when absent.
    #[must_use]
    pub fn health(&self) -> String {
        text(&self.status, &["Health"])
    }
}

/// A storage controller with the drives and volumes it owns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerRecord {
    /// `Id`.
    pub id: String,
    /// `Name`.
    pub name: String,
    /// `Manufacturer`.
    pub manufacturer: String,
    /// `Model`.
    pub model: String,
    /// `SerialNumber`.
    pub serial_number: String,
    /// `FirmwareVersion`.
    pub firmware_version: String,
    /// `Status` object verbatim.
    pub status: Value,
    /// `SupportedDeviceProtocols`.
    pub supported_device_protocols: Vec<String>,
    /// Drives attached to this controller.
    pub drives: Vec<DriveRecord>,
    /// Volumes defined on this controller.
    pub volumes: Vec<VolumeRecord>,
}

impl ControllerRecord {
    /// Extract the controller fields; drives and volumes start empty.
    #[must_use]
    pub fn from_resource(controller: &Value) -> Self {
        Self {
            id: text(controller, &["Id"]),
            name: text(controller, &["Name"]),
            manufacturer: text(controller, &["Manufacturer"]),
            model: text(controller, &["Model"]),
            serial_number: text(controller, &["SerialNumber"]),
            firmware_version: text(controller, &["FirmwareVersion"]),
            status: object_at(controller, "Status"),
            supported_device_protocols: controller
                .get("SupportedDeviceProtocols")
                .and_then(Value::as_array)
                .map(|protocols| {
                    protocols
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            drives: Vec::new(),
            volumes: Vec::new(),
        }
    }

    /// `Status.Health`, `"Unknown"` when absent.
    #[must_use]
    pub fn health(&self) -> String {
        text(&self.status, &["Health"])
    }
}

/// A drive annotated with the controller that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedDrive {
    /// Owning controller name.
    pub controller: String,
    /// Owning controller id.
    pub controller_id: String,
    /// The drive itself.
    #[serde(flatten)]
    pub drive: DriveRecord,
}

/// A volume annotated with the controller that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatedVolume {
    /// Owning controller name.
    pub controller: String,
    /// Owning controller id.
    pub controller_id: String,
    /// The volume itself.
    #[serde(flatten)]
    pub volume: VolumeRecord,
}

/// Per-controller line of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSummary {
    /// Controller name.
    pub name: String,
    /// Controller id.
    pub id: String,
    /// Controller manufacturer.
    pub manufacturer: String,
    /// Controller model.
    pub model: String,
    /// Number of drives.
    pub drives_count: usize,
    /// Number of volumes.
    pub volumes_count: usize,
    /// `Status` object verbatim.
    pub status: Value,
}

/// Aggregate counts over every controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageSummary {
    /// Number of controllers.
    pub controllers: usize,
    /// Number of drives across controllers.
    pub total_drives: usize,
    /// Number of volumes across controllers.
    pub total_volumes: usize,
    /// Sum of drive capacities in GiB.
    pub total_capacity_gb: f64,
    /// Drive count per media type.
    pub drive_types: BTreeMap<String, usize>,
    /// Drive count per protocol.
    pub drive_protocols: BTreeMap<String, usize>,
    /// Volume count per RAID type.
    pub raid_types: BTreeMap<String, usize>,
    /// One line per controller.
    pub controller_details: Vec<ControllerSummary>,
}

impl StorageSummary {
    /// Aggregate an inventory.
    #[must_use]
    pub fn from_controllers(controllers: &[ControllerRecord]) -> Self {
        let mut summary = Self {
            controllers: controllers.len(),
            total_drives: 0,
            total_volumes: 0,
            total_capacity_gb: 0.0,
            drive_types: BTreeMap::new(),
            drive_protocols: BTreeMap::new(),
            raid_types: BTreeMap::new(),
            controller_details: Vec::with_capacity(controllers.len()),
        };

        for controller in controllers {
            summary.controller_details.push(ControllerSummary {
                name: controller.name.clone(),
                id: controller.id.clone(),
                manufacturer: controller.manufacturer.clone(),
                model: controller.model.clone(),
                drives_count: controller.drives.len(),
                volumes_count: controller.volumes.len(),
                status: controller.status.clone(),
            });
            summary.total_drives += controller.drives.len();
            summary.total_volumes += controller.volumes.len();

            for drive in &controller.drives {
                summary.total_capacity_gb += drive.capacity_gb;
                *summary
                    .drive_types
                    .entry(drive.media_type.clone())
                    .or_default() += 1;
                *summary
                    .drive_protocols
                    .entry(drive.protocol.clone())
                    .or_default() += 1;
            }
            for volume in &controller.volumes {
                *summary
                    .raid_types
                    .entry(volume.raid_type.clone())
                    .or_default() += 1;
            }
        }
        summary.total_capacity_gb = round_2(summary.total_capacity_gb);
        summary
    }
}

/// Every drive, annotated with its controller, in walk order.
#[must_use]
pub fn located_drives(controllers: &[ControllerRecord]) -> Vec<LocatedDrive> {
    controllers
        .iter()
        .flat_map(|controller| {
            controller.drives.iter().map(|drive| LocatedDrive {
                controller: controller.name.clone(),
                controller_id: controller.id.clone(),
                drive: drive.clone(),
            })
        })
        .collect()
}

/// Every volume, annotated with its controller, in walk order.
#[must_use]
pub fn located_volumes(controllers: &[ControllerRecord]) -> Vec<LocatedVolume> {
    controllers
        .iter()
        .flat_map(|controller| {
            controller.volumes.iter().map(|volume| LocatedVolume {
                controller: controller.name.clone(),
                controller_id: controller.id.clone(),
                volume: volume.clone(),
            })
        })
        .collect()
}

/// First drive whose `Id` equals `id`.
#[must_use]
pub fn find_drive(controllers: &[ControllerRecord], id: &str) -> Option<LocatedDrive> {
    located_drives(controllers)
        .into_iter()
        .find(|located| located.drive.id == id)
}

/// First volume whose `Id` equals `id`.
#[must_use]
pub fn find_volume(controllers: &[ControllerRecord], id: &str) -> Option<LocatedVolume> {
    located_volumes(controllers)
        .into_iter()
        .find(|located| located.volume.id == id)
}

/// Storage walk over one discovered system.
#[derive(Debug, Clone)]
pub struct StorageInventory<'a> {
    client: &'a RedfishClient,
    system: Url,
}

impl<'a> StorageInventory<'a> {
    /// Walk an already resolved system.
    #[must_use]
    pub const fn new(client: &'a RedfishClient, system: Url) -> Self {
        Self { client, system }
    }

    /// Resolve the first system and walk it.
    ///
    /// # Errors
    ///
    /// Propagates discovery failures.
    pub async fn discover(client: &'a RedfishClient) -> RedfishResult<Self> {
        let system = discover_system(client).await?;
        Ok(Self::new(client, system))
    }

    /// Load every controller with its drives and volumes.
    ///
    /// # Errors
    ///
    /// Fails when the system or its `Storage` collection cannot be read.
    /// Individual controllers, drives, and volumes that fail are skipped.
    pub async fn controllers(&self) -> RedfishResult<Vec<ControllerRecord>> {
        let system = self.client.get_json(&self.system).await?;
        let storage_ref = odata_id(&system, "Storage").ok_or_else(|| RedfishError::MissingLink {
            resource: self.system.to_string(),
            link: "Storage".to_string(),
        })?;
        let storage_url = self.client.resolve(storage_ref)?;
        let storage = self.client.get_json(&storage_url).await?;

        let mut controllers = Vec::new();
        for reference in member_ids(&storage) {
            let Some(resource) = self.fetch_soft(reference, "storage controller").await else {
                continue;
            };
            let mut controller = ControllerRecord::from_resource(&resource);

            for drive_ref in link_ids(&resource, "Drives") {
                if let Some(drive) = self.fetch_soft(drive_ref, "drive").await {
                    controller.drives.push(DriveRecord::from_resource(&drive));
                }
            }

            if let Some(volumes_ref) = odata_id(&resource, "Volumes")
                && let Some(volumes) = self.fetch_soft(volumes_ref, "volume collection").await
            {
                for volume_ref in member_ids(&volumes) {
                    if let Some(volume) = self.fetch_soft(volume_ref, "volume").await {
                        controller.volumes.push(VolumeRecord::from_resource(&volume));
                    }
                }
            }

            controllers.push(controller);
        }
        Ok(controllers)
    }

    async fn fetch_soft(&self, reference: &str, kind: &'static str) -> Option<Value> {
        let fetched = match self.client.resolve(reference) {
            Ok(url) => self.client.get_json(&url).await,
            Err(err) => Err(err),
        };
        match fetched {
            Ok(resource) => Some(resource),
            Err(err) => {
                warn!(kind, reference, error = %err, "skipping storage resource");
                None
            }
        }
    }
}

/// Bytes to GiB, rounded to two decimals.
#[must_use]
pub fn bytes_to_gb(bytes: u64) -> f64 {
    round_2(bytes_to_f64(bytes) / GIB)
}

/// Human readable size with 1024 steps: `"1.00 GB"`, `"0 B"`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes_to_f64(bytes);
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

/// Non-negative integer field; whole floats such as `480103981056.0` count too.
fn u64_at(value: &Value, key: &str) -> u64 {
    let Some(Value::Number(number)) = value.get(key) else {
        return 0;
    };
    if let Some(whole) = number.as_u64() {
        return whole;
    }
    match number.as_f64().and_then(whole_f64_to_u64) {
        Some(whole) => whole,
        None => {
            warn!(field = key, value = %number, "ignoring non-integral byte count");
            0
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_f64_to_u64(value: f64) -> Option<u64> {
    // 2^64 is exactly representable; anything at or above it overflows.
    let in_range = value.is_finite() && value >= 0.0 && value < 18_446_744_073_709_551_616.0;
    (in_range && value.fract() == 0.0).then(|| value as u64)
}

fn bool_at(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn object_at(value: &Value, key: &str) -> Value {
    value
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::mock_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn float_capacity_is_read_as_bytes() {
        let drive = DriveRecord::from_resource(&json!({"CapacityBytes": 480_103_981_056.0}));
        assert_eq!(drive.capacity_bytes, 480_103_981_056);
        assert!((drive.capacity_gb - 447.13).abs() < 1e-9);

        let volume = VolumeRecord::from_resource(&json!({
            "CapacityBytes": 1_073_741_824.0,
            "BlockSizeBytes": 512
        }));
        assert_eq!(volume.capacity_bytes, 1_073_741_824);
        assert_eq!(volume.block_size_bytes, 512);

        let odd = DriveRecord::from_resource(&json!({"CapacityBytes": -1.5}));
        assert_eq!(odd.capacity_bytes, 0);
    }

    #[test]
    fn capacity_conversions() {
        assert!((bytes_to_gb(1_073_741_824) - 1.0).abs() < f64::EPSILON);
        assert!(bytes_to_gb(0).abs() < f64::EPSILON);
        assert!((bytes_to_gb(480_103_981_056) - 447.13).abs() < 1e-9);
        assert_eq!(format_bytes(1_073_741_824), "1.00 GB");
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1_536), "1.50 KB");
    }

    #[test]
    fn drive_record_defaults_missing_fields() {
        let drive = DriveRecord::from_resource(&json!({"Id": "Disk.0"}));
        assert_eq!(drive.id, "Disk.0");
        assert_eq!(drive.model, "Unknown");
        assert_eq!(drive.capacity_bytes, 0);
        assert!(drive.capacity_gb.abs() < f64::EPSILON);
        assert_eq!(drive.rotation_speed_rpm, None);
        assert_eq!(drive.status, json!({}));
        assert_eq!(drive.hot_spare_type, "None");
        assert_eq!(drive.encryption_status, "Unencrypted");
        assert_eq!(drive.health(), "Unknown");
    }

    fn controller_with(drives: Vec<DriveRecord>, volumes: Vec<VolumeRecord>) -> ControllerRecord {
        let mut controller = ControllerRecord::from_resource(&json!({
            "Id": "RAID.1", "Name": "PERC H755", "Status": {"Health": "OK"}
        }));
        controller.drives = drives;
        controller.volumes = volumes;
        controller
    }

    #[test]
    fn summary_counts_media_protocols_and_raid() {
        let ssd = DriveRecord::from_resource(&json!({
            "Id": "0", "MediaType": "SSD", "Protocol": "NVMe", "CapacityBytes": 1_073_741_824_u64
        }));
        let hdd = DriveRecord::from_resource(&json!({
            "Id": "1", "MediaType": "HDD", "Protocol": "SAS", "CapacityBytes": 2_147_483_648_u64
        }));
        let raid1 = VolumeRecord::from_resource(&json!({"Id": "V0", "RAIDType": "RAID1"}));
        let controllers = vec![controller_with(vec![ssd.clone(), hdd, ssd], vec![raid1])];

        let summary = StorageSummary::from_controllers(&controllers);
        assert_eq!(summary.controllers, 1);
        assert_eq!(summary.total_drives, 3);
        assert_eq!(summary.total_volumes, 1);
        assert!((summary.total_capacity_gb - 4.0).abs() < f64::EPSILON);
        assert_eq!(summary.drive_types.get("SSD"), Some(&2));
        assert_eq!(summary.drive_protocols.get("SAS"), Some(&1));
        assert_eq!(summary.raid_types.get("RAID1"), Some(&1));
        assert_eq!(summary.controller_details[0].drives_count, 3);
    }

    #[test]
    fn located_drive_serializes_controller_first() -> Result<(), serde_json::Error> {
        let drive = DriveRecord::from_resource(&json!({"Id": "Disk.7"}));
        let controllers = vec![controller_with(vec![drive], Vec::new())];
        let found = find_drive(&controllers, "Disk.7");
        assert!(found.is_some());
        assert!(find_drive(&controllers, "Disk.8").is_none());

        let value = serde_json::to_value(located_drives(&controllers))?;
        assert_eq!(value[0]["controller"], "PERC H755");
        assert_eq!(value[0]["controller_id"], "RAID.1");
        assert_eq!(value[0]["id"], "Disk.7");
        Ok(())
    }

    #[tokio::test]
    async fn walk_collects_drives_and_volumes_and_skips_failures() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1");
            then.status(200)
                .json_body(json!({"Storage": {"@odata.id": "/redfish/v1/Systems/1/Storage"}}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Storage");
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1"},
                {"@odata.id": "/redfish/v1/Systems/1/Storage/Broken"}
            ]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Storage/RAID.1");
            then.status(200).json_body(json!({
                "Id": "RAID.1",
                "Name": "PERC H755",
                "SupportedDeviceProtocols": ["SAS", "SATA"],
                "Drives": [
                    {"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1/Drives/0"},
                    {"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1/Drives/1"}
                ],
                "Volumes": {"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1/Volumes"}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1/Storage/Broken");
            then.status(503);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/Storage/RAID.1/Drives/0");
            then.status(200).json_body(json!({
                "Id": "0", "MediaType": "HDD", "Protocol": "SAS",
                "CapacityBytes": 1_073_741_824_u64, "RotationSpeedRPM": 7200
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/Storage/RAID.1/Drives/1");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/Storage/RAID.1/Volumes");
            then.status(200).json_body(json!({"Members": [
                {"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1/Volumes/V0"}
            ]}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/redfish/v1/Systems/1/Storage/RAID.1/Volumes/V0");
            then.status(200).json_body(json!({
                "Id": "V0", "RAIDType": "RAID1",
                "Links": {"Drives": [{"@odata.id": "/redfish/v1/Systems/1/Storage/RAID.1/Drives/0"}]}
            }));
        });

        let client = mock_client(&server)?;
        let inventory = StorageInventory::new(&client, client.resolve("/redfish/v1/Systems/1")?);
        let controllers = inventory.controllers().await?;

        assert_eq!(controllers.len(), 1);
        let controller = &controllers[0];
        assert_eq!(controller.supported_device_protocols, vec!["SAS", "SATA"]);
        assert_eq!(controller.drives.len(), 1);
        assert_eq!(controller.drives[0].rotation_speed_rpm, Some(Number::from(7200)));
        assert!((controller.drives[0].capacity_gb - 1.0).abs() < f64::EPSILON);
        assert_eq!(controller.volumes.len(), 1);
        assert_eq!(controller.volumes[0].raid_type, "RAID1");
        assert_eq!(controller.volumes[0].drives.as_array().map(Vec::len), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn system_without_storage_link_fails() -> RedfishResult<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/redfish/v1/Systems/1");
            then.status(200).json_body(json!({"Id": "1"}));
        });

        let client = mock_client(&server)?;
        let inventory = StorageInventory::new(&client, client.resolve("/redfish/v1/Systems/1")?);
        let err = inventory.controllers().await.expect_err("no storage link");
        assert!(matches!(err, RedfishError::MissingLink { .. }));
        Ok(())
    }
}
