//! Output renderers and formatting helpers for CLI commands.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;
use tyrone_redfish::storage::{
    ControllerRecord, LocatedDrive, LocatedVolume, StorageSummary, format_bytes,
};
use tyrone_redfish::{BootInfo, TelemetryCategory, TelemetrySample};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const TELEMETRY_RULE: usize = 60;
const SAMPLE_RULE: usize = 40;
// Sum of the column widths plus one separator between columns.
const DRIVES_ROW_WIDTH: usize = 87;
const VOLUMES_ROW_WIDTH: usize = 72;

/// Render `value` in `format`; `text` builds the human-readable form.
pub(crate) fn render<T, F>(format: OutputFormat, value: &T, text: F) -> CliResult<String>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => render_json(value),
        OutputFormat::Csv => render_csv(&to_value(value)?),
    }
}

/// Render and print to stdout.
pub(crate) fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    let rendered = render(format, value, text)?;
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }
    Ok(())
}

pub(crate) fn render_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| CliError::failure(anyhow!("failed to serialise output: {err}")))
}

/// CSV with one row per record; an array yields one row per element.
///
/// The header is the sorted union of flattened keys across all rows;
/// missing cells are left empty.
pub(crate) fn render_csv(value: &Value) -> CliResult<String> {
    let rows: Vec<BTreeMap<String, String>> = match value {
        Value::Array(items) => items.iter().map(flatten_value).collect(),
        other => vec![flatten_value(other)],
    };
    let header: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    if !header.is_empty() {
        writer.write_record(&header).map_err(csv_error)?;
        for row in &rows {
            writer
                .write_record(
                    header
                        .iter()
                        .map(|key| row.get(*key).map_or("", String::as_str)),
                )
                .map_err(csv_error)?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| CliError::failure(anyhow!("failed to flush CSV: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| CliError::failure(anyhow!("CSV output is not UTF-8: {err}")))
}

fn csv_error(err: csv::Error) -> CliError {
    CliError::failure(anyhow!("failed to write CSV: {err}"))
}

/// Flatten a record into `parent_child` keyed cells.
///
/// Nested objects recurse; arrays become a single JSON-text cell; null is
/// empty. A scalar at the top level lands under `value`.
pub(crate) fn flatten_value(value: &Value) -> BTreeMap<String, String> {
    let mut cells = BTreeMap::new();
    match value {
        Value::Object(map) => flatten_into(&mut cells, None, map),
        other => {
            cells.insert("value".to_string(), cell_text(other));
        }
    }
    cells
}

fn flatten_into(
    cells: &mut BTreeMap<String, String>,
    prefix: Option<&str>,
    map: &Map<String, Value>,
) {
    for (key, value) in map {
        let name = prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}_{key}"));
        match value {
            Value::Object(child) => flatten_into(cells, Some(&name), child),
            other => {
                cells.insert(name, cell_text(other));
            }
        }
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Write pretty JSON to `path`.
pub(crate) fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> CliResult<()> {
    let text = render_json(value)?;
    fs::write(path, format!("{text}\n"))
        .map_err(|err| CliError::failure(anyhow!("failed to write {}: {err}", path.display())))
}

/// Write flattened CSV rows to `path`.
pub(crate) fn write_csv_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> CliResult<()> {
    let text = render_csv(&to_value(value)?)?;
    fs::write(path, text)
        .map_err(|err| CliError::failure(anyhow!("failed to write {}: {err}", path.display())))
}

/// Write whichever exports were requested, announcing each in text mode.
pub(crate) fn export<T: Serialize + ?Sized>(
    format: OutputFormat,
    json_path: Option<&Path>,
    csv_path: Option<&Path>,
    value: &T,
) -> CliResult<()> {
    if let Some(path) = json_path {
        write_json_file(path, value)?;
        announce_export(format, path);
    }
    if let Some(path) = csv_path {
        write_csv_file(path, value)?;
        announce_export(format, path);
    }
    Ok(())
}

fn announce_export(format: OutputFormat, path: &Path) {
    info!(path = %path.display(), "export written");
    if format == OutputFormat::Text {
        println!("Data exported to {}", path.display());
    }
}

/// `dir/name.ext` becomes `dir/name_{sample}.{extension}`.
#[must_use]
pub(crate) fn numbered_path(path: &Path, sample: u64, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "export".into(), |stem| stem.to_string_lossy());
    path.with_file_name(format!("{stem}_{sample}.{extension}"))
}

/// Scalar as display text; missing or null renders as `N/A`.
fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "N/A".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn clip(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

fn push_rule(lines: &mut Vec<String>, ch: char, width: usize) {
    lines.push(ch.to_string().repeat(width));
}

/// Bulleted list under a heading.
#[must_use]
pub(crate) fn bullet_list(heading: &str, items: &[String]) -> String {
    let mut lines = vec![heading.to_string()];
    lines.extend(items.iter().map(|item| format!("  - {item}")));
    lines.join("\n")
}

#[must_use]
pub(crate) fn boot_info_text(info: &BootInfo) -> String {
    let mut lines = vec![
        "=== Boot Configuration ===".to_string(),
        format!("Boot Override Enabled: {}", info.boot_source_override_enabled),
        format!("Boot Override Target: {}", info.boot_source_override_target),
        format!("Boot Override Mode: {}", info.boot_source_override_mode),
        format!("UEFI Target: {}", info.uefi_target_boot_source_override),
    ];
    if !info.boot_order.is_empty() {
        lines.push(format!("Boot Order: {}", info.boot_order.join(", ")));
    }
    lines.join("\n")
}

#[must_use]
pub(crate) fn storage_summary_text(summary: &StorageSummary) -> String {
    let mut lines = vec![
        "=== Storage Summary ===".to_string(),
        format!("Storage Controllers: {}", summary.controllers),
        format!("Total Drives: {}", summary.total_drives),
        format!("Total Volumes: {}", summary.total_volumes),
        format!("Total Capacity: {:.2} GB", summary.total_capacity_gb),
    ];
    for (heading, counts) in [
        ("Drive Types:", &summary.drive_types),
        ("Drive Protocols:", &summary.drive_protocols),
        ("RAID Types:", &summary.raid_types),
    ] {
        if counts.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(heading.to_string());
        lines.extend(counts.iter().map(|(name, count)| format!("  {name}: {count}")));
    }

    lines.push(String::new());
    lines.push("Controller Details:".to_string());
    for controller in &summary.controller_details {
        let health = controller
            .status
            .get("Health")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        lines.push(format!("  {} ({})", controller.name, controller.id));
        lines.push(format!("    Manufacturer: {}", controller.manufacturer));
        lines.push(format!("    Model: {}", controller.model));
        lines.push(format!("    Drives: {}", controller.drives_count));
        lines.push(format!("    Volumes: {}", controller.volumes_count));
        lines.push(format!("    Status: {health}"));
    }
    lines.join("\n")
}

#[must_use]
pub(crate) fn controllers_text(controllers: &[ControllerRecord]) -> String {
    let mut lines = vec!["=== Storage Controllers ===".to_string()];
    for controller in controllers {
        lines.push(String::new());
        lines.push(format!("Controller: {} ({})", controller.name, controller.id));
        lines.push(format!("  Manufacturer: {}", controller.manufacturer));
        lines.push(format!("  Model: {}", controller.model));
        lines.push(format!("  Serial Number: {}", controller.serial_number));
        lines.push(format!("  Firmware: {}", controller.firmware_version));
        lines.push(format!("  Status: {}", controller.health()));
        lines.push(format!("  Drives: {}", controller.drives.len()));
        lines.push(format!("  Volumes: {}", controller.volumes.len()));
        if !controller.supported_device_protocols.is_empty() {
            lines.push(format!(
                "  Protocols: {}",
                controller.supported_device_protocols.join(", ")
            ));
        }
    }
    lines.join("\n")
}

#[must_use]
pub(crate) fn drives_table(drives: &[LocatedDrive]) -> String {
    if drives.is_empty() {
        return "No drives found".to_string();
    }
    let mut lines = vec![
        "=== Storage Drives ===".to_string(),
        format!(
            "{:<10} {:<20} {:<15} {:<10} {:<8} {:<8} {:<10}",
            "ID", "Model", "Serial", "Size", "Type", "Protocol", "Status"
        ),
    ];
    push_rule(&mut lines, '-', DRIVES_ROW_WIDTH);
    for located in drives {
        let drive = &located.drive;
        lines.push(format!(
            "{:<10} {:<20} {:<15} {:<10} {:<8} {:<8} {:<10}",
            clip(&drive.id, 9),
            clip(&drive.model, 19),
            clip(&drive.serial_number, 14),
            format!("{:.1}GB", drive.capacity_gb),
            clip(&drive.media_type, 7),
            clip(&drive.protocol, 7),
            clip(&drive.health(), 9),
        ));
    }
    lines.join("\n")
}

#[must_use]
pub(crate) fn volumes_table(volumes: &[LocatedVolume]) -> String {
    if volumes.is_empty() {
        return "No volumes found".to_string();
    }
    let mut lines = vec![
        "=== Storage Volumes ===".to_string(),
        format!(
            "{:<10} {:<15} {:<10} {:<10} {:<12} {:<10}",
            "ID", "Name", "Size", "RAID", "Type", "Status"
        ),
    ];
    push_rule(&mut lines, '-', VOLUMES_ROW_WIDTH);
    for located in volumes {
        let volume = &located.volume;
        lines.push(format!(
            "{:<10} {:<15} {:<10} {:<10} {:<12} {:<10}",
            clip(&volume.id, 9),
            clip(&volume.name, 14),
            format!("{:.1}GB", volume.capacity_gb),
            clip(&volume.raid_type, 9),
            clip(&volume.volume_type, 11),
            clip(&volume.health(), 9),
        ));
    }
    lines.join("\n")
}

#[must_use]
pub(crate) fn drive_detail_text(located: &LocatedDrive) -> String {
    let drive = &located.drive;
    let mut lines = vec![
        format!("=== Drive Details: {} ===", drive.id),
        format!("Controller: {} ({})", located.controller, located.controller_id),
        format!("Name: {}", drive.name),
        format!("Manufacturer: {}", drive.manufacturer),
        format!("Model: {}", drive.model),
        format!("Serial Number: {}", drive.serial_number),
        format!("Part Number: {}", drive.part_number),
        format!("Revision: {}", drive.revision),
        format!(
            "Capacity: {:.2} GB ({})",
            drive.capacity_gb,
            format_bytes(drive.capacity_bytes)
        ),
        format!("Media Type: {}", drive.media_type),
        format!("Protocol: {}", drive.protocol),
        format!("Interface: {}", drive.interface),
    ];
    if let Some(rpm) = &drive.rotation_speed_rpm {
        lines.push(format!("Rotation Speed: {rpm} RPM"));
    }
    lines.extend([
        format!("Status: {}", drive.health()),
        format!("Failure Predicted: {}", drive.failure_predicted),
        format!("Hot Spare Type: {}", drive.hot_spare_type),
        format!("Encryption Ability: {}", drive.encryption_ability),
        format!("Encryption Status: {}", drive.encryption_status),
        format!("Indicator LED: {}", drive.indicator_led),
    ]);
    lines.join("\n")
}

#[must_use]
pub(crate) fn volume_detail_text(located: &LocatedVolume) -> String {
    let volume = &located.volume;
    let mut lines = vec![
        format!("=== Volume Details: {} ===", volume.id),
        format!("Controller: {} ({})", located.controller, located.controller_id),
        format!("Name: {}", volume.name),
        format!("Volume Type: {}", volume.volume_type),
        format!(
            "Capacity: {:.2} GB ({})",
            volume.capacity_gb,
            format_bytes(volume.capacity_bytes)
        ),
        format!("RAID Type: {}", volume.raid_type),
        format!("Status: {}", volume.health()),
        format!("Encrypted: {}", volume.encrypted),
        format!("Block Size: {} bytes", volume.block_size_bytes),
    ];
    if volume.optimum_io_size_bytes > 0 {
        lines.push(format!(
            "Optimum I/O Size: {} bytes",
            volume.optimum_io_size_bytes
        ));
    }
    let drive_count = volume.drives.as_array().map_or(0, Vec::len);
    lines.push(format!("Number of Drives: {drive_count}"));
    lines.join("\n")
}

/// Controllers then drives, as printed by `storage --get-inventory`.
#[must_use]
pub(crate) fn inventory_text(controllers: &[ControllerRecord], drives: &[LocatedDrive]) -> String {
    let mut lines = vec!["=== Storage Inventory ===".to_string()];
    if !controllers.is_empty() {
        lines.push(String::new());
        lines.push("Storage Controllers:".to_string());
        for controller in controllers {
            lines.push(format!("  ID: {}", controller.id));
            lines.push(format!("  Name: {}", controller.name));
            lines.push(format!("  Manufacturer: {}", controller.manufacturer));
            lines.push(format!("  Model: {}", controller.model));
            lines.push(format!("  Status: {}", controller.health()));
            lines.push(String::new());
        }
    }
    if !drives.is_empty() {
        lines.push("Storage Drives:".to_string());
        for located in drives {
            let drive = &located.drive;
            lines.push(format!("  ID: {}", drive.id));
            lines.push(format!("  Name: {}", drive.name));
            lines.push(format!("  Manufacturer: {}", drive.manufacturer));
            lines.push(format!("  Model: {}", drive.model));
            lines.push(format!("  Serial: {}", drive.serial_number));
            lines.push(format!("  Capacity: {} GB", drive.capacity_gb));
            lines.push(format!("  Media Type: {}", drive.media_type));
            lines.push(format!("  Protocol: {}", drive.protocol));
            lines.push(format!("  Status: {}", drive.health()));
            lines.push(String::new());
        }
    }
    lines.join("\n")
}

/// Samples grouped by category, one block per record.
#[must_use]
pub(crate) fn telemetry_text(samples: &[TelemetrySample]) -> String {
    if samples.is_empty() {
        return "No telemetry data available".to_string();
    }

    let mut groups: Vec<(TelemetryCategory, Vec<&TelemetrySample>)> = Vec::new();
    for sample in samples {
        match groups.iter_mut().find(|(category, _)| *category == sample.category) {
            Some((_, members)) => members.push(sample),
            None => groups.push((sample.category, vec![sample])),
        }
    }

    let mut lines = Vec::new();
    for (category, members) in groups {
        lines.push(String::new());
        push_rule(&mut lines, '=', TELEMETRY_RULE);
        lines.push(format!(" {} TELEMETRY", category.as_str().to_uppercase()));
        push_rule(&mut lines, '=', TELEMETRY_RULE);
        for sample in members {
            lines.push(String::new());
            lines.push(format!("Timestamp: {}", sample.timestamp));
            lines.push(format!("Host: {}", sample.host));
            if let Some(kind) = &sample.kind {
                lines.push(format!("Type: {kind}"));
            }
            lines.extend(sample_lines(sample));
            push_rule(&mut lines, '-', SAMPLE_RULE);
        }
    }
    lines.join("\n")
}

fn sample_lines(sample: &TelemetrySample) -> Vec<String> {
    let field = |key: &str| value_text(sample.field(key));
    let mut lines = match (sample.category, sample.kind.as_deref()) {
        (TelemetryCategory::System, _) => {
            return vec![
                format!("Power State: {}", field("power_state")),
                format!("Health: {}", field("health")),
                format!("Model: {}", field("model")),
                format!("BIOS Version: {}", field("bios_version")),
            ];
        }
        (TelemetryCategory::Thermal, Some("temperature")) => vec![
            format!("Sensor: {}", field("sensor_name")),
            format!("Temperature: {}°C", field("reading_celsius")),
            format!("Critical Threshold: {}°C", field("upper_threshold_critical")),
        ],
        (TelemetryCategory::Thermal, Some("fan")) => vec![
            format!("Fan: {}", field("sensor_name")),
            format!("Speed: {} RPM", field("reading_rpm")),
        ],
        (TelemetryCategory::Power, Some("power_control")) => vec![
            format!("Power Consumed: {} W", field("power_consumed_watts")),
            format!("Power Available: {} W", field("power_available_watts")),
        ],
        (TelemetryCategory::Power, Some("voltage")) => vec![
            format!("Sensor: {}", field("sensor_name")),
            format!("Voltage: {} V", field("reading_volts")),
        ],
        (TelemetryCategory::Power, Some("power_supply")) => vec![
            format!("PSU: {}", field("sensor_name")),
            format!("Capacity: {} W", field("power_capacity_watts")),
            format!("Efficiency: {}%", field("efficiency_percent")),
        ],
        (TelemetryCategory::Processor, _) => {
            let mut lines = vec![
                format!("Processor: {}", field("socket")),
                format!("Model: {}", field("model")),
                format!("Cores: {}", field("total_cores")),
                format!("Threads: {}", field("total_threads")),
                format!("Max Speed: {} MHz", field("max_speed_mhz")),
            ];
            push_temperature(&mut lines, sample);
            lines
        }
        (TelemetryCategory::Memory, _) => {
            let mut lines = vec![
                format!("DIMM: {}", field("device_locator")),
                format!("Type: {}", field("memory_type")),
                format!("Capacity: {} MiB", field("capacity_mib")),
                format!("Speed: {} MHz", field("operating_speed_mhz")),
            ];
            push_temperature(&mut lines, sample);
            lines
        }
        (TelemetryCategory::Network, _) => {
            let mut lines = vec![
                format!("Interface: {}", field("name")),
                format!("Description: {}", field("description")),
            ];
            if sample.field("ports").is_some() {
                lines.push(format!("Ports: {}", field("ports")));
            }
            lines
        }
        (TelemetryCategory::Storage, Some("controller")) => vec![
            format!("Controller: {}", field("name")),
            format!("Model: {}", field("model")),
            format!("Firmware: {}", field("firmware_version")),
        ],
        (TelemetryCategory::Storage, Some("drive")) => vec![
            format!("Drive: {}", field("name")),
            format!("Model: {}", field("model")),
            format!("Capacity: {} bytes", field("capacity_bytes")),
            format!("Media Type: {}", field("media_type")),
            format!("Failure Predicted: {}", field("failure_predicted")),
        ],
        _ => Vec::new(),
    };
    lines.push(format!("Health: {}", field("health")));
    lines
}

fn push_temperature(lines: &mut Vec<String>, sample: &TelemetrySample) {
    if let Some(reading) = sample.field("temperature_celsius").filter(|value| !value.is_null()) {
        lines.push(format!("Temperature: {}°C", value_text(Some(reading))));
    }
}
