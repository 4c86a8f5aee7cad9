//! Field tables for every telemetry record type.

use crate::extract::{Fallback, Field};

const fn unknown(key: &'static str, path: &'static [&'static str]) -> Field {
    Field::new(key, path, Fallback::Unknown)
}

const fn reading(key: &'static str, path: &'static [&'static str]) -> Field {
    Field::new(key, path, Fallback::Null)
}

const HEALTH: Field = unknown("health", &["Status", "Health"]);
const STATE: Field = unknown("state", &["Status", "State"]);

pub(crate) const SYSTEM: &[Field] = &[
    unknown("power_state", &["PowerState"]),
    HEALTH,
    STATE,
    unknown("bios_version", &["BiosVersion"]),
    unknown("model", &["Model"]),
    unknown("manufacturer", &["Manufacturer"]),
    unknown("serial_number", &["SerialNumber"]),
    unknown("part_number", &["PartNumber"]),
    unknown("uuid", &["UUID"]),
];

pub(crate) const BOOT_SOURCE: &[Field] = &[
    unknown("boot_source_override_enabled", &["Boot", "BootSourceOverrideEnabled"]),
    unknown("boot_source_override_target", &["Boot", "BootSourceOverrideTarget"]),
    unknown("boot_source_override_mode", &["Boot", "BootSourceOverrideMode"]),
    unknown("uefi_target_boot_source_override", &["Boot", "UefiTargetBootSourceOverride"]),
];

pub(crate) const PROCESSOR_SUMMARY: &[Field] = &[
    Field::new("count", &["ProcessorSummary", "Count"], Fallback::Zero),
    unknown("model", &["ProcessorSummary", "Model"]),
    unknown("status_health", &["ProcessorSummary", "Status", "Health"]),
    unknown("status_state", &["ProcessorSummary", "Status", "State"]),
];

pub(crate) const MEMORY_SUMMARY: &[Field] = &[
    Field::new(
        "total_system_memory_gib",
        &["MemorySummary", "TotalSystemMemoryGiB"],
        Fallback::Zero,
    ),
    unknown("status_health", &["MemorySummary", "Status", "Health"]),
    unknown("status_state", &["MemorySummary", "Status", "State"]),
];

pub(crate) const TEMPERATURE: &[Field] = &[
    unknown("sensor_id", &["MemberId"]),
    unknown("sensor_name", &["Name"]),
    reading("reading_celsius", &["ReadingCelsius"]),
    reading("upper_threshold_critical", &["UpperThresholdCritical"]),
    reading("upper_threshold_fatal", &["UpperThresholdFatal"]),
    reading("lower_threshold_critical", &["LowerThresholdCritical"]),
    HEALTH,
    STATE,
    unknown("physical_context", &["PhysicalContext"]),
];

pub(crate) const FAN: &[Field] = &[
    unknown("sensor_id", &["MemberId"]),
    unknown("sensor_name", &["Name"]),
    reading("reading_rpm", &["Reading"]),
    Field::new("reading_units", &["ReadingUnits"], Fallback::Text("RPM")),
    reading("upper_threshold_critical", &["UpperThresholdCritical"]),
    reading("lower_threshold_critical", &["LowerThresholdCritical"]),
    HEALTH,
    STATE,
    unknown("physical_context", &["PhysicalContext"]),
];

pub(crate) const POWER_CONTROL: &[Field] = &[
    unknown("sensor_id", &["MemberId"]),
    unknown("sensor_name", &["Name"]),
    reading("power_consumed_watts", &["PowerConsumedWatts"]),
    reading("power_requested_watts", &["PowerRequestedWatts"]),
    reading("power_available_watts", &["PowerAvailableWatts"]),
    reading("power_capacity_watts", &["PowerCapacityWatts"]),
    reading("power_allocated_watts", &["PowerAllocatedWatts"]),
    reading("power_limit", &["PowerLimit", "LimitInWatts"]),
    HEALTH,
    STATE,
];

pub(crate) const VOLTAGE: &[Field] = &[
    unknown("sensor_id", &["MemberId"]),
    unknown("sensor_name", &["Name"]),
    reading("reading_volts", &["ReadingVolts"]),
    reading("upper_threshold_critical", &["UpperThresholdCritical"]),
    reading("upper_threshold_fatal", &["UpperThresholdFatal"]),
    reading("lower_threshold_critical", &["LowerThresholdCritical"]),
    reading("lower_threshold_fatal", &["LowerThresholdFatal"]),
    HEALTH,
    STATE,
    unknown("physical_context", &["PhysicalContext"]),
];

pub(crate) const POWER_SUPPLY: &[Field] = &[
    unknown("sensor_id", &["MemberId"]),
    unknown("sensor_name", &["Name"]),
    reading("power_capacity_watts", &["PowerCapacityWatts"]),
    reading("power_input_watts", &["PowerInputWatts"]),
    reading("power_output_watts", &["PowerOutputWatts"]),
    reading("efficiency_percent", &["EfficiencyPercent"]),
    reading("line_input_voltage", &["LineInputVoltage"]),
    unknown("line_input_voltage_type", &["LineInputVoltageType"]),
    unknown("model", &["Model"]),
    unknown("manufacturer", &["Manufacturer"]),
    unknown("serial_number", &["SerialNumber"]),
    unknown("part_number", &["PartNumber"]),
    unknown("firmware_version", &["FirmwareVersion"]),
    HEALTH,
    STATE,
];

pub(crate) const PROCESSOR: &[Field] = &[
    unknown("processor_id", &["Id"]),
    unknown("socket", &["Socket"]),
    unknown("processor_type", &["ProcessorType"]),
    unknown("architecture", &["ProcessorArchitecture"]),
    unknown("instruction_set", &["InstructionSet"]),
    unknown("manufacturer", &["Manufacturer"]),
    unknown("model", &["Model"]),
    reading("max_speed_mhz", &["MaxSpeedMHz"]),
    reading("total_cores", &["TotalCores"]),
    reading("total_threads", &["TotalThreads"]),
    HEALTH,
    STATE,
];

pub(crate) const PROCESSOR_METRICS: &[Field] = &[
    reading("operating_speed_mhz", &["OperatingSpeedMHz"]),
    reading("temperature_celsius", &["TemperatureCelsius"]),
    reading("consumed_power_watts", &["ConsumedPowerWatts"]),
    Field::new("cache_metrics", &["CacheMetrics"], Fallback::EmptyObject),
];

pub(crate) const MEMORY: &[Field] = &[
    unknown("memory_id", &["Id"]),
    unknown("device_locator", &["DeviceLocator"]),
    unknown("memory_type", &["MemoryType"]),
    unknown("memory_device_type", &["MemoryDeviceType"]),
    reading("capacity_mib", &["CapacityMiB"]),
    reading("operating_speed_mhz", &["OperatingSpeedMhz"]),
    Field::new("allowed_speeds_mhz", &["AllowedSpeedsMHz"], Fallback::EmptyArray),
    unknown("manufacturer", &["Manufacturer"]),
    unknown("part_number", &["PartNumber"]),
    unknown("serial_number", &["SerialNumber"]),
    reading("rank_count", &["RankCount"]),
    reading("data_width_bits", &["DataWidthBits"]),
    reading("bus_width_bits", &["BusWidthBits"]),
    HEALTH,
    STATE,
];

pub(crate) const MEMORY_METRICS: &[Field] = &[
    reading("temperature_celsius", &["TemperatureCelsius"]),
    reading("consumed_power_watts", &["ConsumedPowerWatts"]),
];

pub(crate) const NETWORK_INTERFACE: &[Field] = &[
    unknown("interface_id", &["Id"]),
    unknown("name", &["Name"]),
    unknown("description", &["Description"]),
    HEALTH,
    STATE,
];

pub(crate) const STORAGE_CONTROLLER: &[Field] = &[
    unknown("controller_id", &["Id"]),
    unknown("name", &["Name"]),
    unknown("manufacturer", &["Manufacturer"]),
    unknown("model", &["Model"]),
    unknown("firmware_version", &["FirmwareVersion"]),
    HEALTH,
    STATE,
    Field::new(
        "supported_protocols",
        &["SupportedDeviceProtocols"],
        Fallback::EmptyArray,
    ),
];

pub(crate) const STORAGE_DRIVE: &[Field] = &[
    unknown("drive_id", &["Id"]),
    unknown("name", &["Name"]),
    unknown("manufacturer", &["Manufacturer"]),
    unknown("model", &["Model"]),
    unknown("serial_number", &["SerialNumber"]),
    reading("capacity_bytes", &["CapacityBytes"]),
    unknown("media_type", &["MediaType"]),
    unknown("protocol", &["Protocol"]),
    reading("rotation_speed_rpm", &["RotationSpeedRPM"]),
    Field::new("failure_predicted", &["FailurePredicted"], Fallback::False),
    HEALTH,
    STATE,
    unknown("indicator_led", &["IndicatorLED"]),
];
