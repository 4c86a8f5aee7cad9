//! Helpers for pulling fields out of Redfish JSON documents.
//!
//! Extraction is fail-soft: a missing field yields its declared fallback
//! instead of aborting the walk, so partially populated BMC responses still
//! produce a record.

use serde_json::{Map, Value};

/// Placeholder for identity fields the BMC did not report.
pub const UNKNOWN: &str = "Unknown";

/// Follow `path` through nested objects.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// `value[link]["@odata.id"]`, the reference to a linked resource.
#[must_use]
pub fn odata_id<'a>(value: &'a Value, link: &str) -> Option<&'a str> {
    lookup(value, &[link, "@odata.id"]).and_then(Value::as_str)
}

/// References of every entry in an array of `{"@odata.id": ...}` links.
#[must_use]
pub fn link_ids<'a>(value: &'a Value, link: &str) -> Vec<&'a str> {
    value
        .get(link)
        .and_then(Value::as_array)
        .map(|members| {
            members
                .iter()
                .filter_map(|member| member.get("@odata.id").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// References of a collection's `Members`, in document order.
#[must_use]
pub fn member_ids(collection: &Value) -> Vec<&str> {
    link_ids(collection, "Members")
}

/// String at `path`, or `"Unknown"` when absent or not a scalar.
#[must_use]
pub fn text(value: &Value, path: &[&str]) -> String {
    text_or(value, path, UNKNOWN)
}

/// String at `path`, or `default` when absent or not a scalar.
#[must_use]
pub fn text_or(value: &Value, path: &[&str], default: &str) -> String {
    match lookup(value, path) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => default.to_string(),
    }
}

/// Values listed in a `<property>@Redfish.AllowableValues` annotation.
#[must_use]
pub fn allowable_values(value: &Value, annotation: &str) -> Vec<String> {
    value
        .get(annotation)
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

/// Replacement used when a table field is missing from the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// `"Unknown"`.
    Unknown,
    /// A fixed string such as `"RPM"` or `"None"`.
    Text(&'static str),
    /// JSON `null`, used for measurements that were not reported.
    Null,
    /// Numeric zero.
    Zero,
    /// `false`.
    False,
    /// `{}`.
    EmptyObject,
    /// `[]`.
    EmptyArray,
}

impl Fallback {
    /// JSON value substituted for a missing field.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Unknown => Value::String(UNKNOWN.to_string()),
            Self::Text(text) => Value::String(text.to_string()),
            Self::Null => Value::Null,
            Self::Zero => Value::from(0),
            Self::False => Value::Bool(false),
            Self::EmptyObject => Value::Object(Map::new()),
            Self::EmptyArray => Value::Array(Vec::new()),
        }
    }
}

/// One row of a field table: output key, source path, and fallback.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Key in the extracted record.
    pub key: &'static str,
    /// Path in the source document.
    pub path: &'static [&'static str],
    /// Value used when the path is absent.
    pub fallback: Fallback,
}

impl Field {
    /// Build a table row.
    #[must_use]
    pub const fn new(
        key: &'static str,
        path: &'static [&'static str],
        fallback: Fallback,
    ) -> Self {
        Self {
            key,
            path,
            fallback,
        }
    }
}

/// Copy every table field out of `source`, in table order.
#[must_use]
pub fn extract_fields(source: &Value, fields: &[Field]) -> Map<String, Value> {
    let mut record = Map::new();
    extend_fields(&mut record, source, fields);
    record
}

/// Append every table field out of `source` to an existing record.
pub fn extend_fields(record: &mut Map<String, Value>, source: &Value, fields: &[Field]) {
    for field in fields {
        let value = lookup(source, field.path)
            .cloned()
            .unwrap_or_else(|| field.fallback.to_value());
        record.insert(field.key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_walks_nested_objects() {
        let doc = json!({"Status": {"Health": "OK"}});
        assert_eq!(lookup(&doc, &["Status", "Health"]), Some(&json!("OK")));
        assert_eq!(lookup(&doc, &["Status", "State"]), None);
        assert_eq!(text(&doc, &["Status", "State"]), UNKNOWN);
    }

    #[test]
    fn member_ids_skip_malformed_entries() {
        let doc = json!({
            "Members": [
                {"@odata.id": "/redfish/v1/Systems/1"},
                {"href": "/ignored"},
                {"@odata.id": "/redfish/v1/Systems/2"}
            ]
        });
        assert_eq!(
            member_ids(&doc),
            vec!["/redfish/v1/Systems/1", "/redfish/v1/Systems/2"]
        );
        assert!(member_ids(&json!({})).is_empty());
    }

    #[test]
    fn extract_fields_applies_fallbacks_per_field() {
        const TABLE: &[Field] = &[
            Field::new("sensor_id", &["MemberId"], Fallback::Unknown),
            Field::new("reading", &["Reading"], Fallback::Null),
            Field::new("units", &["ReadingUnits"], Fallback::Text("RPM")),
            Field::new("health", &["Status", "Health"], Fallback::Unknown),
            Field::new("tags", &["Tags"], Fallback::EmptyArray),
        ];
        let record = extract_fields(&json!({"Reading": 4200, "Status": {"Health": "OK"}}), TABLE);
        assert_eq!(record["sensor_id"], json!("Unknown"));
        assert_eq!(record["reading"], json!(4200));
        assert_eq!(record["units"], json!("RPM"));
        assert_eq!(record["health"], json!("OK"));
        assert_eq!(record["tags"], json!([]));
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), TABLE.len());
    }

    #[test]
    fn allowable_values_reads_annotation() {
        let doc = json!({"IndicatorLED@Redfish.AllowableValues": ["Lit", "Off"]});
        assert_eq!(
            allowable_values(&doc, "IndicatorLED@Redfish.AllowableValues"),
            vec!["Lit".to_string(), "Off".to_string()]
        );
        assert!(allowable_values(&doc, "Missing@Redfish.AllowableValues").is_empty());
    }
}
