//! # Config Loader
//!
//! Configuration loading and validation for VEML6075 sensor blocks.
//!
//! Responsibilities:
//! - Parse YAML/TOML/JSON configuration files
//! - Validate each sensor block into a `SensorDescriptor`
//! - Check blocks against each other (ids, bus addresses)
//! - Build the `DeviceRegistration` handoff record
//!
//! A file holds either one sensor block, a list of blocks, or a mapping with a
//! `sensor` key holding the list.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{build_registration, ConfigLoader};
//! use std::path::Path;
//!
//! let descriptors = ConfigLoader::load_from_path(Path::new("veml6075.yaml")).unwrap();
//! for descriptor in descriptors {
//!     let registration = build_registration(descriptor);
//!     println!("{} at {}", registration.component_id, registration.i2c_address);
//! }
//! ```

mod parser;
mod registration;
mod validator;

pub use contracts::{DeviceRegistration, SensorDescriptor};
pub use parser::ConfigFormat;
pub use registration::build_registration;
pub use validator::{parse_duration, validate, validate_value, ConfigMapping};

use contracts::ContractError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Key under which a mapping root lists its sensor blocks
pub const SENSOR_LIST_KEY: &str = "sensor";

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.yaml / .yml / .toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<Vec<SensorDescriptor>, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<Vec<SensorDescriptor>, ContractError> {
        let root = parser::parse(content, format)?;
        Self::load_from_value(&root)
    }

    /// Validate an already parsed document
    ///
    /// All-or-nothing: any invalid block fails the whole document.
    pub fn load_from_value(root: &Value) -> Result<Vec<SensorDescriptor>, ContractError> {
        let descriptors = match root {
            Value::Null => return Err(ContractError::config_parse("configuration is empty")),
            Value::Object(map) if map.contains_key(SENSOR_LIST_KEY) => {
                if map.len() > 1 {
                    let extra = map.keys().find(|k| k.as_str() != SENSOR_LIST_KEY);
                    if let Some(extra) = extra {
                        return Err(ContractError::unknown_key(extra.as_str()));
                    }
                }
                Self::load_list(&map[SENSOR_LIST_KEY]).map_err(|e| e.within(SENSOR_LIST_KEY))?
            }
            Value::Object(map) => vec![validate(map)?],
            Value::Array(_) => Self::load_list(root)?,
            other => vec![validate_value(other)?],
        };

        debug!(blocks = descriptors.len(), "configuration validated");
        Ok(descriptors)
    }

    /// Serialize registrations to a JSON string
    pub fn to_json(registrations: &[DeviceRegistration]) -> Result<String, ContractError> {
        serde_json::to_string_pretty(registrations)
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Validate a list of blocks, then check them against each other
    fn load_list(value: &Value) -> Result<Vec<SensorDescriptor>, ContractError> {
        let blocks = match value {
            Value::Array(blocks) => blocks.as_slice(),
            Value::Object(_) => std::slice::from_ref(value),
            other => {
                return Err(ContractError::invalid_value(
                    "",
                    other.to_string(),
                    "expected a list of sensor blocks",
                ))
            }
        };
        if blocks.is_empty() {
            return Err(ContractError::config_parse("configuration contains no sensor blocks"));
        }

        let descriptors = blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| validate_value(block).map_err(|e| e.within(&format!("[{idx}]"))))
            .collect::<Result<Vec<_>, _>>()?;

        validate_component_ids(&descriptors)?;
        validate_bus_addresses(&descriptors)?;
        Ok(descriptors)
    }
}

/// Component ids must be unique across blocks
fn validate_component_ids(descriptors: &[SensorDescriptor]) -> Result<(), ContractError> {
    let mut seen = HashMap::new();
    for (idx, descriptor) in descriptors.iter().enumerate() {
        if let Some(first) = seen.insert(descriptor.id.as_str(), idx) {
            return Err(ContractError::config_validation(
                format!("[{idx}].id"),
                format!(
                    "duplicate component id '{}', first declared at [{first}]",
                    descriptor.id
                ),
            ));
        }
    }
    Ok(())
}

/// Two devices cannot share an address on the same bus
fn validate_bus_addresses(descriptors: &[SensorDescriptor]) -> Result<(), ContractError> {
    let mut seen = HashMap::new();
    for (idx, descriptor) in descriptors.iter().enumerate() {
        let key = (descriptor.i2c_bus.as_deref(), descriptor.i2c_address);
        if let Some(first) = seen.insert(key, descriptor.id.as_str()) {
            return Err(ContractError::config_validation(
                format!("[{idx}].i2c_address"),
                format!(
                    "address {} on bus '{}' already used by '{first}'",
                    descriptor.i2c_address,
                    descriptor.i2c_bus.as_deref().unwrap_or("default"),
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{IntegrationTime, MeasurementMode, SlotKind};
    use std::io::Write;

    const SINGLE_YAML: &str = r#"
platform: veml6075
id: roof_uv
integration_time: 800ms
mode: force
i2c_address: 0x10
polling_interval: 30s
uv_index:
  name: "Roof UV Index"
uva:
"#;

    const LIST_YAML: &str = r#"
sensor:
  - id: roof
    uv_index:
  - id: garden
    i2c_id: bus_b
    uva: {}
"#;

    #[test]
    fn test_load_single_block_yaml() {
        let descriptors = ConfigLoader::load_from_str(SINGLE_YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(descriptors.len(), 1);
        let d = &descriptors[0];
        assert_eq!(d.id, "roof_uv");
        assert_eq!(d.integration_time, IntegrationTime::Ms800);
        assert_eq!(d.mode, MeasurementMode::Forced);
        assert_eq!(d.slots[&SlotKind::UvIndex].name, "Roof UV Index");
        assert_eq!(d.slots[&SlotKind::Uva].name, "roof_uv UVA");
    }

    #[test]
    fn test_load_list_under_sensor_key() {
        let descriptors = ConfigLoader::load_from_str(LIST_YAML, ConfigFormat::Yaml).unwrap();
        let ids: Vec<_> = descriptors.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["roof", "garden"]);
        assert_eq!(descriptors[1].i2c_bus.as_deref(), Some("bus_b"));
    }

    #[test]
    fn test_load_toml_and_json() {
        let toml = r#"
[[sensor]]
id = "a"
i2c_address = 16

[[sensor]]
id = "b"
i2c_address = "0x11"
"#;
        let descriptors = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].i2c_address.get(), 0x11);

        let json = r#"[{ "id": "a" }, { "id": "b", "i2c_address": 17 }]"#;
        let descriptors = ConfigLoader::load_from_str(json, ConfigFormat::Json).unwrap();
        assert_eq!(descriptors.len(), 2);
    }

    #[test]
    fn test_error_path_includes_block_index() {
        let yaml = "sensor:\n  - id: a\n  - id: b\n    mode: bogus\n";
        let err = ConfigLoader::load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
        assert_eq!(err.field(), Some("sensor[1].mode"));

        let yaml = "- id: a\n- id: b\n  uva: 3\n";
        let err = ConfigLoader::load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
        assert_eq!(err.field(), Some("[1].uva"));
    }

    #[test]
    fn test_duplicate_component_id() {
        let yaml = "- id: a\n  i2c_address: 16\n- id: a\n  i2c_address: 17\n";
        let err = ConfigLoader::load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate component id"), "got: {err}");
        assert_eq!(err.field(), Some("[1].id"));
    }

    #[test]
    fn test_address_collision_is_per_bus() {
        let same_bus = "- id: a\n- id: b\n";
        let err = ConfigLoader::load_from_str(same_bus, ConfigFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("already used by 'a'"), "got: {err}");

        let other_bus = "- id: a\n- id: b\n  i2c_id: bus_b\n";
        assert!(ConfigLoader::load_from_str(other_bus, ConfigFormat::Yaml).is_ok());
    }

    #[test]
    fn test_empty_documents() {
        let err = ConfigLoader::load_from_str("", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));

        let err = ConfigLoader::load_from_str("[]", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_sensor_key_rejects_siblings() {
        let yaml = "sensor:\n  - id: a\nlogger: {}\n";
        let err = ConfigLoader::load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ContractError::UnknownKey { field } if field == "logger"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(SINGLE_YAML.as_bytes()).unwrap();

        let descriptors = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(descriptors[0].polling_interval.as_secs(), 30);
    }

    #[test]
    fn test_load_from_path_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn test_to_json() {
        let descriptors = ConfigLoader::load_from_str(SINGLE_YAML, ConfigFormat::Yaml).unwrap();
        let registrations: Vec<_> = descriptors.into_iter().map(build_registration).collect();
        let json = ConfigLoader::to_json(&registrations).unwrap();
        assert!(json.contains("\"component_id\": \"roof_uv\""));
        assert!(json.contains("\"mode\": \"forced\""));
    }
}
