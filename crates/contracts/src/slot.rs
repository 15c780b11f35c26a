//! Sub-sensor slots
//!
//! The VEML6075 exposes five readings. Each one the user opts into becomes a
//! slot with fixed metadata; only the display name and icon are user-settable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five optional sub-measurements.
///
/// Declaration order is the order channels are registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Computed UV index
    UvIndex,
    /// Raw UVA count
    Uva,
    /// Raw UVB count
    Uvb,
    /// First compensation channel (visible noise)
    #[serde(rename = "uvcomp1")]
    UvComp1,
    /// Second compensation channel (infrared noise)
    #[serde(rename = "uvcomp2")]
    UvComp2,
}

impl SlotKind {
    /// All slots in registration order
    pub const ALL: [SlotKind; 5] = [
        SlotKind::UvIndex,
        SlotKind::Uva,
        SlotKind::Uvb,
        SlotKind::UvComp1,
        SlotKind::UvComp2,
    ];

    /// Configuration key of the slot
    pub fn key(self) -> &'static str {
        match self {
            SlotKind::UvIndex => "uv_index",
            SlotKind::Uva => "uva",
            SlotKind::Uvb => "uvb",
            SlotKind::UvComp1 => "uvcomp1",
            SlotKind::UvComp2 => "uvcomp2",
        }
    }

    /// Look up a slot by configuration key (exact match)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }

    /// Human-readable label used in default channel names
    pub fn label(self) -> &'static str {
        match self {
            SlotKind::UvIndex => "UV Index",
            SlotKind::Uva => "UVA",
            SlotKind::Uvb => "UVB",
            SlotKind::UvComp1 => "UV Comp 1",
            SlotKind::UvComp2 => "UV Comp 2",
        }
    }

    /// Fixed metadata for the slot, with no icon
    pub fn metadata(self) -> SlotMetadata {
        match self {
            SlotKind::UvIndex => SlotMetadata {
                unit_of_measurement: UNIT_UV_INDEX,
                accuracy_decimals: 2,
                device_class: Some(DeviceClass::UltravioletIndex),
                state_class: StateClass::Measurement,
                icon: None,
            },
            SlotKind::Uva | SlotKind::Uvb | SlotKind::UvComp1 | SlotKind::UvComp2 => {
                SlotMetadata {
                    unit_of_measurement: UNIT_RAW,
                    accuracy_decimals: 2,
                    device_class: None,
                    state_class: StateClass::Measurement,
                    icon: None,
                }
            }
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Unit label of the computed UV index
pub const UNIT_UV_INDEX: &str = "UVI";
/// Unit label of the raw channel counts
pub const UNIT_RAW: &str = "raw";

/// Metadata keys that belong to the slot and cannot be set by the user
pub const FIXED_METADATA_KEYS: [&str; 4] = [
    "unit_of_measurement",
    "accuracy_decimals",
    "device_class",
    "state_class",
];

/// Device class tag understood by the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    UltravioletIndex,
}

/// State class tag understood by the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    #[default]
    Measurement,
}

/// Reading-channel metadata for a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotMetadata {
    /// Unit label
    pub unit_of_measurement: &'static str,
    /// Decimal places reported
    pub accuracy_decimals: u8,
    /// Device class tag, raw channels have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<DeviceClass>,
    /// State class tag
    pub state_class: StateClass,
    /// Icon override (`namespace:name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A declared slot, fully resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubSensor {
    /// Display name of the reading channel
    pub name: String,
    /// Fixed metadata with the icon override applied
    pub metadata: SlotMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for slot in SlotKind::ALL {
            assert_eq!(SlotKind::from_key(slot.key()), Some(slot));
        }
        assert_eq!(SlotKind::from_key("UVA"), None);
        assert_eq!(SlotKind::from_key("uv_comp1"), None);
    }

    #[test]
    fn test_only_uv_index_has_device_class() {
        assert_eq!(
            SlotKind::UvIndex.metadata().device_class,
            Some(DeviceClass::UltravioletIndex)
        );
        assert_eq!(SlotKind::UvIndex.metadata().unit_of_measurement, "UVI");
        for slot in &SlotKind::ALL[1..] {
            let meta = slot.metadata();
            assert_eq!(meta.device_class, None);
            assert_eq!(meta.unit_of_measurement, "raw");
            assert_eq!(meta.accuracy_decimals, 2);
        }
    }

    #[test]
    fn test_serde_names_match_keys() {
        for slot in SlotKind::ALL {
            let json = serde_json::to_string(&slot).unwrap();
            assert_eq!(json, format!("\"{}\"", slot.key()));
        }
    }

    #[test]
    fn test_metadata_json_omits_absent_fields() {
        let json = serde_json::to_value(SlotKind::Uva.metadata()).unwrap();
        assert_eq!(json["unit_of_measurement"], "raw");
        assert_eq!(json["state_class"], "measurement");
        assert!(json.get("device_class").is_none());
        assert!(json.get("icon").is_none());
    }
}
