//! SensorDescriptor - output of the config validator
//!
//! The resolved configuration of one VEML6075: bus placement, measurement
//! settings and the declared sub-sensor slots.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::{I2cAddress, SlotKind, SubSensor};

/// Default component identifier
pub const DEFAULT_COMPONENT_ID: &str = "veml6075";

/// Default polling interval
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Integration time of one UV measurement
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum IntegrationTime {
    #[serde(rename = "50ms")]
    Ms50,
    #[default]
    #[serde(rename = "100ms")]
    Ms100,
    #[serde(rename = "200ms")]
    Ms200,
    #[serde(rename = "400ms")]
    Ms400,
    #[serde(rename = "800ms")]
    Ms800,
}

impl IntegrationTime {
    /// Accepted spellings, lower case
    pub const ACCEPTED: [&'static str; 5] = ["50ms", "100ms", "200ms", "400ms", "800ms"];

    /// Parse a spelling, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "50ms" => Some(Self::Ms50),
            "100ms" => Some(Self::Ms100),
            "200ms" => Some(Self::Ms200),
            "400ms" => Some(Self::Ms400),
            "800ms" => Some(Self::Ms800),
            _ => None,
        }
    }

    /// Integration time in milliseconds
    pub fn as_millis(self) -> u16 {
        match self {
            Self::Ms50 => 50,
            Self::Ms100 => 100,
            Self::Ms200 => 200,
            Self::Ms400 => 400,
            Self::Ms800 => 800,
        }
    }

    /// Integration time as a `Duration`
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.as_millis()))
    }
}

impl fmt::Display for IntegrationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}

/// Measurement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementMode {
    /// Continuous conversion
    #[default]
    Active,
    /// One conversion per trigger, powered down in between
    Forced,
}

impl MeasurementMode {
    /// Accepted spellings, lower case. `normal` and `force` are historical.
    pub const ACCEPTED: [&'static str; 4] = ["active", "normal", "forced", "force"];

    /// Parse a spelling, case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "active" | "normal" => Some(Self::Active),
            "forced" | "force" => Some(Self::Forced),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Forced => f.write_str("forced"),
        }
    }
}

/// Validated configuration of one sensor.
///
/// Built once by the validator and consumed by value when the registration
/// record is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorDescriptor {
    /// Component identifier
    pub id: String,

    /// I2C bus identifier, `None` for the default bus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i2c_bus: Option<String>,

    /// Device address on the bus
    pub i2c_address: I2cAddress,

    /// Integration time
    pub integration_time: IntegrationTime,

    /// Measurement mode
    pub mode: MeasurementMode,

    /// Interval between host polls, always > 0
    #[serde(serialize_with = "serialize_duration")]
    pub polling_interval: Duration,

    /// High dynamic range setting
    pub high_dynamic: bool,

    /// Start powered down
    pub shutdown: bool,

    /// Declared slots; absent slots have no entry
    pub slots: BTreeMap<SlotKind, SubSensor>,
}

impl SensorDescriptor {
    /// Descriptor with every default applied and no slots declared
    pub fn with_defaults() -> Self {
        Self {
            id: DEFAULT_COMPONENT_ID.to_string(),
            i2c_bus: None,
            i2c_address: I2cAddress::default(),
            integration_time: IntegrationTime::default(),
            mode: MeasurementMode::default(),
            polling_interval: DEFAULT_POLLING_INTERVAL,
            high_dynamic: false,
            shutdown: false,
            slots: BTreeMap::new(),
        }
    }

    /// Whether a slot was declared
    pub fn has_slot(&self, slot: SlotKind) -> bool {
        self.slots.contains_key(&slot)
    }
}

/// Render a duration the way configuration files spell it (`60s`, `1500ms`)
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{millis}ms")
    }
}

/// Serialize a duration as its configuration spelling
pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_duration(*duration))
}
