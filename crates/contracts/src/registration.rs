//! DeviceRegistration - handoff record for the device-instantiation step

use serde::Serialize;
use std::time::Duration;

use crate::{serialize_duration, I2cAddress, IntegrationTime, MeasurementMode, SlotKind, SlotMetadata};

/// Everything the host framework needs to create the runtime device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRegistration {
    /// Component identifier
    pub component_id: String,

    /// I2C bus identifier, `None` for the default bus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i2c_bus: Option<String>,

    /// Address the bus collaborator opens a device handle at
    pub i2c_address: I2cAddress,

    pub integration_time: IntegrationTime,

    pub mode: MeasurementMode,

    #[serde(serialize_with = "serialize_duration")]
    pub polling_interval: Duration,

    pub high_dynamic: bool,

    pub shutdown: bool,

    /// Declared slots in registration order
    pub channels: Vec<ChannelRegistration>,
}

/// One reading channel to allocate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRegistration {
    pub slot: SlotKind,
    pub name: String,
    pub metadata: SlotMetadata,
}

impl DeviceRegistration {
    /// Channel for a slot, if declared
    pub fn channel(&self, slot: SlotKind) -> Option<&ChannelRegistration> {
        self.channels.iter().find(|c| c.slot == slot)
    }

    /// Declared slots in registration order
    pub fn slots(&self) -> impl Iterator<Item = SlotKind> + '_ {
        self.channels.iter().map(|c| c.slot)
    }
}
