//! Device Factory error types

use contracts::{ContractError, I2cAddress, SlotKind};
use thiserror::Error;

use crate::host::DeviceHandle;

/// Device Factory specific error
#[derive(Debug, Error)]
pub enum DeviceFactoryError {
    /// Configuration rejected before reaching the host
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// No device handle could be opened at the address
    #[error("cannot open i2c device at {address} on bus '{bus}': {message}")]
    BusUnavailable {
        bus: String,
        address: I2cAddress,
        message: String,
    },

    /// Host refused the component
    #[error("failed to register component '{component_id}': {message}")]
    RegistrationFailed {
        component_id: String,
        message: String,
    },

    /// Host could not allocate a reading channel
    #[error("failed to allocate channel '{slot}' for '{component_id}': {message}")]
    ChannelAllocationFailed {
        component_id: String,
        slot: SlotKind,
        message: String,
    },

    /// Device handle could not be released
    #[error("failed to release device {device}: {message}")]
    ReleaseFailed { device: DeviceHandle, message: String },
}

impl DeviceFactoryError {
    /// Create bus unavailable error
    pub fn bus_unavailable(
        bus: Option<&str>,
        address: I2cAddress,
        message: impl Into<String>,
    ) -> Self {
        Self::BusUnavailable {
            bus: bus.unwrap_or("default").to_string(),
            address,
            message: message.into(),
        }
    }

    /// Create channel allocation error
    pub fn channel_allocation(
        component_id: impl Into<String>,
        slot: SlotKind,
        message: impl Into<String>,
    ) -> Self {
        Self::ChannelAllocationFailed {
            component_id: component_id.into(),
            slot,
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, DeviceFactoryError>;
