//! Host framework abstraction
//!
//! The host owns the I2C bus and the polling scheduler; the factory only
//! drives it through this trait.

use contracts::{ChannelRegistration, DeviceRegistration, I2cAddress};

use crate::error::Result;

/// Handle to an opened I2C device
pub type DeviceHandle = u32;

/// Handle to an allocated reading channel
pub type ChannelHandle = u32;

/// Host framework trait
///
/// Synchronous: every call completes during configuration load.
pub trait DeviceHost {
    /// Open a device handle at `address` on `bus` (`None` = default bus)
    fn acquire_i2c_device(&mut self, bus: Option<&str>, address: I2cAddress)
        -> Result<DeviceHandle>;

    /// Register the polling component for an opened device
    ///
    /// Carries the integration time, mode, flags and polling interval.
    fn register_component(
        &mut self,
        device: DeviceHandle,
        registration: &DeviceRegistration,
    ) -> Result<()>;

    /// Allocate the reading channel for one declared slot
    fn allocate_channel(
        &mut self,
        device: DeviceHandle,
        channel: &ChannelRegistration,
    ) -> Result<ChannelHandle>;

    /// Release a device and everything allocated for it
    ///
    /// Idempotent: releasing an unknown handle returns Ok
    fn release_device(&mut self, device: DeviceHandle) -> Result<()>;
}
