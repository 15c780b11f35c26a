//! # Device Factory
//!
//! Hands a `DeviceRegistration` to the host framework.
//!
//! Responsibilities:
//! - Open a device handle at the registered bus address
//! - Register the polling component with the resolved settings
//! - Allocate one reading channel per declared slot
//! - Release the device if any step fails, so no partial device remains
//!
//! The host framework is reached through the [`DeviceHost`] trait;
//! [`MockDeviceHost`] records calls and injects failures for tests.

pub mod error;
pub mod factory;
pub mod host;
pub mod mock_host;

pub use contracts::DeviceRegistration;
pub use error::{DeviceFactoryError, Result};
pub use factory::{DeviceFactory, InstantiatedDevice};
pub use host::{ChannelHandle, DeviceHandle, DeviceHost};
pub use mock_host::{HostCall, MockDeviceHost, MockHostConfig};
