//! # Contracts
//!
//! Shared data structures for the VEML6075 registration pipeline.
//! Every other crate in the workspace depends on this one, never the reverse.
//!
//! ## Lifecycle
//! - `config_loader` turns an untyped mapping into a [`SensorDescriptor`]
//! - the descriptor is consumed by value to produce a [`DeviceRegistration`]
//! - `device_factory` hands the registration to the host framework

mod address;
mod descriptor;
mod error;
mod registration;
mod slot;

pub use address::I2cAddress;
pub use descriptor::*;
pub use error::*;
pub use registration::*;
pub use slot::*;
