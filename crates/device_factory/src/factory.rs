//! DeviceFactory 核心实现
//!
//! 把 registration 实例化为宿主上的设备，失败时回滚。

use std::path::Path;
use std::time::Duration;

use config_loader::{build_registration, ConfigLoader};
use contracts::{DeviceRegistration, I2cAddress, SlotKind};
use tracing::{error, info, instrument, warn};

use crate::error::Result;
use crate::host::{ChannelHandle, DeviceHandle, DeviceHost};

/// A device the host has accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiatedDevice {
    pub component_id: String,
    pub device: DeviceHandle,
    pub i2c_address: I2cAddress,
    pub polling_interval: Duration,
    /// Allocated channels in registration order
    pub channels: Vec<(SlotKind, ChannelHandle)>,
}

impl InstantiatedDevice {
    /// Channel handle for a slot, if allocated
    pub fn channel(&self, slot: SlotKind) -> Option<ChannelHandle> {
        self.channels
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, handle)| *handle)
    }
}

/// Device Factory
///
/// 负责把 registration 实例化到宿主上，
/// 后续步骤失败时释放已打开的设备。
pub struct DeviceFactory<H: DeviceHost> {
    host: H,
}

impl<H: DeviceHost> DeviceFactory<H> {
    /// 创建新的 DeviceFactory
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Borrow the host
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Give the host back
    pub fn into_host(self) -> H {
        self.host
    }

    /// 实例化单个 registration
    ///
    /// # 原子性保证
    /// 如果注册或任一 channel 分配失败，返回错误前会先释放设备句柄。
    #[instrument(
        name = "device_factory_instantiate",
        skip(self, registration),
        fields(
            component_id = %registration.component_id,
            address = %registration.i2c_address,
            channels = registration.channels.len()
        )
    )]
    pub fn instantiate(&mut self, registration: DeviceRegistration) -> Result<InstantiatedDevice> {
        let device = self
            .host
            .acquire_i2c_device(registration.i2c_bus.as_deref(), registration.i2c_address)?;

        match self.attach(device, &registration) {
            Ok(channels) => {
                info!(device, channels = channels.len(), "device instantiated");
                Ok(InstantiatedDevice {
                    component_id: registration.component_id,
                    device,
                    i2c_address: registration.i2c_address,
                    polling_interval: registration.polling_interval,
                    channels,
                })
            }
            Err(e) => {
                warn!(error = %e, device, "instantiation failed, releasing device");
                self.release_safe(device, &registration.component_id);
                Err(e)
            }
        }
    }

    /// 批量实例化，全部成功或全部回滚
    ///
    /// 失败时释放所有已创建的设备。
    #[instrument(
        name = "device_factory_instantiate_all",
        skip(self, registrations),
        fields(count = registrations.len())
    )]
    pub fn instantiate_all(
        &mut self,
        registrations: Vec<DeviceRegistration>,
    ) -> Result<Vec<InstantiatedDevice>> {
        let mut created: Vec<InstantiatedDevice> = Vec::with_capacity(registrations.len());
        for registration in registrations {
            match self.instantiate(registration) {
                Ok(device) => created.push(device),
                Err(e) => {
                    warn!(error = %e, created = created.len(), "rolling back instantiated devices");
                    self.teardown(&created);
                    return Err(e);
                }
            }
        }
        Ok(created)
    }

    /// 加载配置文件并实例化其中所有传感器
    ///
    /// 宿主收到任何调用之前先校验整个文件，非法配置返回
    /// [`DeviceFactoryError::Contract`](crate::error::DeviceFactoryError::Contract)，不会打开任何设备。
    #[instrument(name = "device_factory_instantiate_config", skip(self, path), fields(path = %path.display()))]
    pub fn instantiate_config(&mut self, path: &Path) -> Result<Vec<InstantiatedDevice>> {
        let registrations: Vec<DeviceRegistration> = ConfigLoader::load_from_path(path)?
            .into_iter()
            .map(build_registration)
            .collect();
        info!(count = registrations.len(), "configuration accepted");
        self.instantiate_all(registrations)
    }

    /// 释放已实例化的设备
    ///
    /// # 幂等性
    /// 多次调用安全，释放失败只记录日志。
    #[instrument(name = "device_factory_teardown", skip(self, devices), fields(count = devices.len()))]
    pub fn teardown(&mut self, devices: &[InstantiatedDevice]) {
        for device in devices.iter().rev() {
            self.release_safe(device.device, &device.component_id);
        }
    }

    fn attach(
        &mut self,
        device: DeviceHandle,
        registration: &DeviceRegistration,
    ) -> Result<Vec<(SlotKind, ChannelHandle)>> {
        self.host.register_component(device, registration)?;

        let mut channels = Vec::with_capacity(registration.channels.len());
        for channel in &registration.channels {
            let handle = self.host.allocate_channel(device, channel)?;
            channels.push((channel.slot, handle));
        }
        Ok(channels)
    }

    fn release_safe(&mut self, device: DeviceHandle, component_id: &str) {
        if let Err(e) = self.host.release_device(device) {
            error!(device, component_id, error = %e, "failed to release device");
        }
    }
}
