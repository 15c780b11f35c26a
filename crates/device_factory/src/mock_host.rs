//! Mock 宿主框架
//!
//! 用于单元测试的 mock 实现，记录所有调用并支持注入失败场景。

use std::collections::HashMap;

use contracts::{ChannelRegistration, DeviceRegistration, I2cAddress, SlotKind};
use tracing::{debug, instrument};

use crate::error::{DeviceFactoryError, Result};
use crate::host::{ChannelHandle, DeviceHandle, DeviceHost};

/// Mock 宿主配置
#[derive(Debug, Default, Clone)]
pub struct MockHostConfig {
    /// 无法打开的地址
    pub fail_addresses: Vec<I2cAddress>,
    /// 宿主拒绝注册的 component id
    pub fail_components: Vec<String>,
    /// channel 分配会失败的 slot
    pub fail_channels: Vec<SlotKind>,
    /// 所有 release 调用均失败
    pub fail_release: bool,
}

/// 记录的宿主调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Acquire {
        bus: Option<String>,
        address: I2cAddress,
    },
    Register {
        device: DeviceHandle,
        component_id: String,
    },
    AllocateChannel {
        device: DeviceHandle,
        slot: SlotKind,
        name: String,
    },
    Release {
        device: DeviceHandle,
    },
}

#[derive(Debug)]
struct OpenDevice {
    bus: Option<String>,
    component_id: Option<String>,
    address: I2cAddress,
    channels: Vec<ChannelHandle>,
}

/// Mock host framework
pub struct MockDeviceHost {
    /// 配置（可注入失败场景）
    config: MockHostConfig,
    /// 句柄计数器，设备和 channel 共用
    next_handle: u32,
    /// 已打开的设备
    devices: HashMap<DeviceHandle, OpenDevice>,
    /// 调用记录
    calls: Vec<HostCall>,
}

impl MockDeviceHost {
    /// 创建默认 mock 宿主
    pub fn new() -> Self {
        Self::with_config(MockHostConfig::default())
    }

    /// 使用配置创建 mock 宿主
    pub fn with_config(config: MockHostConfig) -> Self {
        Self {
            config,
            next_handle: 1000, // starts at 1000 so handles stand out in logs
            devices: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// 获取当前已打开的设备数量
    pub fn open_devices(&self) -> usize {
        self.devices.len()
    }

    /// 获取设备已分配的 channel 数量
    pub fn allocated_channels(&self, device: DeviceHandle) -> usize {
        self.devices.get(&device).map_or(0, |d| d.channels.len())
    }

    /// 获取所有调用记录（按时间顺序）
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.clone()
    }

    fn allocate_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl Default for MockDeviceHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceHost for MockDeviceHost {
    #[instrument(name = "mock_host_acquire", skip(self, address), fields(address = %address))]
    fn acquire_i2c_device(
        &mut self,
        bus: Option<&str>,
        address: I2cAddress,
    ) -> Result<DeviceHandle> {
        self.calls.push(HostCall::Acquire {
            bus: bus.map(str::to_string),
            address,
        });

        if self.config.fail_addresses.contains(&address) {
            return Err(DeviceFactoryError::bus_unavailable(
                bus,
                address,
                "injected failure",
            ));
        }
        let in_use = self
            .devices
            .values()
            .any(|d| d.address == address && d.bus.as_deref() == bus);
        if in_use {
            return Err(DeviceFactoryError::bus_unavailable(
                bus,
                address,
                "address already in use",
            ));
        }

        let handle = self.allocate_handle();
        self.devices.insert(
            handle,
            OpenDevice {
                bus: bus.map(str::to_string),
                component_id: None,
                address,
                channels: Vec::new(),
            },
        );
        debug!(handle, "device opened");
        Ok(handle)
    }

    #[instrument(
        name = "mock_host_register",
        skip(self, registration),
        fields(component_id = %registration.component_id)
    )]
    fn register_component(
        &mut self,
        device: DeviceHandle,
        registration: &DeviceRegistration,
    ) -> Result<()> {
        self.calls.push(HostCall::Register {
            device,
            component_id: registration.component_id.clone(),
        });

        let refused = self
            .config
            .fail_components
            .contains(&registration.component_id);
        let open = match self.devices.get_mut(&device) {
            Some(open) if !refused => open,
            _ => {
                return Err(DeviceFactoryError::RegistrationFailed {
                    component_id: registration.component_id.clone(),
                    message: if refused {
                        "injected failure".into()
                    } else {
                        format!("unknown device {device}")
                    },
                })
            }
        };
        open.component_id = Some(registration.component_id.clone());
        Ok(())
    }

    #[instrument(
        name = "mock_host_allocate_channel",
        skip(self, channel),
        fields(slot = %channel.slot)
    )]
    fn allocate_channel(
        &mut self,
        device: DeviceHandle,
        channel: &ChannelRegistration,
    ) -> Result<ChannelHandle> {
        self.calls.push(HostCall::AllocateChannel {
            device,
            slot: channel.slot,
            name: channel.name.clone(),
        });

        let component_id = match self.devices.get(&device) {
            Some(open) => open.component_id.clone().unwrap_or_default(),
            None => {
                return Err(DeviceFactoryError::channel_allocation(
                    format!("device {device}"),
                    channel.slot,
                    "unknown device",
                ))
            }
        };
        if self.config.fail_channels.contains(&channel.slot) {
            return Err(DeviceFactoryError::channel_allocation(
                component_id,
                channel.slot,
                "injected failure",
            ));
        }

        let handle = self.allocate_handle();
        if let Some(open) = self.devices.get_mut(&device) {
            open.channels.push(handle);
        }
        Ok(handle)
    }

    #[instrument(name = "mock_host_release", skip(self))]
    fn release_device(&mut self, device: DeviceHandle) -> Result<()> {
        self.calls.push(HostCall::Release { device });

        if self.config.fail_release {
            return Err(DeviceFactoryError::ReleaseFailed {
                device,
                message: "injected failure".into(),
            });
        }
        self.devices.remove(&device);
        Ok(())
    }
}
