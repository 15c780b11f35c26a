//! 配置校验模块
//!
//! 把一个无类型的传感器配置块转换为 `SensorDescriptor`。
//!
//! 校验规则（按此顺序）：
//! - 所有 key 均属于已知字段
//! - integration_time 为五种取值之一 (不区分大小写)
//! - mode 为可接受的取值之一
//! - i2c_address 为 1..=127 内的整数
//! - polling_interval 为带单位的正时长
//! - platform / id / i2c_id / high_dynamic / shutdown 格式合法
//! - 每个声明的 slot 只包含用户可设置的 key
//!
//! 默认值仅用于缺失的 key。返回第一个遇到的错误，
//! 该配置块不产生任何结果。

use std::collections::BTreeMap;
use std::time::Duration;

use contracts::{
    ContractError, I2cAddress, IntegrationTime, MeasurementMode, SensorDescriptor, SlotKind,
    SubSensor, DEFAULT_COMPONENT_ID, DEFAULT_POLLING_INTERVAL, FIXED_METADATA_KEYS,
};
use serde_json::{Map, Value};
use tracing::debug;

/// Untyped configuration block
pub type ConfigMapping = Map<String, Value>;

pub const KEY_ID: &str = "id";
pub const KEY_PLATFORM: &str = "platform";
pub const KEY_I2C_ID: &str = "i2c_id";
pub const KEY_I2C_ADDRESS: &str = "i2c_address";
pub const KEY_INTEGRATION_TIME: &str = "integration_time";
pub const KEY_MODE: &str = "mode";
pub const KEY_POLLING_INTERVAL: &str = "polling_interval";
pub const KEY_HIGH_DYNAMIC: &str = "high_dynamic";
pub const KEY_SHUTDOWN: &str = "shutdown";

const SCALAR_KEYS: [&str; 9] = [
    KEY_ID,
    KEY_PLATFORM,
    KEY_I2C_ID,
    KEY_I2C_ADDRESS,
    KEY_INTEGRATION_TIME,
    KEY_MODE,
    KEY_POLLING_INTERVAL,
    KEY_HIGH_DYNAMIC,
    KEY_SHUTDOWN,
];

const PLATFORMS: [&str; 2] = ["veml6075", "veml6075_sensor"];

const SLOT_KEY_NAME: &str = "name";
const SLOT_KEY_ICON: &str = "icon";

/// 校验单个传感器配置块
///
/// 纯函数：相同输入总是得到相同的 descriptor 或相同的错误。
pub fn validate(config: &ConfigMapping) -> Result<SensorDescriptor, ContractError> {
    check_known_keys(config)?;
    let integration_time = check_integration_time(config)?;
    let mode = check_mode(config)?;
    let i2c_address = check_i2c_address(config)?;
    let polling_interval = check_polling_interval(config)?;
    check_platform(config)?;
    let id = check_identifier(config, KEY_ID)?.unwrap_or_else(|| DEFAULT_COMPONENT_ID.into());
    let i2c_bus = check_identifier(config, KEY_I2C_ID)?;
    let high_dynamic = check_flag(config, KEY_HIGH_DYNAMIC)?;
    let shutdown = check_flag(config, KEY_SHUTDOWN)?;
    let slots = check_slots(config, &id)?;

    if shutdown && mode == MeasurementMode::Forced {
        debug!(id = %id, "shutdown is implied by forced mode");
    }

    debug!(
        id = %id,
        address = %i2c_address,
        integration_time = %integration_time,
        mode = %mode,
        slots = slots.len(),
        "sensor block accepted"
    );

    Ok(SensorDescriptor {
        id,
        i2c_bus,
        i2c_address,
        integration_time,
        mode,
        polling_interval,
        high_dynamic,
        shutdown,
        slots,
    })
}

/// 校验应为单个配置块的值
pub fn validate_value(value: &Value) -> Result<SensorDescriptor, ContractError> {
    match value {
        Value::Object(config) => validate(config),
        other => Err(ContractError::invalid_value(
            "",
            render(other),
            "expected a mapping of sensor options",
        )),
    }
}

fn check_known_keys(config: &ConfigMapping) -> Result<(), ContractError> {
    for key in config.keys() {
        let known = SCALAR_KEYS.contains(&key.as_str()) || SlotKind::from_key(key).is_some();
        if !known {
            return Err(ContractError::unknown_key(key.as_str()));
        }
    }
    Ok(())
}

fn check_integration_time(config: &ConfigMapping) -> Result<IntegrationTime, ContractError> {
    let Some(value) = config.get(KEY_INTEGRATION_TIME) else {
        return Ok(IntegrationTime::default());
    };
    value
        .as_str()
        .and_then(IntegrationTime::parse)
        .ok_or_else(|| {
            ContractError::unknown_enum_value(
                KEY_INTEGRATION_TIME,
                render(value),
                &IntegrationTime::ACCEPTED,
            )
        })
}

fn check_mode(config: &ConfigMapping) -> Result<MeasurementMode, ContractError> {
    let Some(value) = config.get(KEY_MODE) else {
        return Ok(MeasurementMode::default());
    };
    value
        .as_str()
        .and_then(MeasurementMode::parse)
        .ok_or_else(|| {
            ContractError::unknown_enum_value(KEY_MODE, render(value), &MeasurementMode::ACCEPTED)
        })
}

fn check_i2c_address(config: &ConfigMapping) -> Result<I2cAddress, ContractError> {
    let Some(value) = config.get(KEY_I2C_ADDRESS) else {
        return Ok(I2cAddress::default());
    };

    let raw = match value {
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(v), _) => v,
            (None, Some(_)) => {
                return Err(ContractError::invalid_value(
                    KEY_I2C_ADDRESS,
                    render(value),
                    "integer is too large",
                ))
            }
            (None, None) => {
                return Err(ContractError::invalid_value(
                    KEY_I2C_ADDRESS,
                    render(value),
                    "expected an integer",
                ))
            }
        },
        Value::String(s) => parse_integer(s).ok_or_else(|| {
            ContractError::invalid_value(
                KEY_I2C_ADDRESS,
                s.as_str(),
                "expected a decimal or 0x-prefixed hex integer",
            )
        })?,
        other => {
            return Err(ContractError::invalid_value(
                KEY_I2C_ADDRESS,
                render(other),
                "expected an integer",
            ))
        }
    };

    I2cAddress::from_i64(raw).ok_or_else(|| ContractError::AddressOutOfRange {
        field: KEY_I2C_ADDRESS.to_string(),
        value: raw,
    })
}

fn check_polling_interval(config: &ConfigMapping) -> Result<Duration, ContractError> {
    let Some(value) = config.get(KEY_POLLING_INTERVAL) else {
        return Ok(DEFAULT_POLLING_INTERVAL);
    };
    let invalid = |message: &str| {
        ContractError::invalid_value(KEY_POLLING_INTERVAL, render(value), message)
    };

    let interval = match value {
        Value::String(s) => parse_duration(s).map_err(|message| invalid(&message))?,
        Value::Number(_) => return Err(invalid("missing time unit, e.g. '60s'")),
        _ => return Err(invalid("expected a duration such as '60s'")),
    };
    if interval.is_zero() {
        return Err(invalid("must be positive"));
    }
    Ok(interval)
}

fn check_platform(config: &ConfigMapping) -> Result<(), ContractError> {
    let Some(value) = config.get(KEY_PLATFORM) else {
        return Ok(());
    };
    match value.as_str() {
        Some(s) if PLATFORMS.contains(&s.to_ascii_lowercase().as_str()) => Ok(()),
        _ => Err(ContractError::unknown_enum_value(
            KEY_PLATFORM,
            render(value),
            &PLATFORMS,
        )),
    }
}

/// Optional `[A-Za-z0-9_]+` string
fn check_identifier(config: &ConfigMapping, key: &str) -> Result<Option<String>, ContractError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };
    match value.as_str() {
        Some(s) if is_identifier(s) => Ok(Some(s.to_string())),
        _ => Err(ContractError::invalid_value(
            key,
            render(value),
            "expected a non-empty identifier of letters, digits and '_'",
        )),
    }
}

fn check_flag(config: &ConfigMapping, key: &str) -> Result<bool, ContractError> {
    match config.get(key) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(ContractError::invalid_value(
            key,
            render(other),
            "expected a boolean",
        )),
    }
}

fn check_slots(
    config: &ConfigMapping,
    component_id: &str,
) -> Result<BTreeMap<SlotKind, SubSensor>, ContractError> {
    let mut slots = BTreeMap::new();
    for slot in SlotKind::ALL {
        if let Some(value) = config.get(slot.key()) {
            slots.insert(slot, check_slot(slot, value, component_id)?);
        }
    }
    Ok(slots)
}

/// 按固定元数据解析一个声明的 slot
fn check_slot(slot: SlotKind, value: &Value, component_id: &str) -> Result<SubSensor, ContractError> {
    let empty = ConfigMapping::new();
    let options = match value {
        Value::Null => &empty,
        Value::Object(options) => options,
        other => {
            return Err(ContractError::malformed_sub_sensor(
                slot.key(),
                format!(
                    "expected a mapping of channel options, got '{}'",
                    render(other)
                ),
            ))
        }
    };

    let path = |key: &str| format!("{}.{}", slot.key(), key);

    for key in options.keys() {
        if FIXED_METADATA_KEYS.contains(&key.as_str()) {
            return Err(ContractError::malformed_sub_sensor(
                path(key),
                "channel metadata is fixed for this slot",
            ));
        }
        if key != SLOT_KEY_NAME && key != SLOT_KEY_ICON {
            return Err(ContractError::unknown_key(path(key)));
        }
    }

    let name = match options.get(SLOT_KEY_NAME) {
        None => format!("{component_id} {}", slot.label()),
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(other) => {
            return Err(ContractError::invalid_value(
                path(SLOT_KEY_NAME),
                render(other),
                "expected a non-empty string",
            ))
        }
    };

    let mut metadata = slot.metadata();
    metadata.icon = match options.get(SLOT_KEY_ICON) {
        None => None,
        Some(Value::String(s)) if is_icon(s) => Some(s.clone()),
        Some(other) => {
            return Err(ContractError::invalid_value(
                path(SLOT_KEY_ICON),
                render(other),
                "expected an icon in 'namespace:name' form",
            ))
        }
    };

    Ok(SubSensor { name, metadata })
}

/// 解析 `<数值><单位>`，单位为 ms、s、min 或 h
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    if number.is_empty() {
        return Err("expected a positive duration such as '60s'".to_string());
    }
    let unit_nanos: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" => return Err("missing time unit, e.g. '60s'".to_string()),
        "ms" => 1e6,
        "s" | "sec" => 1e9,
        "min" => 60e9,
        "h" => 3600e9,
        other => return Err(format!("unknown time unit '{other}', expected ms, s, min or h")),
    };
    let value: f64 = number
        .parse()
        .map_err(|_| format!("'{number}' is not a number"))?;

    let nanos = (value * unit_nanos).round();
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Err("duration is too large".to_string());
    }
    Ok(Duration::from_nanos(nanos as u64))
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    // std 的解析函数自带符号处理，这里只允许开头一个 '-'
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
            i64::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if digits.bytes().all(|b| b.is_ascii_digit()) => digits.parse::<i64>().ok()?,
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_icon(s: &str) -> bool {
    match s.split_once(':') {
        Some((namespace, name)) => {
            !namespace.is_empty()
                && !name.is_empty()
                && !s.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Offending value as shown in diagnostics
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
