//! Registration building
//!
//! Consumes a validated descriptor and emits the record the device
//! instantiation step works from.

use contracts::{ChannelRegistration, DeviceRegistration, SensorDescriptor};
use tracing::info;

/// Build the handoff record for a validated descriptor
///
/// One channel per declared slot, in slot order. Undeclared slots are left
/// out entirely.
pub fn build_registration(descriptor: SensorDescriptor) -> DeviceRegistration {
    let SensorDescriptor {
        id,
        i2c_bus,
        i2c_address,
        integration_time,
        mode,
        polling_interval,
        high_dynamic,
        shutdown,
        slots,
    } = descriptor;

    let channels: Vec<ChannelRegistration> = slots
        .into_iter()
        .map(|(slot, sub)| ChannelRegistration {
            slot,
            name: sub.name,
            metadata: sub.metadata,
        })
        .collect();

    info!(
        component_id = %id,
        address = %i2c_address,
        channels = channels.len(),
        "registration built"
    );

    DeviceRegistration {
        component_id: id,
        i2c_bus,
        i2c_address,
        integration_time,
        mode,
        polling_interval,
        high_dynamic,
        shutdown,
        channels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use contracts::{IntegrationTime, MeasurementMode, SlotKind};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn descriptor(value: Value) -> SensorDescriptor {
        match value {
            Value::Object(map) => validate(&map).unwrap(),
            other => panic!("not a mapping: {other}"),
        }
    }

    #[test]
    fn test_defaults_have_no_channels() {
        let reg = build_registration(descriptor(json!({})));
        assert_eq!(reg.component_id, "veml6075");
        assert_eq!(reg.i2c_address.get(), 0x10);
        assert_eq!(reg.integration_time, IntegrationTime::Ms100);
        assert_eq!(reg.mode, MeasurementMode::Active);
        assert_eq!(reg.polling_interval, Duration::from_secs(60));
        assert!(reg.channels.is_empty());
    }

    #[test]
    fn test_channels_follow_slot_order() {
        let reg = build_registration(descriptor(json!({
            "uvcomp2": {},
            "uv_index": {},
            "uvb": {},
        })));
        let slots: Vec<_> = reg.slots().collect();
        assert_eq!(slots, vec![SlotKind::UvIndex, SlotKind::Uvb, SlotKind::UvComp2]);
        assert!(reg.channel(SlotKind::Uva).is_none());
    }

    #[test]
    fn test_slot_presence_matches_input() {
        // every subset of the five slot keys
        for mask in 0u8..32 {
            let mut block = serde_json::Map::new();
            for (bit, slot) in SlotKind::ALL.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    block.insert(slot.key().to_string(), json!({}));
                }
            }
            let reg = build_registration(validate(&block).unwrap());
            for slot in SlotKind::ALL {
                assert_eq!(
                    reg.channel(slot).is_some(),
                    block.contains_key(slot.key()),
                    "mask {mask:05b} slot {slot}"
                );
            }
        }
    }

    #[test]
    fn test_registration_json_omits_absent_slots() {
        let reg = build_registration(descriptor(json!({
            "integration_time": "800ms",
            "uv_index": { "icon": "mdi:sun" },
        })));
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["integration_time"], "800ms");
        assert_eq!(json["channels"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["channels"][0]["slot"], "uv_index");
        assert_eq!(json["channels"][0]["metadata"]["icon"], "mdi:sun");
        assert!(json.get("i2c_bus").is_none());
    }
}
