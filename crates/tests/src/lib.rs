//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - documented configuration scenarios
//! - property checks over the accepted value sets
//! - file -> descriptor -> registration -> host instantiation

#[cfg(test)]
mod scenario_tests {
    use std::time::Duration;

    use config_loader::{build_registration, validate, ConfigMapping};
    use contracts::{
        ContractError, DeviceClass, IntegrationTime, MeasurementMode, SlotKind, UNIT_UV_INDEX,
    };
    use serde_json::{json, Value};

    fn mapping(value: Value) -> ConfigMapping {
        match value {
            Value::Object(map) => map,
            other => panic!("not a mapping: {other}"),
        }
    }

    #[test]
    fn scenario_empty_block_resolves_defaults() {
        let d = validate(&mapping(json!({}))).unwrap();
        assert_eq!(d.integration_time, IntegrationTime::Ms100);
        assert_eq!(d.mode, MeasurementMode::Active);
        assert_eq!(d.i2c_address.get(), 0x10);
        assert_eq!(d.polling_interval, Duration::from_secs(60));
        assert!(d.slots.is_empty());
    }

    #[test]
    fn scenario_long_integration_with_uv_index() {
        let d = validate(&mapping(json!({ "integration_time": "800ms", "uv_index": {} }))).unwrap();
        assert_eq!(d.integration_time, IntegrationTime::Ms800);

        let reg = build_registration(d);
        assert_eq!(reg.channels.len(), 1);
        let channel = &reg.channels[0];
        assert_eq!(channel.slot, SlotKind::UvIndex);
        assert_eq!(channel.metadata, SlotKind::UvIndex.metadata());
        assert_eq!(channel.metadata.unit_of_measurement, UNIT_UV_INDEX);
        assert_eq!(
            channel.metadata.device_class,
            Some(DeviceClass::UltravioletIndex)
        );
    }

    #[test]
    fn scenario_bogus_mode() {
        let err = validate(&mapping(json!({ "mode": "bogus" }))).unwrap_err();
        assert!(
            matches!(&err, ContractError::UnknownEnumValue { field, value, .. } if field == "mode" && value == "bogus"),
            "got: {err}"
        );
    }

    #[test]
    fn scenario_address_out_of_range() {
        let err = validate(&mapping(json!({ "i2c_address": 200 }))).unwrap_err();
        assert!(matches!(err, ContractError::AddressOutOfRange { value: 200, .. }));
    }
}

#[cfg(test)]
mod property_tests {
    use config_loader::{build_registration, validate, ConfigMapping};
    use contracts::{ContractError, IntegrationTime, MeasurementMode, SlotKind};
    use serde_json::{json, Value};

    fn mapping(value: Value) -> ConfigMapping {
        match value {
            Value::Object(map) => map,
            other => panic!("not a mapping: {other}"),
        }
    }

    /// Mixed-case variants of a spelling
    fn case_variants(s: &str) -> Vec<String> {
        let alternating: String = s
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if i % 2 == 0 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect();
        vec![s.to_string(), s.to_ascii_uppercase(), alternating]
    }

    #[test]
    fn accepted_enum_spellings_resolve() {
        for spelling in IntegrationTime::ACCEPTED {
            let expected = IntegrationTime::parse(spelling).unwrap();
            for input in case_variants(spelling) {
                let d = validate(&mapping(json!({ "integration_time": input }))).unwrap();
                assert_eq!(d.integration_time, expected);
            }
        }
        for spelling in MeasurementMode::ACCEPTED {
            let expected = MeasurementMode::parse(spelling).unwrap();
            for input in case_variants(spelling) {
                let d = validate(&mapping(json!({ "mode": input }))).unwrap();
                assert_eq!(d.mode, expected);
            }
        }
    }

    #[test]
    fn rejected_enum_spellings_name_their_field() {
        let bad = ["", "100", "100 ms", "0ms", "1600ms", "auto", "activ", "forcedd", "off"];
        for field in ["integration_time", "mode"] {
            for value in bad {
                let err = validate(&mapping(json!({ field: value }))).unwrap_err();
                assert!(
                    matches!(&err, ContractError::UnknownEnumValue { field: f, .. } if f == field),
                    "{field}={value:?}: {err}"
                );
            }
        }
    }

    #[test]
    fn address_range_is_exact() {
        for raw in -300i64..=300 {
            let result = validate(&mapping(json!({ "i2c_address": raw })));
            if (1..=127).contains(&raw) {
                assert_eq!(i64::from(result.unwrap().i2c_address.get()), raw);
            } else {
                assert!(
                    matches!(result, Err(ContractError::AddressOutOfRange { value, .. }) if value == raw),
                    "raw {raw}"
                );
            }
        }
    }

    #[test]
    fn validation_is_deterministic() {
        let block = mapping(json!({
            "id": "roof",
            "integration_time": "400ms",
            "mode": "force",
            "polling_interval": "15s",
            "uva": { "name": "UVA" },
            "uvcomp1": null,
        }));
        let first = validate(&block).unwrap();
        let second = validate(&block).unwrap();
        assert_eq!(first, second);
        assert_eq!(build_registration(first), build_registration(second));
    }

    #[test]
    fn registration_slots_match_input_keys() {
        for mask in 0u8..32 {
            let mut block = ConfigMapping::new();
            for (bit, slot) in SlotKind::ALL.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    block.insert(slot.key().to_string(), Value::Null);
                }
            }
            let reg = build_registration(validate(&block).unwrap());
            let declared: Vec<_> = reg.slots().collect();
            let expected: Vec<_> = SlotKind::ALL
                .into_iter()
                .filter(|slot| block.contains_key(slot.key()))
                .collect();
            assert_eq!(declared, expected, "mask {mask:05b}");
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use config_loader::{build_registration, ConfigFormat, ConfigLoader};
    use contracts::{ContractError, SlotKind};
    use device_factory::{DeviceFactory, HostCall, MockDeviceHost, MockHostConfig};

    const HOME_YAML: &str = r#"
sensor:
  - platform: veml6075_sensor
    id: roof_uv
    integration_time: 200ms
    mode: active
    polling_interval: 30s
    uv_index:
      name: "Roof UV Index"
      icon: "mdi:weather-sunny-alert"
    uva:
    uvb:
  - platform: veml6075
    id: lab_uv
    i2c_id: bus_b
    mode: forced
    high_dynamic: true
    uvcomp1: {}
    uvcomp2: {}
"#;

    /// File -> descriptors -> registrations -> host
    #[test]
    fn test_e2e_yaml_to_host() {
        let descriptors = ConfigLoader::load_from_str(HOME_YAML, ConfigFormat::Yaml).unwrap();
        let registrations: Vec<_> = descriptors.into_iter().map(build_registration).collect();

        let mut factory = DeviceFactory::new(MockDeviceHost::new());
        let devices = factory.instantiate_all(registrations).unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].component_id, "roof_uv");
        assert_eq!(devices[0].polling_interval.as_secs(), 30);
        let roof_slots: Vec<_> = devices[0].channels.iter().map(|(s, _)| *s).collect();
        assert_eq!(roof_slots, vec![SlotKind::UvIndex, SlotKind::Uva, SlotKind::Uvb]);
        let lab_slots: Vec<_> = devices[1].channels.iter().map(|(s, _)| *s).collect();
        assert_eq!(lab_slots, vec![SlotKind::UvComp1, SlotKind::UvComp2]);

        let host = factory.into_host();
        assert_eq!(host.open_devices(), 2);
        let acquires = host
            .calls()
            .into_iter()
            .filter(|c| matches!(c, HostCall::Acquire { .. }))
            .count();
        assert_eq!(acquires, 2);
    }

    /// An invalid block anywhere means nothing reaches the host
    #[test]
    fn test_e2e_invalid_block_registers_nothing() {
        let yaml = HOME_YAML.replace("integration_time: 200ms", "integration_time: 300ms");
        let err = ConfigLoader::load_from_str(&yaml, ConfigFormat::Yaml).unwrap_err();
        assert_eq!(err.field(), Some("sensor[0].integration_time"));
        assert!(matches!(err, ContractError::UnknownEnumValue { .. }));
    }

    /// Host failure on the second device releases the first
    #[test]
    fn test_e2e_host_failure_rolls_back() {
        let descriptors = ConfigLoader::load_from_str(HOME_YAML, ConfigFormat::Yaml).unwrap();
        let registrations: Vec<_> = descriptors.into_iter().map(build_registration).collect();

        let host = MockDeviceHost::with_config(MockHostConfig {
            fail_channels: vec![SlotKind::UvComp2],
            ..Default::default()
        });
        let mut factory = DeviceFactory::new(host);
        assert!(factory.instantiate_all(registrations).is_err());
        assert_eq!(factory.host().open_devices(), 0);
    }
}
