//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::{build_registration, ConfigLoader};
use contracts::{format_duration, DeviceRegistration};
use device_factory::{DeviceFactory, InstantiatedDevice, MockDeviceHost};
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    if args.dry_run {
        let mut factory = DeviceFactory::new(MockDeviceHost::new());
        let devices = factory
            .instantiate_config(&args.config)
            .with_context(|| format!("Dry run failed for {}", args.config.display()))?;
        print!("{}", render_dry_run(&devices));
        factory.teardown(&devices);
        return Ok(());
    }

    let descriptors = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let registrations: Vec<DeviceRegistration> =
        descriptors.into_iter().map(build_registration).collect();

    if args.json {
        let json = ConfigLoader::to_json(&registrations)
            .context("Failed to serialize registrations")?;
        println!("{}", json);
    } else {
        print!("{}", render_registrations(&registrations));
    }

    Ok(())
}

fn render_registrations(registrations: &[DeviceRegistration]) -> String {
    let mut out = String::new();
    out.push_str(&format!("VEML6075 sensors ({})\n", registrations.len()));

    for (i, reg) in registrations.iter().enumerate() {
        let is_last = i == registrations.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child = if is_last { "   " } else { "│  " };

        out.push_str(&format!("{} {}\n", prefix, reg.component_id));
        out.push_str(&format!(
            "{}├─ Bus: {} @ {}\n",
            child,
            reg.i2c_bus.as_deref().unwrap_or("default"),
            reg.i2c_address
        ));
        out.push_str(&format!(
            "{}├─ Integration: {}, mode: {}\n",
            child, reg.integration_time, reg.mode
        ));
        out.push_str(&format!(
            "{}├─ Polling: every {}\n",
            child,
            format_duration(reg.polling_interval)
        ));
        out.push_str(&format!(
            "{}├─ High dynamic: {}, shutdown: {}\n",
            child, reg.high_dynamic, reg.shutdown
        ));

        if reg.channels.is_empty() {
            out.push_str(&format!("{}└─ Channels: none\n", child));
            continue;
        }
        out.push_str(&format!("{}└─ Channels ({}):\n", child, reg.channels.len()));
        for (j, channel) in reg.channels.iter().enumerate() {
            let channel_prefix = if j == reg.channels.len() - 1 { "└─" } else { "├─" };
            let meta = &channel.metadata;
            let mut line = format!(
                "{}   {} {} \"{}\" [{}, {} decimals]",
                child,
                channel_prefix,
                channel.slot,
                channel.name,
                meta.unit_of_measurement,
                meta.accuracy_decimals
            );
            if let Some(ref icon) = meta.icon {
                line.push_str(&format!(" {}", icon));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

fn render_dry_run(devices: &[InstantiatedDevice]) -> String {
    let mut out = format!("Dry run: {} device(s) instantiated\n", devices.len());
    for device in devices {
        out.push_str(&format!(
            "  {} handle {} @ {}, polling every {}\n",
            device.component_id,
            device.device,
            device.i2c_address,
            format_duration(device.polling_interval)
        ));
        for (slot, handle) in &device.channels {
            out.push_str(&format!("    {} -> channel {}\n", slot, handle));
        }
    }
    out
}
