//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{MeasurementMode, SensorDescriptor};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    sensor_count: usize,
    channel_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            field: None,
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(descriptors) => {
            let warnings = collect_warnings(&descriptors);
            let channel_count = descriptors.iter().map(|d| d.slots.len()).sum();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                field: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    sensor_count: descriptors.len(),
                    channel_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            field: e.field().map(str::to_string),
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(descriptors: &[SensorDescriptor]) -> Vec<String> {
    let mut warnings = Vec::new();

    for d in descriptors {
        if d.slots.is_empty() {
            warnings.push(format!(
                "Sensor '{}' declares no sub-sensors - nothing will be reported",
                d.id
            ));
        }

        if d.polling_interval < d.integration_time.as_duration() {
            warnings.push(format!(
                "Sensor '{}' polls every {} but integrates for {} - readings will repeat",
                d.id,
                contracts::format_duration(d.polling_interval),
                d.integration_time
            ));
        }

        if d.shutdown && d.mode == MeasurementMode::Forced {
            warnings.push(format!(
                "Sensor '{}' sets shutdown with forced mode - forced mode already powers down between reads",
                d.id
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Sensors: {}", summary.sensor_count);
            println!("  Channels: {}", summary.channel_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref field) = result.field {
            println!("\n  Field: {}", field);
        }
        if let Some(ref error) = result.error {
            println!("  Error: {}", error);
        }
    }
}
