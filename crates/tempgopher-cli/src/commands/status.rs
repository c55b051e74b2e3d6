//! Status command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use tempgopher_cli::config::Settings;
use tempgopher_cli::session::{self, login_error};
use tempgopher_core::{DeviceView, Mode, Reconciler, ReconcilerOptions, ThermostatApi};
use tempgopher_types::TemperatureUnit;

use crate::cli::OutputFormat;
use crate::util::write_output;

pub async fn cmd_status(
    settings: &Settings,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> Result<()> {
    let api = Arc::new(session::client(settings)?);
    let devices = collect(api, settings.reconciler_options()).await?;

    let content = match format {
        OutputFormat::Json => format_status_json(settings.unit, &devices)?,
        OutputFormat::Text => format_status_text(&devices),
    };
    write_output(output, &content)?;
    Ok(())
}

/// One full cycle: poll every device and wait for every configuration.
pub(crate) async fn collect<A: ThermostatApi + 'static>(
    api: Arc<A>,
    options: ReconcilerOptions,
) -> Result<Vec<DeviceView>> {
    let (mut engine, mut arrivals) = Reconciler::new(api, options);
    engine
        .reconcile()
        .await
        .map_err(login_error)
        .context("Failed to read device status")?;
    engine.settle(&mut arrivals).await.map_err(login_error)?;
    Ok(engine.render())
}

/// Format devices as indented text, one block per device
fn format_status_text(devices: &[DeviceView]) -> String {
    if devices.is_empty() {
        return "No devices reported\n".to_string();
    }

    let width = devices.iter().map(|d| d.alias.len()).max().unwrap_or(0);
    let mut out = String::new();
    for device in devices {
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {}",
            device.alias, device.temperature, device.status_label
        );
        match &device.controls {
            Some(controls) => {
                for mode in [Mode::Cool, Mode::Heat] {
                    let line = match mode {
                        _ if !controls.enabled(mode) => format!("{} disabled", mode_name(mode)),
                        Mode::Cool => controls.cool_sentence(),
                        Mode::Heat => controls.heat_sentence(),
                    };
                    let _ = writeln!(out, "    {line}");
                }
            }
            None => {
                let _ = writeln!(out, "    (configuration unavailable)");
            }
        }
    }
    out
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Cool => "Cooling",
        Mode::Heat => "Heating",
    }
}

/// Format devices as pretty-printed JSON
fn format_status_json(unit: TemperatureUnit, devices: &[DeviceView]) -> Result<String> {
    #[derive(Serialize)]
    struct StatusJson<'a> {
        unit: TemperatureUnit,
        devices: &'a [DeviceView],
    }

    let mut json = serde_json::to_string_pretty(&StatusJson { unit, devices })?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempgopher_core::MockApi;
    use tempgopher_core::mock::sample_config;
    use tempgopher_types::DeviceStatus;

    fn api() -> Arc<MockApi> {
        let mut config = sample_config("kegerator");
        config.heat_disable = true;
        Arc::new(
            MockApi::new()
                .with_device(
                    DeviceStatus::new("fermenter", 18.3, false, true),
                    sample_config("fermenter"),
                )
                .with_device(DeviceStatus::new("kegerator", 3.5, false, false), config),
        )
    }

    #[tokio::test]
    async fn test_collect_waits_for_configs() {
        let devices = collect(api(), ReconcilerOptions::default()).await.unwrap();
        assert_eq!(devices.len(), 2);
        assert!(devices.iter().all(|d| d.controls.is_some()));
    }

    #[tokio::test]
    async fn test_collect_unauthorized_asks_for_login() {
        let api = api();
        api.set_unauthorized(true);
        let err = collect(api, ReconcilerOptions::default()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Login required"));
    }

    #[tokio::test]
    async fn test_text_output() {
        let devices = collect(api(), ReconcilerOptions::default()).await.unwrap();
        let text = format_status_text(&devices);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "fermenter    18.3°C  Cooling");
        assert_eq!(lines[1], "    Chills for 10 minutes when > 20.0°C");
        assert_eq!(lines[2], "    Heats for 5 minutes when < 18.0°C");
        assert_eq!(lines[3], "kegerator     3.5°C  Idle");
        assert_eq!(lines[5], "    Heating disabled");
    }

    #[test]
    fn test_text_output_empty() {
        assert_eq!(format_status_text(&[]), "No devices reported\n");
    }

    #[tokio::test]
    async fn test_json_output() {
        let options = ReconcilerOptions {
            unit: TemperatureUnit::Fahrenheit,
            ..ReconcilerOptions::default()
        };
        let devices = collect(api(), options).await.unwrap();
        let json = format_status_json(TemperatureUnit::Fahrenheit, &devices).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["unit"], "fahrenheit");
        assert_eq!(value["devices"][0]["alias"], "fermenter");
        assert_eq!(value["devices"][0]["state"], "cooling");
        assert_eq!(value["devices"][0]["controls"]["high_temp"], "68.0");
        assert_eq!(value["devices"][1]["controls"]["heat_enabled"], false);
    }
}
