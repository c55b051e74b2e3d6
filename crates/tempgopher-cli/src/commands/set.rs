//! Set command implementation.
//!
//! Runs the same edit/commit cycle as the dashboard: fetch the device's
//! configuration, open an edit, change the requested fields, submit.

use std::sync::Arc;

use anyhow::{Context, Result, bail};

use tempgopher_cli::config::Settings;
use tempgopher_cli::session::{self, login_error};
use tempgopher_core::{DeviceView, EditField, Mode, Reconciler, ReconcilerOptions, ThermostatApi};

use crate::cli::SetArgs;

pub async fn cmd_set(settings: &Settings, args: &SetArgs, quiet: bool) -> Result<()> {
    let api = Arc::new(session::client(settings)?);
    let device = apply(api, settings.reconciler_options(), args).await?;

    if !quiet {
        println!("Updated {}", device.alias);
        if let Some(controls) = &device.controls {
            if controls.cool_enabled {
                println!("  {}", controls.cool_sentence());
            }
            if controls.heat_enabled {
                println!("  {}", controls.heat_sentence());
            }
        }
    }
    Ok(())
}

/// Field edits requested on the command line, in display units.
fn requested_edits(args: &SetArgs) -> Vec<(EditField, f64)> {
    [
        (EditField::HighTemp, args.high),
        (EditField::LowTemp, args.low),
        (EditField::CoolMinutes, args.cool_minutes),
        (EditField::HeatMinutes, args.heat_minutes),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|v| (field, v)))
    .collect()
}

/// Apply `args` to one device and return its refreshed row.
pub(crate) async fn apply<A: ThermostatApi + 'static>(
    api: Arc<A>,
    options: ReconcilerOptions,
    args: &SetArgs,
) -> Result<DeviceView> {
    let edits = requested_edits(args);
    let toggles: Vec<(Mode, bool)> = [(Mode::Cool, args.cool), (Mode::Heat, args.heat)]
        .into_iter()
        .filter_map(|(mode, enabled)| enabled.map(|e| (mode, e)))
        .collect();
    if edits.is_empty() && toggles.is_empty() {
        bail!("Nothing to change: pass at least one of --high, --low, --cool-minutes, --heat-minutes, --cool, --heat");
    }

    let alias = args.alias.as_str();
    let (mut engine, mut arrivals) = Reconciler::new(api, options);
    engine
        .reconcile()
        .await
        .map_err(login_error)
        .context("Failed to read device status")?;
    engine.settle(&mut arrivals).await.map_err(login_error)?;

    match engine.device(alias) {
        None => bail!("Unknown device: {alias}"),
        Some(model) if !model.is_editable() => {
            bail!("Configuration for {alias} could not be read")
        }
        Some(_) => {}
    }

    for (field, value) in edits {
        engine.edit_field(alias, field, value.to_string())?;
    }
    for (mode, enabled) in toggles {
        engine.set_enabled(alias, mode, enabled)?;
    }

    let outcome = engine.commit(alias).await?;
    outcome
        .submitted
        .map_err(login_error)
        .with_context(|| format!("Failed to update {alias}"))?;

    engine.settle(&mut arrivals).await.map_err(login_error)?;
    engine
        .render()
        .into_iter()
        .find(|device| device.alias == alias)
        .with_context(|| format!("{alias} disappeared after the update"))
}
