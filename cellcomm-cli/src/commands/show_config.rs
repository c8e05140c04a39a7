//! Effective configuration command.

use crate::config::Config;
use anyhow::{Context, Result};
use cellcomm::{CommandSet, Timing, UsbId};
use log::warn;
use serde::Serialize;

#[derive(Serialize)]
struct EffectiveDiscovery<'a> {
    family_a_id: &'a str,
    family_b_devices: Vec<UsbId>,
}

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    timing: Timing,
    commands: CommandSet,
    discovery: EffectiveDiscovery<'a>,
}

/// Print the configuration after defaults, files and overrides are applied.
pub(crate) fn cmd_show_config(config: &Config, json: bool) -> Result<()> {
    let timing = config.timing();
    if let Err(e) = timing.validate() {
        warn!("{e}");
    }

    let effective = EffectiveConfig {
        timing,
        commands: config.commands(),
        discovery: EffectiveDiscovery {
            family_a_id: config.family_a_id(),
            family_b_devices: config.family_b_devices(),
        },
    };

    let rendered = if json {
        serde_json::to_string_pretty(&effective)?
    } else {
        toml::to_string_pretty(&effective).context("Failed to render configuration")?
    };
    println!("{rendered}");
    Ok(())
}
