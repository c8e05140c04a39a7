//! Board discovery command.

use crate::config::Config;
use anyhow::Result;
use cellcomm::{NativePortSearch, discover_ports, format_port_list};
use console::style;
use log::debug;

/// List attached boards of both families.
///
/// JSON goes to stdout; human-readable output puts the header on stderr and
/// one line per board on stdout. Finding nothing is not an error.
pub(crate) fn cmd_ports(config: &Config, json: bool, quiet: bool) -> Result<()> {
    let family_a_id = config.family_a_id();
    let devices = config.family_b_devices();
    debug!(
        "Searching for family A \"{family_a_id}\" and {} family B USB IDs",
        devices.len()
    );

    let mut search = NativePortSearch::new(devices);
    let discovery = discover_ports(&mut search, family_a_id);

    if json {
        println!("{}", serde_json::to_string_pretty(&discovery.ports)?);
        return Ok(());
    }

    if !discovery.is_detected() {
        if !quiet {
            eprintln!("{} No boards detected", style("!").yellow());
        }
        return Ok(());
    }

    if !quiet {
        eprintln!(
            "{} Found {} board(s):",
            style("✓").green(),
            discovery.ports.len()
        );
    }
    for line in format_port_list(&discovery.ports) {
        println!("  {line}");
    }

    Ok(())
}
