//! `classctl cni-import`: show the classes a network configuration defines.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use classres_common::types::ClassName;
use classres_core::ClassEntry;
use classres_core::cni;

use crate::output;

/// Arguments for the `cni-import` command.
#[derive(Args, Debug)]
pub struct CniImportArgs {
    /// Network configuration files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Treat the files as the loaded networks in load order and import the
    /// class-carrying one.
    #[arg(long)]
    pub list: bool,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `cni-import` command.
///
/// # Errors
///
/// Returns an error if a file cannot be read or its classes cannot be parsed.
pub fn execute(args: &CniImportArgs) -> anyhow::Result<()> {
    let networks = args
        .files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let classes = import(&networks, args.list)?;

    if args.json {
        let report: BTreeMap<_, _> = classes
            .iter()
            .map(|(name, entry)| {
                (
                    name.as_str(),
                    serde_json::json!({
                        "capacity": entry.capacity,
                        "bandwidth": entry.bandwidth,
                    }),
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if classes.is_empty() {
        println!("No network classes defined.");
        return Ok(());
    }

    println!(
        "{:<16} {:<10} {:<14} {:<14}",
        "CLASS", "CAPACITY", "INGRESS RATE", "EGRESS RATE"
    );
    for (name, entry) in &classes {
        let (ingress, egress) = entry.bandwidth.map_or_else(
            || ("-".to_string(), "-".to_string()),
            |bw| (bw.ingress_rate.to_string(), bw.egress_rate.to_string()),
        );
        println!(
            "{:<16} {:<10} {:<14} {:<14}",
            name.as_str(),
            output::format_capacity(entry.capacity),
            ingress,
            egress
        );
    }
    Ok(())
}

fn import(networks: &[String], list: bool) -> anyhow::Result<BTreeMap<ClassName, ClassEntry>> {
    let raw = if list {
        cni::select_network_config(networks)?
    } else {
        match networks {
            [raw] => raw.as_str(),
            _ => anyhow::bail!("expected a single network configuration, use --list for several"),
        }
    };
    Ok(cni::import_from_plugin_config(raw)?)
}
