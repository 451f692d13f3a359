//! `classctl runtime-config`: show the runtime configuration.

use std::path::Path;

use clap::Args;

/// Arguments for the `runtime-config` command.
#[derive(Args, Debug)]
pub struct RuntimeConfigArgs {
    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `runtime-config` command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn execute(args: &RuntimeConfigArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let service = super::build_service(config)?;
    let runtime = service.runtime_config();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&runtime)?);
    } else {
        println!("cgroup driver: {}", runtime.cgroup_driver);
    }
    Ok(())
}
