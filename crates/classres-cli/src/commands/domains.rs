//! `classctl domains`: list the available class resources.

use std::path::Path;

use clap::Args;

use crate::output;

/// Arguments for the `domains` command.
#[derive(Args, Debug)]
pub struct DomainsArgs {
    /// Only list pod-level domains.
    #[arg(long, conflicts_with = "container")]
    pub pod: bool,

    /// Only list container-level domains.
    #[arg(long)]
    pub container: bool,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `domains` command.
///
/// # Errors
///
/// Returns an error if the service cannot be built or output fails.
pub fn execute(args: &DomainsArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let service = super::build_service(config)?;
    let show_pod = !args.container;
    let show_container = !args.pod;

    let pod = if show_pod {
        service.pod_level_domains()
    } else {
        Vec::new()
    };
    let container = if show_container {
        service.container_level_domains()
    } else {
        Vec::new()
    };

    if args.json {
        let report = serde_json::json!({
            "pod": pod,
            "container": container,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if pod.is_empty() && container.is_empty() {
        println!("No class resources available.");
        return Ok(());
    }

    let mut rows = output::domain_table("pod", &pod);
    rows.extend(output::domain_table("container", &container).into_iter().skip(1));
    for row in rows {
        println!("{row}");
    }
    Ok(())
}
