//! CLI command definitions and dispatch.

pub mod cni_import;
pub mod domains;
pub mod resolve;
pub mod runtime_config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use classres_common::config::ClassResConfig;
use classres_common::constants::{BIN_NAME, CONFIG_ENV, DEFAULT_CONFIG_FILE};
use classres_core::ClassResourceService;

/// Class resource resolution for container runtimes.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file.
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available class resources per level.
    Domains(domains::DomainsArgs),
    /// Resolve the classes of a sandbox or container creation request.
    Resolve(resolve::ResolveArgs),
    /// Parse network class definitions from a CNI configuration.
    CniImport(cni_import::CniImportArgs),
    /// Show the runtime configuration derived from the runtime handlers.
    RuntimeConfig(runtime_config::RuntimeConfigArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Command::Domains(args) => domains::execute(&args, config),
        Command::Resolve(args) => resolve::execute(&args, config),
        Command::CniImport(args) => cni_import::execute(&args),
        Command::RuntimeConfig(args) => runtime_config::execute(&args, config),
    }
}

/// Loads the configuration from `path`, or from the default location if it
/// exists, or falls back to the built-in defaults.
///
/// # Errors
///
/// Returns an error if an existing configuration file cannot be loaded.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ClassResConfig> {
    let path = match path {
        Some(path) => path,
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::debug!("no configuration file, using defaults");
                return Ok(ClassResConfig::default());
            }
            default
        }
    };
    ClassResConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

/// Builds the service from the configuration at `path`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the service
/// cannot be initialized from it.
pub fn build_service(path: Option<&Path>) -> anyhow::Result<ClassResourceService> {
    let config = load_config(path)?;
    ClassResourceService::from_config(&config).context("failed to initialize class resources")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "classctl",
            "domains",
            "--pod",
            "--config",
            "/tmp/classres.json",
            "--log-json",
        ])
        .expect("should parse");
        assert!(cli.log_json);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/classres.json")));
        assert!(matches!(cli.command, Command::Domains(ref a) if a.pod && !a.container));
    }

    #[test]
    fn load_config_reads_given_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "rdt": {{ "enabled": true, "classes": ["gold"] }} }}"#).expect("write");
        let config = load_config(Some(file.path())).expect("should load");
        assert!(config.rdt.enabled);
        assert_eq!(config.rdt.classes, vec!["gold"]);
    }

    #[test]
    fn load_config_reports_path_on_error() {
        let err = load_config(Some(Path::new("/nonexistent/classres.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/classres.json"));
    }
}
