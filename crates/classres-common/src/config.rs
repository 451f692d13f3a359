//! Configuration model for class resource resolution.
//!
//! The configuration names which static domains are enabled, which classes
//! they offer, the policy switches for disabled domains, additional generic
//! domains, and the runtime handlers used for runtime-config reporting.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DOMAIN_BLOCKIO, DOMAIN_NET, DOMAIN_RDT};
use crate::error::{ClassResError, Result};
use crate::oci::LinuxBlockIo;
use crate::types::ClassInfo;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassResConfig {
    /// Cache and memory-bandwidth allocation domain.
    pub rdt: RdtConfig,
    /// Block I/O domain.
    pub blockio: BlockIoConfig,
    /// Continue container creation when an RDT class is requested but RDT is disabled.
    pub ignore_rdt_not_enabled_errors: bool,
    /// Continue container creation when a block I/O class is requested but block I/O is disabled.
    pub ignore_blockio_not_enabled_errors: bool,
    /// Generic pod-level domains.
    pub pod_domains: Vec<DomainConfig>,
    /// Generic container-level domains.
    pub container_domains: Vec<DomainConfig>,
    /// Network plugin configuration imported at start-up.
    pub cni_config: Option<PathBuf>,
    /// Runtime handlers by name.
    pub runtimes: BTreeMap<String, RuntimeHandlerConfig>,
    /// Name of the default runtime handler.
    pub default_runtime_name: String,
}

/// Cache and memory-bandwidth allocation classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdtConfig {
    /// Whether resctrl support initialized successfully.
    pub enabled: bool,
    /// Configured class names.
    pub classes: Vec<String>,
}

/// Block I/O classes and the parameters each one applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockIoConfig {
    /// Whether block I/O class support initialized successfully.
    pub enabled: bool,
    /// Class name to block I/O parameters.
    pub classes: BTreeMap<String, LinuxBlockIo>,
}

/// A generic registered domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Domain name.
    pub name: String,
    /// Whether the class of a running workload may be changed.
    #[serde(default)]
    pub mutable: bool,
    /// Classes offered by the domain.
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
}

/// A runtime handler as far as runtime-config reporting is concerned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeHandlerConfig {
    /// Runtime type, e.g. `io.containerd.runc.v2`.
    pub runtime_type: String,
    /// Runtime specific options, interpreted per runtime type.
    pub options: Option<serde_json::Value>,
}

impl ClassResConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON,
    /// or fails [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClassResError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| ClassResError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks the configuration for semantic correctness.
    ///
    /// # Checks performed
    ///
    /// 1. No class name is empty.
    /// 2. Generic domains do not reuse a built-in domain name.
    /// 3. No generic domain is declared twice at the same level.
    ///
    /// # Errors
    ///
    /// Returns an error if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.rdt.classes.iter().any(String::is_empty)
            || self.blockio.classes.keys().any(String::is_empty)
        {
            return Err(ClassResError::Config {
                message: "empty class name in static domain configuration".into(),
            });
        }
        check_generic_domains("pod", &self.pod_domains)?;
        check_generic_domains("container", &self.container_domains)?;
        Ok(())
    }
}

fn check_generic_domains(level: &str, domains: &[DomainConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for domain in domains {
        if domain.name.is_empty() {
            return Err(ClassResError::Config {
                message: format!("empty {level}-level domain name"),
            });
        }
        if [DOMAIN_RDT, DOMAIN_BLOCKIO, DOMAIN_NET].contains(&domain.name.as_str()) {
            return Err(ClassResError::Config {
                message: format!(
                    "{level}-level domain \"{}\" clashes with a built-in domain",
                    domain.name
                ),
            });
        }
        if !seen.insert(domain.name.as_str()) {
            return Err(ClassResError::Config {
                message: format!("duplicate {level}-level domain \"{}\"", domain.name),
            });
        }
        if domain.classes.iter().any(|c| c.name.is_empty()) {
            return Err(ClassResError::Config {
                message: format!("empty class name in domain \"{}\"", domain.name),
            });
        }
    }
    Ok(())
}
