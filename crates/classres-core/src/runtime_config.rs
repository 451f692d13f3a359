//! Runtime configuration reporting.
//!
//! The cgroup driver is taken from the runtime handlers: the default
//! handler is consulted first, the others in alphabetical order, and the
//! first runc-based handler decides. Without one, systemd is reported.

use std::collections::BTreeMap;
use std::fmt;

use classres_common::config::RuntimeHandlerConfig;
use classres_common::constants::RUNC_RUNTIME_PREFIX;
use serde::{Deserialize, Serialize};

/// Cgroup manager used by the container runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CgroupDriver {
    /// systemd manages cgroups.
    Systemd,
    /// The runtime writes the cgroup filesystem directly.
    Cgroupfs,
}

impl fmt::Display for CgroupDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Systemd => write!(f, "systemd"),
            Self::Cgroupfs => write!(f, "cgroupfs"),
        }
    }
}

/// Runtime configuration reported to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Cgroup driver of the runtime.
    pub cgroup_driver: CgroupDriver,
}

#[derive(Debug, Default, Deserialize)]
struct RuncOptions {
    #[serde(default, alias = "SystemdCgroup")]
    systemd_cgroup: bool,
}

/// Determines the cgroup driver from the configured runtime handlers.
#[must_use]
pub fn cgroup_driver(
    runtimes: &BTreeMap<String, RuntimeHandlerConfig>,
    default_runtime: &str,
) -> CgroupDriver {
    let default = runtimes.get_key_value(default_runtime);
    let others = runtimes
        .iter()
        .filter(|(name, _)| name.as_str() != default_runtime);

    for (name, handler) in default.into_iter().chain(others) {
        match handler_cgroup_driver(handler) {
            Ok(Some(driver)) => return driver,
            Ok(None) => {
                tracing::debug!(
                    handler = %name,
                    "runtime handler does not provide cgroup driver information"
                );
            }
            Err(e) => {
                tracing::debug!(handler = %name, error = %e, "failed to parse runtime handler options");
            }
        }
    }

    tracing::debug!("no runtime handler provided cgroup driver information, returning systemd");
    CgroupDriver::Systemd
}

fn handler_cgroup_driver(
    handler: &RuntimeHandlerConfig,
) -> Result<Option<CgroupDriver>, serde_json::Error> {
    if !handler.runtime_type.starts_with(RUNC_RUNTIME_PREFIX) {
        return Ok(None);
    }
    let Some(options) = &handler.options else {
        return Ok(None);
    };
    let options = RuncOptions::deserialize(options)?;
    Ok(Some(if options.systemd_cgroup {
        CgroupDriver::Systemd
    } else {
        CgroupDriver::Cgroupfs
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn runc(systemd: bool) -> RuntimeHandlerConfig {
        RuntimeHandlerConfig {
            runtime_type: "io.containerd.runc.v2".into(),
            options: Some(json!({ "SystemdCgroup": systemd })),
        }
    }

    fn other() -> RuntimeHandlerConfig {
        RuntimeHandlerConfig {
            runtime_type: "io.containerd.kata.v2".into(),
            options: Some(json!({ "ConfigPath": "/etc/kata/configuration.toml" })),
        }
    }

    #[test]
    fn default_handler_decides_first() {
        let mut runtimes = BTreeMap::new();
        let _ = runtimes.insert("a-runc".to_owned(), runc(false));
        let _ = runtimes.insert("runc".to_owned(), runc(true));
        assert_eq!(cgroup_driver(&runtimes, "runc"), CgroupDriver::Systemd);
        assert_eq!(cgroup_driver(&runtimes, "a-runc"), CgroupDriver::Cgroupfs);
    }

    #[test]
    fn non_runc_handlers_are_skipped() {
        let mut runtimes = BTreeMap::new();
        let _ = runtimes.insert("kata".to_owned(), other());
        let _ = runtimes.insert("runc".to_owned(), runc(false));
        assert_eq!(cgroup_driver(&runtimes, "kata"), CgroupDriver::Cgroupfs);
    }

    #[test]
    fn unparsable_or_missing_options_fall_through() {
        let mut runtimes = BTreeMap::new();
        let _ = runtimes.insert(
            "broken".to_owned(),
            RuntimeHandlerConfig {
                runtime_type: "io.containerd.runc.v2".into(),
                options: Some(json!({ "SystemdCgroup": "yes" })),
            },
        );
        let _ = runtimes.insert(
            "bare".to_owned(),
            RuntimeHandlerConfig {
                runtime_type: "io.containerd.runc.v2".into(),
                options: None,
            },
        );
        assert_eq!(cgroup_driver(&runtimes, "broken"), CgroupDriver::Systemd);
    }

    #[test]
    fn no_handlers_defaults_to_systemd() {
        assert_eq!(cgroup_driver(&BTreeMap::new(), ""), CgroupDriver::Systemd);
    }
}
