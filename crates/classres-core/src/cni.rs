//! Network classes from the CNI plugin configuration.
//!
//! The network configuration carries an optional top-level `qos` object
//! mapping class names to a capacity and bandwidth parameters:
//!
//! ```json
//! {
//!   "cniVersion": "1.0.0",
//!   "name": "pods",
//!   "plugins": [ { "type": "bridge" }, { "type": "bandwidth", "capabilities": { "bandwidth": true } } ],
//!   "qos": {
//!     "gold":   { "capacity": 4, "bandwidth": { "ingressRate": 1000000000, "ingressBurst": 100000000,
//!                                               "egressRate": 1000000000, "egressBurst": 100000000 } },
//!     "bronze": { "capacity": 100 }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use classres_common::error::{ClassResError, Result};
use classres_common::oci::Bandwidth;
use classres_common::types::ClassName;
use serde::Deserialize;

use crate::registry::ClassEntry;

#[derive(Debug, Deserialize)]
struct NetworkClassConfig {
    #[serde(default, alias = "Capacity")]
    capacity: u64,
    #[serde(default, alias = "BandWidth", alias = "bandWidth")]
    bandwidth: Option<Bandwidth>,
}

#[derive(Debug, Deserialize)]
struct PluginConfig {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    qos: Option<BTreeMap<String, NetworkClassConfig>>,
}

/// Parses the class definitions of a network configuration.
///
/// A configuration without `qos` (or with `"qos": null`) defines no classes.
///
/// # Errors
///
/// Returns [`ClassResError::ConfigParse`] if the blob is not a JSON object,
/// if `qos` is malformed, or if a class name is empty.
pub fn import_from_plugin_config(raw: &str) -> Result<BTreeMap<ClassName, ClassEntry>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(ClassResError::ConfigParse {
            message: "network configuration is not a JSON object".into(),
        });
    }
    let config: PluginConfig = serde_json::from_value(value)?;
    tracing::debug!(network = ?config.name, "parsing CNI class configuration");

    config
        .qos
        .unwrap_or_default()
        .into_iter()
        .map(|(name, class)| {
            let name = ClassName::new(name).ok_or_else(|| ClassResError::ConfigParse {
                message: "empty class name in qos".into(),
            })?;
            Ok((
                name,
                ClassEntry {
                    capacity: class.capacity,
                    bandwidth: class.bandwidth,
                },
            ))
        })
        .collect()
}

/// Picks the network configuration carrying class definitions from the
/// networks loaded by the plugin, in load order.
///
/// The first network is the loopback network; classes are defined by the
/// second one.
///
/// # Errors
///
/// Returns [`ClassResError::ConfigParse`] if fewer than two networks are loaded.
pub fn select_network_config(networks: &[String]) -> Result<&str> {
    networks
        .get(1)
        .map(String::as_str)
        .ok_or_else(|| ClassResError::ConfigParse {
            message: "no networks configured".into(),
        })
}
