//! Launch-spec fragments produced from resolved classes.
//!
//! The OCI shapes follow the runtime-spec JSON names so that a fragment can
//! be merged verbatim into a container's `config.json`. The bandwidth shape
//! follows the CNI `bandwidth` capability arguments.

use serde::{Deserialize, Serialize};

/// Intel RDT settings of a container (`linux.intelRdt`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxIntelRdt {
    /// Name of the resctrl class (CLOS) the container is placed in.
    #[serde(rename = "closID")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clos_id: Option<String>,
    /// L3 cache allocation schema; unset to use the class as configured.
    #[serde(rename = "l3CacheSchema")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l3_cache_schema: Option<String>,
    /// Memory bandwidth schema; unset to use the class as configured.
    #[serde(rename = "memBwSchema")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_bw_schema: Option<String>,
}

/// `major:minor weight` pair for `weightDevice`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxWeightDevice {
    /// Device major number.
    pub major: i64,
    /// Device minor number.
    pub minor: i64,
    /// Bandwidth weight for the device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    /// Weight while competing with the cgroup's child cgroups.
    #[serde(rename = "leafWeight")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_weight: Option<u16>,
}

/// `major:minor rate` pair for the throttling lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxThrottleDevice {
    /// Device major number.
    pub major: i64,
    /// Device minor number.
    pub minor: i64,
    /// Rate limit per cgroup per device.
    pub rate: u64,
}

/// Block I/O settings of a container (`linux.resources.blockIO`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinuxBlockIo {
    /// Per cgroup weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
    /// Weight while competing with the cgroup's child cgroups.
    #[serde(rename = "leafWeight")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf_weight: Option<u16>,
    /// Weight per device, overriding `weight`.
    #[serde(rename = "weightDevice")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weight_device: Vec<LinuxWeightDevice>,
    /// Read rate limit per device, bytes per second.
    #[serde(rename = "throttleReadBpsDevice")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub throttle_read_bps_device: Vec<LinuxThrottleDevice>,
    /// Write rate limit per device, bytes per second.
    #[serde(rename = "throttleWriteBpsDevice")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub throttle_write_bps_device: Vec<LinuxThrottleDevice>,
    /// Read rate limit per device, IO per second.
    #[serde(rename = "throttleReadIOPSDevice")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub throttle_read_iops_device: Vec<LinuxThrottleDevice>,
    /// Write rate limit per device, IO per second.
    #[serde(rename = "throttleWriteIOPSDevice")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub throttle_write_iops_device: Vec<LinuxThrottleDevice>,
}

/// Traffic shaping parameters of the CNI `bandwidth` capability.
///
/// Rates are in bits per second, bursts in bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bandwidth {
    /// Ingress rate.
    #[serde(alias = "IngressRate")]
    pub ingress_rate: u64,
    /// Ingress burst.
    #[serde(alias = "IngressBurst")]
    pub ingress_burst: u64,
    /// Egress rate.
    #[serde(alias = "EgressRate")]
    pub egress_rate: u64,
    /// Egress burst.
    #[serde(alias = "EgressBurst")]
    pub egress_burst: u64,
}

/// A fragment to merge into a container's OCI runtime spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SpecFragment {
    /// Sets `linux.intelRdt`.
    IntelRdt(LinuxIntelRdt),
    /// Sets `linux.resources.blockIO`.
    BlockIo(LinuxBlockIo),
}

/// An option applied when setting up a sandbox's network namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum NamespaceOpt {
    /// Passes the `bandwidth` capability to the network plugins.
    Bandwidth(Bandwidth),
}

/// Everything class resolution contributes to a pod sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxAttachments {
    /// Fragments for the sandbox's OCI runtime spec.
    pub spec: Vec<SpecFragment>,
    /// Options for network namespace setup.
    pub namespace: Vec<NamespaceOpt>,
}
