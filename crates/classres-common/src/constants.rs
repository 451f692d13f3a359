//! Domain names, annotation keys, and default paths.

/// Name of the cache and memory-bandwidth allocation (Intel RDT) domain.
pub const DOMAIN_RDT: &str = "rdt";

/// Name of the block I/O cgroup class domain.
pub const DOMAIN_BLOCKIO: &str = "blockio";

/// Name of the network bandwidth class domain sourced from the CNI config.
pub const DOMAIN_NET: &str = "net";

/// Prefix of the per-container legacy annotation (`io.kubernetes.cri.<domain>-class`).
pub const CONTAINER_ANNOTATION_PREFIX: &str = "io.kubernetes.cri.";

/// Suffix appended to the domain name in the per-container legacy annotation.
pub const CONTAINER_ANNOTATION_SUFFIX: &str = "-class";

/// Suffix of the legacy pod annotation domain (`<domain>.resources.beta.kubernetes.io`).
pub const POD_ANNOTATION_DOMAIN: &str = ".resources.beta.kubernetes.io";

/// Key part of the pod-wide legacy annotation applying to every container.
pub const POD_ANNOTATION_POD_KEY: &str = "/pod";

/// Key prefix of the pod legacy annotation targeting a single container.
pub const POD_ANNOTATION_CONTAINER_KEY: &str = "/container.";

/// Runtime type prefix of runc-based runtime handlers.
pub const RUNC_RUNTIME_PREFIX: &str = "io.containerd.runc.";

/// Default location of the classres configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/classres/config.json";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "CLASSRES_CONFIG";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "classctl";
