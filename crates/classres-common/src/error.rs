//! Unified error types for the classres workspace.
//!
//! Every request-level failure of class resolution maps to exactly one
//! variant so that callers can apply policy (for example downgrading
//! [`ClassResError::DomainDisabled`]) without inspecting messages.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ClassResError {
    /// A request references a resource domain this process does not know.
    #[error("unknown {scope}-level class resource type {domain:?}")]
    UnknownDomain {
        /// Level (`pod` or `container`) the assignment was made at.
        scope: &'static str,
        /// Domain name as given in the request.
        domain: String,
    },

    /// A class is not present in the domain's current registry.
    #[error("unknown {domain} class {class:?}: not specified in configuration")]
    UnknownClass {
        /// Domain the class was looked up in.
        domain: String,
        /// Requested class name.
        class: String,
    },

    /// A structured assignment carried an empty class name.
    #[error("empty class name not allowed for class resource type {domain:?}")]
    EmptyClassName {
        /// Domain of the offending assignment.
        domain: String,
    },

    /// The same domain was assigned twice in one request.
    #[error("duplicate assignment for class resource type {domain:?}")]
    DuplicateDomain {
        /// Domain assigned more than once.
        domain: String,
    },

    /// The domain's enforcement mechanism is not available.
    #[error("{domain} disabled, refusing to set {domain} class of container {container:?} to {class:?}")]
    DomainDisabled {
        /// Disabled domain.
        domain: String,
        /// Container the class was requested for.
        container: String,
        /// Requested class name.
        class: String,
    },

    /// A class name taken from a legacy annotation is not usable.
    #[error("invalid {domain} class name {class:?}: {reason}")]
    InvalidClassName {
        /// Domain the annotation belongs to.
        domain: String,
        /// Offending class name.
        class: String,
        /// Why the name was rejected.
        reason: &'static str,
    },

    /// The network plugin configuration could not be parsed.
    #[error("failed to parse CNI config for class resources: {message}")]
    ConfigParse {
        /// Description of the parse failure.
        message: String,
    },

    /// A resolved class could not be turned into a launch-spec attachment.
    #[error("failed to translate {domain} class {class:?}: {message}")]
    Translation {
        /// Domain of the resolved class.
        domain: String,
        /// Resolved class name.
        class: String,
        /// Description of the failure.
        message: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl ClassResError {
    /// Returns `true` for errors caused by a disabled resource domain.
    #[must_use]
    pub const fn is_domain_disabled(&self) -> bool {
        matches!(self, Self::DomainDisabled { .. })
    }
}

impl From<serde_json::Error> for ClassResError {
    fn from(source: serde_json::Error) -> Self {
        Self::ConfigParse {
            message: source.to_string(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ClassResError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_class_names_domain_and_class() {
        let err = ClassResError::UnknownClass {
            domain: "rdt".into(),
            class: "nonexistent".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("rdt"), "got: {msg}");
        assert!(msg.contains("\"nonexistent\""), "got: {msg}");
    }

    #[test]
    fn only_disabled_domain_is_downgradable() {
        let disabled = ClassResError::DomainDisabled {
            domain: "blockio".into(),
            container: "app".into(),
            class: "slow".into(),
        };
        let empty = ClassResError::EmptyClassName {
            domain: "blockio".into(),
        };
        assert!(disabled.is_domain_disabled());
        assert!(!empty.is_domain_disabled());
    }

    #[test]
    fn json_errors_become_config_parse() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClassResError::from(source);
        assert!(matches!(err, ClassResError::ConfigParse { .. }));
    }
}
