//! Domain primitive types used across the classres workspace.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DOMAIN_BLOCKIO, DOMAIN_NET, DOMAIN_RDT};
use crate::error::ClassResError;

/// A class-based resource dimension.
///
/// The built-in domains have dedicated handling; every other name is a
/// generic domain whose class set comes from the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceDomain {
    /// Cache and memory-bandwidth allocation (Intel RDT).
    Rdt,
    /// Block I/O cgroup classes.
    BlockIo,
    /// Network bandwidth classes from the CNI plugin configuration.
    Net,
    /// Any other registered domain, keyed by name.
    Other(String),
}

impl ResourceDomain {
    /// Maps a domain name onto its variant.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            DOMAIN_RDT => Self::Rdt,
            DOMAIN_BLOCKIO => Self::BlockIo,
            DOMAIN_NET => Self::Net,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the wire name of the domain.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rdt => DOMAIN_RDT,
            Self::BlockIo => DOMAIN_BLOCKIO,
            Self::Net => DOMAIN_NET,
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ResourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceDomain {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceDomain {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Level of the workload a domain applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Pod sandbox level.
    Pod,
    /// Individual container level.
    Container,
}

impl Scope {
    /// Returns the lowercase name of the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty name of a class within a domain.
///
/// An absent class is expressed as `Option::None`; the empty string is
/// never a valid `ClassName`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassName(String);

impl ClassName {
    /// Creates a class name, returning `None` for the empty string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() { None } else { Some(Self(name)) }
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClassName {
    type Error = ClassResError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| ClassResError::Config {
            message: "class name must not be empty".into(),
        })
    }
}

impl From<ClassName> for String {
    fn from(name: ClassName) -> Self {
        name.0
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A structured `(domain, class)` request attached to a pod or container.
///
/// Both fields are kept as raw strings so that empty class names and
/// unknown domains can be reported precisely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAssignment {
    /// Requested resource domain.
    pub domain: String,
    /// Requested class within the domain.
    pub class: String,
}

impl ClassAssignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(domain: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            class: class.into(),
        }
    }
}

/// Annotation map of a pod or container.
pub type Annotations = BTreeMap<String, String>;

/// Structured class assignments in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassAssignments(Vec<ClassAssignment>);

impl ClassAssignments {
    /// Creates an empty assignment list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an assignment, keeping request order.
    #[must_use]
    pub fn with(mut self, domain: impl Into<String>, class: impl Into<String>) -> Self {
        self.0.push(ClassAssignment::new(domain, class));
        self
    }

    /// Returns the class requested for `domain`, if any.
    ///
    /// With duplicate assignments the first one wins; duplicates are
    /// rejected by validation before any lookup happens.
    #[must_use]
    pub fn get(&self, domain: &ResourceDomain) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.domain == domain.as_str())
            .map(|a| a.class.as_str())
    }

    /// Iterates over the assignments in request order.
    pub fn iter(&self) -> std::slice::Iter<'_, ClassAssignment> {
        self.0.iter()
    }

    /// Returns `true` if there are no assignments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ClassAssignment> for ClassAssignments {
    fn from_iter<I: IntoIterator<Item = ClassAssignment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ClassAssignments {
    type Item = &'a ClassAssignment;
    type IntoIter = std::slice::Iter<'a, ClassAssignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Pod sandbox creation request as seen by class resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxRequest {
    /// Pod name.
    pub name: String,
    /// Structured pod-level class assignments.
    pub assignments: ClassAssignments,
    /// Pod annotations.
    pub annotations: Annotations,
}

/// Container creation request as seen by class resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerRequest {
    /// Container name within its pod.
    pub name: String,
    /// Structured container-level class assignments.
    pub assignments: ClassAssignments,
    /// Container annotations.
    pub annotations: Annotations,
}

/// A class as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Class name.
    pub name: String,
    /// Maximum number of simultaneous users, zero when unbounded.
    #[serde(default)]
    pub capacity: u64,
}

/// A domain and its available classes as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    /// Domain name.
    pub name: String,
    /// Whether the class of a running workload may be changed.
    pub mutable: bool,
    /// Available classes.
    pub classes: Vec<ClassInfo>,
}
