//! Class resource resolution for QoS-class aware container runtimes.
//!
//! Workloads name a class per resource domain, either through structured
//! assignments or legacy annotations. This crate validates those choices
//! against the classes currently known to the [`registry`], turns them into
//! OCI spec fragments and CNI namespace options, and reports the available
//! classes for discovery.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod annotations;
pub mod cni;
pub mod discovery;
pub mod domain;
pub mod registry;
pub mod resolver;
pub mod runtime_config;
pub mod service;

pub use registry::{ClassEntry, ClassRegistry};
pub use service::ClassResourceService;
