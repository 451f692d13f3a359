//! Discovery of the available class resources.
//!
//! Reports read the registry at call time; domains without classes are
//! left out.

use classres_common::types::{DomainInfo, Scope};

use crate::registry::ClassRegistry;

/// Returns the pod-level domains and their classes.
#[must_use]
pub fn pod_level_domains(registry: &ClassRegistry) -> Vec<DomainInfo> {
    level_domains(registry, Scope::Pod)
}

/// Returns the container-level domains and their classes.
#[must_use]
pub fn container_level_domains(registry: &ClassRegistry) -> Vec<DomainInfo> {
    level_domains(registry, Scope::Container)
}

fn level_domains(registry: &ClassRegistry, scope: Scope) -> Vec<DomainInfo> {
    registry
        .entries(scope)
        .into_iter()
        .filter(|(_, classes)| !classes.classes.is_empty())
        .map(|(domain, classes)| DomainInfo {
            name: domain.to_string(),
            mutable: classes.mutable,
            classes: classes.class_infos(),
        })
        .collect()
}
