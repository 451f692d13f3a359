//! Network bandwidth classes defined by the CNI plugin configuration.
//!
//! The class set of this domain is replaced whenever the network plugin
//! configuration is reloaded, so translation looks the class up again and
//! refuses to apply a class that vanished after resolution.

use std::sync::Arc;

use classres_common::error::{ClassResError, Result};
use classres_common::oci::NamespaceOpt;
use classres_common::types::{ResourceDomain, Scope};

use super::{Attachment, ClassDomain};
use crate::registry::ClassRegistry;
use crate::resolver::{self, ClassRequest, ResolvedClass};

/// Handler of the pod-level `net` domain.
pub struct NetDomain {
    registry: Arc<ClassRegistry>,
}

impl NetDomain {
    /// Creates the handler.
    #[must_use]
    pub const fn new(registry: Arc<ClassRegistry>) -> Self {
        Self { registry }
    }
}

impl ClassDomain for NetDomain {
    fn domain(&self) -> ResourceDomain {
        ResourceDomain::Net
    }

    fn resolve(&self, request: &ClassRequest<'_>) -> Result<Option<ResolvedClass>> {
        resolver::resolve_assigned_class(
            &self.registry,
            Scope::Pod,
            &ResourceDomain::Net,
            request.assignments,
        )
    }

    fn translate(&self, resolved: &ResolvedClass) -> Result<Vec<Attachment>> {
        let Some(entry) = self
            .registry
            .lookup(Scope::Pod, &ResourceDomain::Net, resolved.class.as_str())
        else {
            return Err(ClassResError::Translation {
                domain: ResourceDomain::Net.to_string(),
                class: resolved.class.to_string(),
                message: "class removed from network configuration after resolution".into(),
            });
        };
        if entry != resolved.entry {
            tracing::debug!(
                class = %resolved.class,
                "network class changed after resolution, applying current parameters"
            );
        }
        tracing::info!(
            class = %resolved.class,
            capacity = entry.capacity,
            "setting network class"
        );
        Ok(entry
            .bandwidth
            .map(|bw| Attachment::Namespace(NamespaceOpt::Bandwidth(bw)))
            .into_iter()
            .collect())
    }
}
