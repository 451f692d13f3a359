//! Registered domains without dedicated handling.
//!
//! A generic domain only validates the requested class against the
//! registry; applying it is up to whoever registered the domain.

use std::sync::Arc;

use classres_common::error::Result;
use classres_common::types::{ResourceDomain, Scope};

use super::{Attachment, ClassDomain};
use crate::registry::ClassRegistry;
use crate::resolver::{self, ClassRequest, ResolvedClass};

/// Handler of one registered generic domain at one level.
pub struct GenericDomain {
    registry: Arc<ClassRegistry>,
    scope: Scope,
    domain: ResourceDomain,
}

impl GenericDomain {
    /// Creates the handler.
    #[must_use]
    pub const fn new(registry: Arc<ClassRegistry>, scope: Scope, domain: ResourceDomain) -> Self {
        Self {
            registry,
            scope,
            domain,
        }
    }
}

impl ClassDomain for GenericDomain {
    fn domain(&self) -> ResourceDomain {
        self.domain.clone()
    }

    fn resolve(&self, request: &ClassRequest<'_>) -> Result<Option<ResolvedClass>> {
        resolver::resolve_assigned_class(&self.registry, self.scope, &self.domain, request.assignments)
    }

    fn translate(&self, resolved: &ResolvedClass) -> Result<Vec<Attachment>> {
        tracing::info!(
            scope = %self.scope,
            domain = %self.domain,
            class = %resolved.class,
            capacity = resolved.entry.capacity,
            "setting class resource"
        );
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use classres_common::error::ClassResError;
    use classres_common::types::{Annotations, ClassAssignments, ClassName};

    use super::*;
    use crate::registry::ClassEntry;

    #[test]
    fn registered_class_resolves_to_no_attachments() {
        let registry = Arc::new(ClassRegistry::new());
        let gpu = ResourceDomain::Other("gpu".into());
        registry.register_domain(
            Scope::Container,
            gpu.clone(),
            true,
            ["shared", "exclusive"]
                .into_iter()
                .filter_map(ClassName::new)
                .map(|n| (n, ClassEntry::default())),
        );
        let domain = GenericDomain::new(Arc::clone(&registry), Scope::Container, gpu);
        let empty = Annotations::new();

        let ok = ClassAssignments::new().with("gpu", "shared");
        let resolved = domain
            .resolve(&ClassRequest {
                container: "app",
                assignments: &ok,
                container_annotations: &empty,
                pod_annotations: &empty,
            })
            .expect("resolve")
            .expect("requested");
        assert!(domain.translate(&resolved).expect("translate").is_empty());

        let bad = ClassAssignments::new().with("gpu", "nonexistent");
        let err = domain
            .resolve(&ClassRequest {
                container: "app",
                assignments: &bad,
                container_annotations: &empty,
                pod_annotations: &empty,
            })
            .unwrap_err();
        assert!(matches!(err, ClassResError::UnknownClass { .. }));
    }
}
