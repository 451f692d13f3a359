//! Cache and memory-bandwidth allocation (Intel RDT) classes.
//!
//! A resolved RDT class becomes `linux.intelRdt.closID`; the schemata are
//! left unset so the class applies as configured in resctrl.

use std::sync::Arc;

use classres_common::config::RdtConfig;
use classres_common::constants::DOMAIN_RDT;
use classres_common::error::{ClassResError, Result};
use classres_common::oci::{LinuxIntelRdt, SpecFragment};
use classres_common::types::{Annotations, ResourceDomain, Scope};

use super::{Attachment, ClassDomain};
use crate::annotations::{AnnotationConvention, LegacyClassSource};
use crate::registry::ClassRegistry;
use crate::resolver::{self, ClassRequest, LegacyFallback, ResolvedClass};

/// The resctrl side of RDT support.
pub trait RdtController: Send + Sync {
    /// Whether RDT support initialized and is configured.
    fn enabled(&self) -> bool;

    /// Names of the configured classes.
    fn classes(&self) -> Vec<String>;
}

/// RDT support described entirely by configuration.
#[derive(Debug, Clone)]
pub struct StaticRdt {
    enabled: bool,
    classes: Vec<String>,
}

impl StaticRdt {
    /// Creates the controller from configuration.
    ///
    /// RDT counts as enabled only if it is switched on and has classes.
    #[must_use]
    pub fn from_config(config: &RdtConfig) -> Self {
        let enabled = if !config.enabled {
            tracing::info!("RDT is not enabled");
            false
        } else if config.classes.is_empty() {
            tracing::info!("no RDT classes specified, RDT not configured");
            false
        } else {
            true
        };
        Self {
            enabled,
            classes: config.classes.clone(),
        }
    }
}

impl RdtController for StaticRdt {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn classes(&self) -> Vec<String> {
        if self.enabled {
            self.classes.clone()
        } else {
            Vec::new()
        }
    }
}

/// Legacy RDT annotations.
///
/// Class names end up as resctrl directory names, so names taken from
/// annotations must be usable as a single path component.
#[derive(Debug, Clone)]
pub struct RdtAnnotations(AnnotationConvention);

impl Default for RdtAnnotations {
    fn default() -> Self {
        Self(AnnotationConvention::for_domain(DOMAIN_RDT))
    }
}

impl LegacyClassSource for RdtAnnotations {
    fn container_class(
        &self,
        container: &str,
        container_annotations: &Annotations,
        pod_annotations: &Annotations,
    ) -> Result<Option<String>> {
        let class = self
            .0
            .container_class(container, container_annotations, pod_annotations)?;
        if let Some(ref name) = class {
            check_qualified_name(name)?;
        }
        Ok(class)
    }
}

fn check_qualified_name(name: &str) -> Result<()> {
    let reason = if name == "." || name == ".." {
        "reserved directory name"
    } else if name.contains('/') {
        "contains '/'"
    } else if name.chars().any(char::is_control) {
        "contains control characters"
    } else {
        return Ok(());
    };
    Err(ClassResError::InvalidClassName {
        domain: DOMAIN_RDT.into(),
        class: name.to_owned(),
        reason,
    })
}

/// Handler of the `rdt` domain.
pub struct RdtDomain {
    registry: Arc<ClassRegistry>,
    controller: Arc<dyn RdtController>,
    annotations: RdtAnnotations,
}

impl RdtDomain {
    /// Creates the handler.
    #[must_use]
    pub fn new(registry: Arc<ClassRegistry>, controller: Arc<dyn RdtController>) -> Self {
        Self {
            registry,
            controller,
            annotations: RdtAnnotations::default(),
        }
    }

    /// Whether the underlying mechanism is available.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.controller.enabled()
    }
}

impl ClassDomain for RdtDomain {
    fn domain(&self) -> ResourceDomain {
        ResourceDomain::Rdt
    }

    fn resolve(&self, request: &ClassRequest<'_>) -> Result<Option<ResolvedClass>> {
        resolver::resolve_container_class(
            &self.registry,
            Scope::Container,
            &ResourceDomain::Rdt,
            LegacyFallback {
                source: &self.annotations,
                enabled: self.controller.enabled(),
            },
            request,
        )
    }

    fn translate(&self, resolved: &ResolvedClass) -> Result<Vec<Attachment>> {
        tracing::info!(class = %resolved.class, "setting RDT class");
        Ok(vec![Attachment::Spec(SpecFragment::IntelRdt(LinuxIntelRdt {
            clos_id: Some(resolved.class.to_string()),
            ..LinuxIntelRdt::default()
        }))])
    }
}

#[cfg(test)]
mod tests {
    use classres_common::types::ClassAssignments;

    use super::*;
    use crate::registry::ClassEntry;

    fn enabled_rdt(classes: &[&str]) -> (Arc<ClassRegistry>, RdtDomain) {
        let controller = StaticRdt::from_config(&RdtConfig {
            enabled: true,
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
        });
        let registry = Arc::new(ClassRegistry::new());
        registry.register_domain(
            Scope::Container,
            ResourceDomain::Rdt,
            false,
            controller
                .classes()
                .into_iter()
                .filter_map(classres_common::types::ClassName::new)
                .map(|n| (n, ClassEntry::default())),
        );
        let domain = RdtDomain::new(Arc::clone(&registry), Arc::new(controller));
        (registry, domain)
    }

    #[test]
    fn enabled_without_classes_counts_as_disabled() {
        let controller = StaticRdt::from_config(&RdtConfig {
            enabled: true,
            classes: Vec::new(),
        });
        assert!(!controller.enabled());
        let disabled = StaticRdt::from_config(&RdtConfig {
            enabled: false,
            classes: vec!["gold".into()],
        });
        assert!(!disabled.enabled());
        assert!(disabled.classes().is_empty());
    }

    #[test]
    fn resolves_and_translates_to_clos_id() {
        let (_registry, domain) = enabled_rdt(&["gold", "silver"]);
        let assignments = ClassAssignments::new().with("rdt", "silver");
        let empty = Annotations::new();
        let request = ClassRequest {
            container: "app",
            assignments: &assignments,
            container_annotations: &empty,
            pod_annotations: &empty,
        };

        let resolved = domain.resolve(&request).expect("resolve").expect("requested");
        let attachments = domain.translate(&resolved).expect("translate");
        assert_eq!(
            attachments,
            vec![Attachment::Spec(SpecFragment::IntelRdt(LinuxIntelRdt {
                clos_id: Some("silver".into()),
                l3_cache_schema: None,
                mem_bw_schema: None,
            }))]
        );
    }

    #[test]
    fn unqualified_annotation_class_is_rejected() {
        let (_registry, domain) = enabled_rdt(&["gold"]);
        let assignments = ClassAssignments::new();
        let ctr: Annotations = [("io.kubernetes.cri.rdt-class".to_owned(), "../gold".to_owned())]
            .into_iter()
            .collect();
        let pod = Annotations::new();
        let request = ClassRequest {
            container: "app",
            assignments: &assignments,
            container_annotations: &ctr,
            pod_annotations: &pod,
        };

        let err = domain.resolve(&request).unwrap_err();
        assert!(matches!(err, ClassResError::InvalidClassName { .. }), "got: {err}");
    }

    #[test]
    fn qualified_names() {
        assert!(check_qualified_name("gold").is_ok());
        assert!(check_qualified_name("system/default").is_err());
        assert!(check_qualified_name("..").is_err());
        assert!(check_qualified_name("a\nb").is_err());
    }
}
