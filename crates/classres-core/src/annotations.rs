//! Legacy annotation sources for class assignments.
//!
//! Domains that predate structured assignments accept their class through
//! pod and container annotations. For a domain `d` and a container `c` the
//! lookup order is:
//!
//! 1. container annotation `io.kubernetes.cri.d-class`
//! 2. pod annotation `d.resources.beta.kubernetes.io/container.c`
//! 3. pod annotation `d.resources.beta.kubernetes.io/pod`
//!
//! An annotation holding the empty string means "not requested".

use classres_common::constants::{
    CONTAINER_ANNOTATION_PREFIX, CONTAINER_ANNOTATION_SUFFIX, POD_ANNOTATION_CONTAINER_KEY,
    POD_ANNOTATION_DOMAIN, POD_ANNOTATION_POD_KEY,
};
use classres_common::error::Result;
use classres_common::types::Annotations;

/// Where a legacy class assignment was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOrigin {
    /// The container's own annotations.
    ContainerAnnotation,
    /// A pod annotation naming the container.
    PodContainerAnnotation,
    /// The pod-wide annotation.
    PodAnnotation,
}

/// A secondary source of class assignments consulted when a request
/// carries no structured assignment for a domain.
pub trait LegacyClassSource: Send + Sync {
    /// Returns the class requested for `container`, or `None` if the
    /// annotations do not request one.
    ///
    /// # Errors
    ///
    /// Returns an error if an annotation is present but unusable.
    fn container_class(
        &self,
        container: &str,
        container_annotations: &Annotations,
        pod_annotations: &Annotations,
    ) -> Result<Option<String>>;
}

/// The Kubernetes annotation convention for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationConvention {
    container_key: String,
    pod_key: String,
    pod_container_prefix: String,
}

impl AnnotationConvention {
    /// Builds the convention for the named domain.
    #[must_use]
    pub fn for_domain(domain: &str) -> Self {
        let pod_domain = format!("{domain}{POD_ANNOTATION_DOMAIN}");
        Self {
            container_key: format!(
                "{CONTAINER_ANNOTATION_PREFIX}{domain}{CONTAINER_ANNOTATION_SUFFIX}"
            ),
            pod_key: format!("{pod_domain}{POD_ANNOTATION_POD_KEY}"),
            pod_container_prefix: format!("{pod_domain}{POD_ANNOTATION_CONTAINER_KEY}"),
        }
    }

    /// Looks the class up, reporting which annotation supplied it.
    #[must_use]
    pub fn lookup<'a>(
        &self,
        container: &str,
        container_annotations: &'a Annotations,
        pod_annotations: &'a Annotations,
    ) -> Option<(&'a str, ClassOrigin)> {
        if let Some(cls) = container_annotations.get(&self.container_key) {
            return Some((cls.as_str(), ClassOrigin::ContainerAnnotation));
        }
        let per_container = format!("{}{container}", self.pod_container_prefix);
        if let Some(cls) = pod_annotations.get(&per_container) {
            return Some((cls.as_str(), ClassOrigin::PodContainerAnnotation));
        }
        pod_annotations
            .get(&self.pod_key)
            .map(|cls| (cls.as_str(), ClassOrigin::PodAnnotation))
    }
}

impl LegacyClassSource for AnnotationConvention {
    fn container_class(
        &self,
        container: &str,
        container_annotations: &Annotations,
        pod_annotations: &Annotations,
    ) -> Result<Option<String>> {
        let found = self.lookup(container, container_annotations, pod_annotations);
        if let Some((cls, origin)) = found {
            tracing::debug!(container, class = cls, ?origin, "class from annotations");
        }
        Ok(found
            .map(|(cls, _)| cls)
            .filter(|cls| !cls.is_empty())
            .map(str::to_owned))
    }
}
