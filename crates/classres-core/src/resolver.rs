//! Class resolution: validation of structured assignments and the
//! structured-then-legacy fallback protocol.

use std::collections::HashSet;

use classres_common::error::{ClassResError, Result};
use classres_common::types::{
    Annotations, ClassAssignments, ClassName, ContainerRequest, ResourceDomain, SandboxRequest,
    Scope,
};

use crate::annotations::LegacyClassSource;
use crate::registry::{ClassEntry, ClassRegistry};

/// The parts of a creation request class resolution looks at.
#[derive(Debug, Clone, Copy)]
pub struct ClassRequest<'a> {
    /// Workload name used in messages and legacy annotation keys.
    pub container: &'a str,
    /// Structured assignments of the workload.
    pub assignments: &'a ClassAssignments,
    /// Annotations of the workload itself.
    pub container_annotations: &'a Annotations,
    /// Annotations of the enclosing pod.
    pub pod_annotations: &'a Annotations,
}

impl<'a> ClassRequest<'a> {
    /// Builds the request view of a container inside its sandbox.
    #[must_use]
    pub fn for_container(container: &'a ContainerRequest, sandbox: &'a SandboxRequest) -> Self {
        Self {
            container: container.name.as_str(),
            assignments: &container.assignments,
            container_annotations: &container.annotations,
            pod_annotations: &sandbox.annotations,
        }
    }

    /// Builds the request view of a pod sandbox.
    #[must_use]
    pub fn for_sandbox(sandbox: &'a SandboxRequest) -> Self {
        Self {
            container: sandbox.name.as_str(),
            assignments: &sandbox.assignments,
            container_annotations: &sandbox.annotations,
            pod_annotations: &sandbox.annotations,
        }
    }
}

/// The class chosen for one domain of one workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClass {
    /// Level the class applies at.
    pub scope: Scope,
    /// Domain of the class.
    pub domain: ResourceDomain,
    /// Class name.
    pub class: ClassName,
    /// Registry entry captured at resolution time.
    ///
    /// Translation reports it but does not apply it: domains whose classes
    /// can be reloaded look the class up again when translating.
    pub entry: ClassEntry,
}

/// Legacy fallback of a domain: the annotation source and whether the
/// domain's mechanism is available.
#[derive(Clone, Copy)]
pub struct LegacyFallback<'a> {
    /// Source consulted when no structured assignment exists.
    pub source: &'a dyn LegacyClassSource,
    /// Whether the domain's enforcement mechanism initialized.
    pub enabled: bool,
}

/// Validates the full structured assignment set of a request.
///
/// # Checks performed
///
/// 1. No domain is assigned twice.
/// 2. Every domain is either built in at this level or registered.
/// 3. No class name is empty.
///
/// Checks 2 and 3 run per assignment in request order, so the reported
/// error is reproducible for a given request.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_assignments(
    registry: &ClassRegistry,
    scope: Scope,
    builtin: &[ResourceDomain],
    assignments: &ClassAssignments,
) -> Result<()> {
    let mut seen = HashSet::new();
    for assignment in assignments {
        if !seen.insert(assignment.domain.as_str()) {
            return Err(ClassResError::DuplicateDomain {
                domain: assignment.domain.clone(),
            });
        }
    }

    for assignment in assignments {
        let domain = ResourceDomain::parse(&assignment.domain);
        if !builtin.contains(&domain) && !registry.has_domain(scope, &domain) {
            return Err(ClassResError::UnknownDomain {
                scope: scope.as_str(),
                domain: assignment.domain.clone(),
            });
        }
        if assignment.class.is_empty() {
            return Err(ClassResError::EmptyClassName {
                domain: assignment.domain.clone(),
            });
        }
    }
    Ok(())
}

/// Resolves the class of a domain that accepts legacy annotations.
///
/// A structured assignment always takes precedence and disables the
/// fallback, even if its class turns out to be invalid. A candidate is
/// checked for domain enablement before class existence.
///
/// Returns `Ok(None)` when the domain is not requested.
///
/// # Errors
///
/// Returns [`ClassResError::DomainDisabled`] if a class is requested for a
/// disabled domain, [`ClassResError::UnknownClass`] if the class is not
/// registered, or any error of the legacy source.
pub fn resolve_container_class(
    registry: &ClassRegistry,
    scope: Scope,
    domain: &ResourceDomain,
    fallback: LegacyFallback<'_>,
    request: &ClassRequest<'_>,
) -> Result<Option<ResolvedClass>> {
    let candidate = match request.assignments.get(domain) {
        Some("") => {
            return Err(ClassResError::EmptyClassName {
                domain: domain.to_string(),
            });
        }
        Some(cls) => {
            tracing::debug!(
                %domain,
                container = request.container,
                class = cls,
                "class from structured assignment"
            );
            Some(cls.to_owned())
        }
        None => fallback.source.container_class(
            request.container,
            request.container_annotations,
            request.pod_annotations,
        )?,
    };

    let Some(candidate) = candidate.and_then(ClassName::new) else {
        return Ok(None);
    };

    if !fallback.enabled {
        return Err(ClassResError::DomainDisabled {
            domain: domain.to_string(),
            container: request.container.to_owned(),
            class: candidate.to_string(),
        });
    }

    lookup_class(registry, scope, domain, candidate).map(Some)
}

/// Resolves the class of a domain that only accepts structured assignments.
///
/// Returns `Ok(None)` when the request carries no assignment for `domain`.
///
/// # Errors
///
/// Returns [`ClassResError::EmptyClassName`] for an empty assignment and
/// [`ClassResError::UnknownClass`] if the class is not registered.
pub fn resolve_assigned_class(
    registry: &ClassRegistry,
    scope: Scope,
    domain: &ResourceDomain,
    assignments: &ClassAssignments,
) -> Result<Option<ResolvedClass>> {
    let Some(cls) = assignments.get(domain) else {
        return Ok(None);
    };
    let Some(candidate) = ClassName::new(cls) else {
        return Err(ClassResError::EmptyClassName {
            domain: domain.to_string(),
        });
    };
    lookup_class(registry, scope, domain, candidate).map(Some)
}

fn lookup_class(
    registry: &ClassRegistry,
    scope: Scope,
    domain: &ResourceDomain,
    class: ClassName,
) -> Result<ResolvedClass> {
    let Some(entry) = registry.lookup(scope, domain, class.as_str()) else {
        return Err(ClassResError::UnknownClass {
            domain: domain.to_string(),
            class: class.to_string(),
        });
    };
    Ok(ResolvedClass {
        scope,
        domain: domain.clone(),
        class,
        entry,
    })
}
