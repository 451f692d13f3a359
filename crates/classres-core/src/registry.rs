//! Process-wide registry of known classes per resource domain.
//!
//! Readers take a lock-free snapshot of an immutable map; writers serialise
//! on a mutex and publish a whole new map. A domain's entry is therefore
//! always replaced as a unit and a reader never observes a mix of old and
//! new classes for the same domain.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use classres_common::oci::Bandwidth;
use classres_common::types::{ClassInfo, ClassName, ResourceDomain, Scope};

/// Per-class data kept by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassEntry {
    /// Maximum number of simultaneous users, zero when unbounded.
    pub capacity: u64,
    /// Traffic shaping applied by network classes.
    pub bandwidth: Option<Bandwidth>,
}

/// The immutable class set of one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainClasses {
    /// Whether the class of a running workload may be changed.
    pub mutable: bool,
    /// Classes by name.
    pub classes: BTreeMap<ClassName, ClassEntry>,
}

impl DomainClasses {
    /// Returns the classes in discovery form.
    #[must_use]
    pub fn class_infos(&self) -> Vec<ClassInfo> {
        self.classes
            .iter()
            .map(|(name, entry)| ClassInfo {
                name: name.to_string(),
                capacity: entry.capacity,
            })
            .collect()
    }
}

type DomainMap = BTreeMap<(Scope, ResourceDomain), Arc<DomainClasses>>;

/// Registry of class sets keyed by scope and domain.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    domains: ArcSwap<DomainMap>,
    writer: Mutex<()>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or wholesale replaces the class set of a domain.
    pub fn register_domain(
        &self,
        scope: Scope,
        domain: ResourceDomain,
        mutable: bool,
        classes: impl IntoIterator<Item = (ClassName, ClassEntry)>,
    ) {
        let entry = Arc::new(DomainClasses {
            mutable,
            classes: classes.into_iter().collect(),
        });
        tracing::info!(
            %scope,
            %domain,
            classes = entry.classes.len(),
            "registering class resource domain"
        );
        self.update(|map| {
            let _ = map.insert((scope, domain), entry);
        });
    }

    /// Removes a domain. Returns `true` if it was registered.
    pub fn remove_domain(&self, scope: Scope, domain: &ResourceDomain) -> bool {
        let mut removed = false;
        self.update(|map| {
            removed = map.remove(&(scope, domain.clone())).is_some();
        });
        if removed {
            tracing::info!(%scope, %domain, "class resource domain removed");
        }
        removed
    }

    /// Returns the current class set of a domain.
    #[must_use]
    pub fn snapshot(&self, scope: Scope, domain: &ResourceDomain) -> Option<Arc<DomainClasses>> {
        self.domains.load().get(&(scope, domain.clone())).cloned()
    }

    /// Returns `true` if the domain is registered and offers `name`.
    #[must_use]
    pub fn class_exists(&self, scope: Scope, domain: &ResourceDomain, name: &str) -> bool {
        self.lookup(scope, domain, name).is_some()
    }

    /// Returns the entry of a class.
    #[must_use]
    pub fn lookup(&self, scope: Scope, domain: &ResourceDomain, name: &str) -> Option<ClassEntry> {
        let name = ClassName::new(name)?;
        self.snapshot(scope, domain)
            .and_then(|classes| classes.classes.get(&name).copied())
    }

    /// Lists the classes of a domain; empty if the domain is unknown.
    #[must_use]
    pub fn list_classes(&self, scope: Scope, domain: &ResourceDomain) -> Vec<ClassInfo> {
        self.snapshot(scope, domain)
            .map(|classes| classes.class_infos())
            .unwrap_or_default()
    }

    /// Returns `true` if the domain is registered, even with no classes.
    #[must_use]
    pub fn has_domain(&self, scope: Scope, domain: &ResourceDomain) -> bool {
        self.domains.load().contains_key(&(scope, domain.clone()))
    }

    /// Lists the registered domains of a scope in stable order.
    #[must_use]
    pub fn domains(&self, scope: Scope) -> Vec<ResourceDomain> {
        self.domains
            .load()
            .keys()
            .filter(|(s, _)| *s == scope)
            .map(|(_, d)| d.clone())
            .collect()
    }

    /// Returns every domain of a scope with its class set, from one snapshot.
    #[must_use]
    pub fn entries(&self, scope: Scope) -> Vec<(ResourceDomain, Arc<DomainClasses>)> {
        self.domains
            .load()
            .iter()
            .filter(|((s, _), _)| *s == scope)
            .map(|((_, d), classes)| (d.clone(), Arc::clone(classes)))
            .collect()
    }

    fn update(&self, mutate: impl FnOnce(&mut DomainMap)) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = DomainMap::clone(&self.domains.load());
        mutate(&mut next);
        self.domains.store(Arc::new(next));
    }
}
