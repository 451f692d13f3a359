//! Class resource service used by the sandbox and container creation paths.
//!
//! A creation request is handled in three phases: the structured
//! assignments are validated as a whole, every requested domain is
//! resolved, and only then are the resolved classes translated into
//! attachments. Any fatal error aborts the request without a partial
//! result.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use classres_common::config::{ClassResConfig, DomainConfig, RuntimeHandlerConfig};
use classres_common::error::{ClassResError, Result};
use classres_common::oci::{SandboxAttachments, SpecFragment};
use classres_common::types::{
    ClassAssignments, ClassName, ContainerRequest, DomainInfo, ResourceDomain, SandboxRequest,
    Scope,
};

use crate::cni;
use crate::discovery;
use crate::domain::{
    self, BlockIoController, BlockIoDomain, ClassDomain, GenericDomain, NetDomain,
    RdtController, RdtDomain, StaticBlockIo, StaticRdt,
};
use crate::registry::{ClassEntry, ClassRegistry};
use crate::resolver::{self, ClassRequest, ResolvedClass};
use crate::runtime_config::{self, RuntimeConfig};

const CONTAINER_BUILTIN: [ResourceDomain; 2] = [ResourceDomain::Rdt, ResourceDomain::BlockIo];
const POD_BUILTIN: [ResourceDomain; 1] = [ResourceDomain::Net];

/// Resolves and translates the class resources of pods and containers.
pub struct ClassResourceService {
    registry: Arc<ClassRegistry>,
    rdt: RdtDomain,
    blockio: BlockIoDomain,
    net: NetDomain,
    ignore_rdt_not_enabled_errors: bool,
    ignore_blockio_not_enabled_errors: bool,
    runtimes: BTreeMap<String, RuntimeHandlerConfig>,
    default_runtime_name: String,
}

impl ClassResourceService {
    /// Creates the service with the given collaborators and registers the
    /// static and configured generic domains.
    ///
    /// The configuration is expected to be validated already.
    #[must_use]
    pub fn new(
        config: &ClassResConfig,
        rdt: Arc<dyn RdtController>,
        blockio: Arc<dyn BlockIoController>,
    ) -> Self {
        let registry = Arc::new(ClassRegistry::new());

        register_static(&registry, ResourceDomain::Rdt, rdt.classes());
        register_static(&registry, ResourceDomain::BlockIo, blockio.classes());
        for domain in &config.pod_domains {
            register_generic(&registry, Scope::Pod, domain);
        }
        for domain in &config.container_domains {
            register_generic(&registry, Scope::Container, domain);
        }

        Self {
            rdt: RdtDomain::new(Arc::clone(&registry), rdt),
            blockio: BlockIoDomain::new(Arc::clone(&registry), blockio),
            net: NetDomain::new(Arc::clone(&registry)),
            registry,
            ignore_rdt_not_enabled_errors: config.ignore_rdt_not_enabled_errors,
            ignore_blockio_not_enabled_errors: config.ignore_blockio_not_enabled_errors,
            runtimes: config.runtimes.clone(),
            default_runtime_name: config.default_runtime_name.clone(),
        }
    }

    /// Creates the service with collaborators built from configuration and
    /// imports the configured network classes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the configured
    /// network configuration cannot be read or parsed.
    pub fn from_config(config: &ClassResConfig) -> Result<Self> {
        config.validate()?;
        let service = Self::new(
            config,
            Arc::new(StaticRdt::from_config(&config.rdt)),
            Arc::new(StaticBlockIo::from_config(&config.blockio)),
        );
        if let Some(path) = &config.cni_config {
            service.load_cni_config_file(path)?;
        }
        tracing::info!(
            rdt_enabled = service.rdt.enabled(),
            blockio_enabled = service.blockio.enabled(),
            "class resource service initialized"
        );
        Ok(service)
    }

    /// Returns the registry backing the service.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Resolves the pod-level classes of a sandbox and returns what they
    /// attach to its launch.
    ///
    /// # Errors
    ///
    /// Returns the first validation, resolution, or translation error.
    pub fn generate_sandbox_attachments(
        &self,
        sandbox: &SandboxRequest,
    ) -> Result<SandboxAttachments> {
        resolver::validate_assignments(
            &self.registry,
            Scope::Pod,
            &POD_BUILTIN,
            &sandbox.assignments,
        )?;

        let generic = self.generic_domains(Scope::Pod, &POD_BUILTIN, &sandbox.assignments);
        let mut handlers: Vec<&dyn ClassDomain> = vec![&self.net];
        handlers.extend(generic.iter().map(|d| d as &dyn ClassDomain));

        let request = ClassRequest::for_sandbox(sandbox);
        let resolved = self.resolve_all(&handlers, &request)?;

        let mut out = SandboxAttachments::default();
        for (handler, class) in resolved {
            domain::merge_attachments(&mut out, handler.translate(&class)?);
        }
        tracing::debug!(
            sandbox = %sandbox.name,
            spec = out.spec.len(),
            namespace = out.namespace.len(),
            "sandbox class attachments generated"
        );
        Ok(out)
    }

    /// Resolves the container-level classes of a container and returns the
    /// spec fragments they contribute.
    ///
    /// A "domain disabled" error for `rdt` or `blockio` is downgraded to a
    /// warning when the matching ignore switch is set; the domain is then
    /// left out of the result.
    ///
    /// # Errors
    ///
    /// Returns the first validation, resolution, or translation error.
    pub fn generate_container_spec_fragments(
        &self,
        container: &ContainerRequest,
        sandbox: &SandboxRequest,
    ) -> Result<Vec<SpecFragment>> {
        resolver::validate_assignments(
            &self.registry,
            Scope::Container,
            &CONTAINER_BUILTIN,
            &container.assignments,
        )?;

        let generic =
            self.generic_domains(Scope::Container, &CONTAINER_BUILTIN, &container.assignments);
        let mut handlers: Vec<&dyn ClassDomain> = vec![&self.rdt, &self.blockio];
        handlers.extend(generic.iter().map(|d| d as &dyn ClassDomain));

        let request = ClassRequest::for_container(container, sandbox);
        let resolved = self.resolve_all(&handlers, &request)?;

        let mut out = SandboxAttachments::default();
        for (handler, class) in resolved {
            domain::merge_attachments(&mut out, handler.translate(&class)?);
        }
        Ok(out.spec)
    }

    /// Returns the pod-level domains and their classes.
    #[must_use]
    pub fn pod_level_domains(&self) -> Vec<DomainInfo> {
        discovery::pod_level_domains(&self.registry)
    }

    /// Returns the container-level domains and their classes.
    #[must_use]
    pub fn container_level_domains(&self) -> Vec<DomainInfo> {
        discovery::container_level_domains(&self.registry)
    }

    /// Replaces the network classes with those of a network configuration.
    ///
    /// On failure the previous classes stay in place.
    ///
    /// # Errors
    ///
    /// Returns [`ClassResError::ConfigParse`] if the configuration cannot be parsed.
    pub fn update_cni_classes(&self, raw: &str) -> Result<()> {
        let classes = match cni::import_from_plugin_config(raw) {
            Ok(classes) => classes,
            Err(e) => {
                tracing::warn!(error = %e, "rejected network class configuration, keeping previous classes");
                return Err(e);
            }
        };
        let count = classes.len();
        self.registry
            .register_domain(Scope::Pod, ResourceDomain::Net, false, classes);
        tracing::info!(classes = count, "network classes updated");
        Ok(())
    }

    /// Replaces the network classes from the networks loaded by the network
    /// plugin, in load order.
    ///
    /// # Errors
    ///
    /// Returns [`ClassResError::ConfigParse`] if no class-carrying network is
    /// loaded or its configuration cannot be parsed.
    pub fn update_cni_classes_from_networks(&self, networks: &[String]) -> Result<()> {
        let raw = cni::select_network_config(networks).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected network class configuration, keeping previous classes");
        })?;
        self.update_cni_classes(raw)
    }

    /// Reads a network configuration file and replaces the network classes.
    ///
    /// # Errors
    ///
    /// Returns [`ClassResError::Io`] if the file cannot be read, or the
    /// error of [`update_cni_classes`](Self::update_cni_classes).
    pub fn load_cni_config_file(&self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path).map_err(|e| ClassResError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loading network class configuration");
        self.update_cni_classes(&raw)
    }

    /// Reports the runtime configuration derived from the runtime handlers.
    #[must_use]
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            cgroup_driver: runtime_config::cgroup_driver(
                &self.runtimes,
                &self.default_runtime_name,
            ),
        }
    }

    fn generic_domains(
        &self,
        scope: Scope,
        builtin: &[ResourceDomain],
        assignments: &ClassAssignments,
    ) -> Vec<GenericDomain> {
        assignments
            .iter()
            .map(|a| ResourceDomain::parse(&a.domain))
            .filter(|d| !builtin.contains(d))
            .map(|d| GenericDomain::new(Arc::clone(&self.registry), scope, d))
            .collect()
    }

    fn resolve_all<'h>(
        &self,
        handlers: &[&'h dyn ClassDomain],
        request: &ClassRequest<'_>,
    ) -> Result<Vec<(&'h dyn ClassDomain, ResolvedClass)>> {
        let mut resolved = Vec::with_capacity(handlers.len());
        for &handler in handlers {
            match handler.resolve(request) {
                Ok(Some(class)) => resolved.push((handler, class)),
                Ok(None) => {}
                Err(e) => self.downgrade(&handler.domain(), request.container, e)?,
            }
        }
        Ok(resolved)
    }

    fn downgrade(&self, domain: &ResourceDomain, container: &str, err: ClassResError) -> Result<()> {
        let ignore = match domain {
            ResourceDomain::Rdt => self.ignore_rdt_not_enabled_errors,
            ResourceDomain::BlockIo => self.ignore_blockio_not_enabled_errors,
            ResourceDomain::Net | ResourceDomain::Other(_) => false,
        };
        if ignore && err.is_domain_disabled() {
            tracing::warn!(%domain, container, error = %err, "ignoring class of disabled domain");
            return Ok(());
        }
        Err(err)
    }
}

fn register_static(registry: &ClassRegistry, domain: ResourceDomain, classes: Vec<String>) {
    registry.register_domain(
        Scope::Container,
        domain,
        false,
        classes
            .into_iter()
            .filter_map(ClassName::new)
            .map(|name| (name, ClassEntry::default())),
    );
}

fn register_generic(registry: &ClassRegistry, scope: Scope, config: &DomainConfig) {
    registry.register_domain(
        scope,
        ResourceDomain::parse(&config.name),
        config.mutable,
        config.classes.iter().filter_map(|class| {
            ClassName::new(class.name.as_str()).map(|name| {
                (
                    name,
                    ClassEntry {
                        capacity: class.capacity,
                        bandwidth: None,
                    },
                )
            })
        }),
    );
}
