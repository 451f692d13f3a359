//! Block I/O cgroup classes.

use std::collections::BTreeMap;
use std::sync::Arc;

use classres_common::config::BlockIoConfig;
use classres_common::constants::DOMAIN_BLOCKIO;
use classres_common::error::{ClassResError, Result};
use classres_common::oci::{LinuxBlockIo, SpecFragment};
use classres_common::types::{ResourceDomain, Scope};

use super::{Attachment, ClassDomain};
use crate::annotations::AnnotationConvention;
use crate::registry::ClassRegistry;
use crate::resolver::{self, ClassRequest, LegacyFallback, ResolvedClass};

/// The cgroup side of block I/O class support.
pub trait BlockIoController: Send + Sync {
    /// Whether block I/O class support initialized.
    fn enabled(&self) -> bool;

    /// Names of the configured classes.
    fn classes(&self) -> Vec<String>;

    /// Returns the OCI block I/O parameters of a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the class is not (or no longer) configured.
    fn linux_block_io(&self, class: &str) -> Result<LinuxBlockIo>;
}

/// Block I/O classes described entirely by configuration.
#[derive(Debug, Clone)]
pub struct StaticBlockIo {
    enabled: bool,
    classes: BTreeMap<String, LinuxBlockIo>,
}

impl StaticBlockIo {
    /// Creates the controller from configuration.
    #[must_use]
    pub fn from_config(config: &BlockIoConfig) -> Self {
        if !config.enabled {
            tracing::info!("block I/O classes are not enabled");
        }
        Self {
            enabled: config.enabled,
            classes: config.classes.clone(),
        }
    }
}

impl BlockIoController for StaticBlockIo {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn classes(&self) -> Vec<String> {
        if self.enabled {
            self.classes.keys().cloned().collect()
        } else {
            Vec::new()
        }
    }

    fn linux_block_io(&self, class: &str) -> Result<LinuxBlockIo> {
        self.classes
            .get(class)
            .cloned()
            .ok_or_else(|| ClassResError::Translation {
                domain: DOMAIN_BLOCKIO.into(),
                class: class.to_owned(),
                message: "class not found in block I/O configuration".into(),
            })
    }
}

/// Handler of the `blockio` domain.
pub struct BlockIoDomain {
    registry: Arc<ClassRegistry>,
    controller: Arc<dyn BlockIoController>,
    annotations: AnnotationConvention,
}

impl BlockIoDomain {
    /// Creates the handler.
    #[must_use]
    pub fn new(registry: Arc<ClassRegistry>, controller: Arc<dyn BlockIoController>) -> Self {
        Self {
            registry,
            controller,
            annotations: AnnotationConvention::for_domain(DOMAIN_BLOCKIO),
        }
    }

    /// Whether the underlying mechanism is available.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.controller.enabled()
    }
}

impl ClassDomain for BlockIoDomain {
    fn domain(&self) -> ResourceDomain {
        ResourceDomain::BlockIo
    }

    fn resolve(&self, request: &ClassRequest<'_>) -> Result<Option<ResolvedClass>> {
        resolver::resolve_container_class(
            &self.registry,
            Scope::Container,
            &ResourceDomain::BlockIo,
            LegacyFallback {
                source: &self.annotations,
                enabled: self.controller.enabled(),
            },
            request,
        )
    }

    fn translate(&self, resolved: &ResolvedClass) -> Result<Vec<Attachment>> {
        let block_io = self.controller.linux_block_io(resolved.class.as_str())?;
        tracing::info!(class = %resolved.class, "setting block I/O class");
        Ok(vec![Attachment::Spec(SpecFragment::BlockIo(block_io))])
    }
}
