//! Per-domain class handling.
//!
//! Every resource domain implements [`ClassDomain`]: `resolve` picks the
//! class a workload asked for and validates it, `translate` turns the
//! resolved class into launch-spec attachments. The enforcement itself is
//! left to collaborators behind [`RdtController`] and [`BlockIoController`].

pub mod blockio;
pub mod generic;
pub mod net;
pub mod rdt;

pub use blockio::{BlockIoController, BlockIoDomain, StaticBlockIo};
pub use generic::GenericDomain;
pub use net::NetDomain;
pub use rdt::{RdtController, RdtDomain, StaticRdt};

use classres_common::error::Result;
use classres_common::oci::{NamespaceOpt, SandboxAttachments, SpecFragment};
use classres_common::types::ResourceDomain;

use crate::resolver::{ClassRequest, ResolvedClass};

/// Something a resolved class contributes to a workload's launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A fragment of the OCI runtime spec.
    Spec(SpecFragment),
    /// A network namespace setup option.
    Namespace(NamespaceOpt),
}

/// Appends attachments to the matching lists of `out`.
pub fn merge_attachments(out: &mut SandboxAttachments, attachments: Vec<Attachment>) {
    for attachment in attachments {
        match attachment {
            Attachment::Spec(fragment) => out.spec.push(fragment),
            Attachment::Namespace(opt) => out.namespace.push(opt),
        }
    }
}

/// Resolution and translation for one resource domain.
pub trait ClassDomain: Send + Sync {
    /// Returns the domain handled.
    fn domain(&self) -> ResourceDomain;

    /// Picks and validates the class requested for this domain.
    ///
    /// Returns `Ok(None)` when the domain is not requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested class cannot be used.
    fn resolve(&self, request: &ClassRequest<'_>) -> Result<Option<ResolvedClass>>;

    /// Converts a resolved class into launch-spec attachments.
    ///
    /// # Errors
    ///
    /// Returns [`ClassResError::Translation`](classres_common::error::ClassResError::Translation)
    /// or the collaborator's error if the class cannot be applied.
    fn translate(&self, resolved: &ResolvedClass) -> Result<Vec<Attachment>>;
}
