//! `classctl resolve`: run a creation request through class resolution.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use classres_common::oci::SandboxAttachments;
use classres_common::types::{ContainerRequest, SandboxRequest};
use classres_core::ClassResourceService;
use serde::Deserialize;

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Request file with a `sandbox` and an optional `container`.
    pub request: PathBuf,

    /// Network configuration whose classes are imported before resolving.
    #[arg(long)]
    pub cni_config: Option<PathBuf>,
}

/// A creation request as read from a request file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RequestFile {
    /// The pod sandbox.
    pub sandbox: SandboxRequest,
    /// The container; absent for a sandbox request.
    pub container: Option<ContainerRequest>,
}

/// Executes the `resolve` command.
///
/// Prints the sandbox attachments, or the container spec fragments when
/// the request names a container.
///
/// # Errors
///
/// Returns an error if the request cannot be read or resolution fails.
pub fn execute(args: &ResolveArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.request)
        .with_context(|| format!("failed to read {}", args.request.display()))?;
    let request: RequestFile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid request file {}", args.request.display()))?;

    let service = super::build_service(config)?;
    if let Some(path) = &args.cni_config {
        service.load_cni_config_file(path)?;
    }

    let output = resolve(&service, &request)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolve(
    service: &ClassResourceService,
    request: &RequestFile,
) -> anyhow::Result<serde_json::Value> {
    let value = match &request.container {
        Some(container) => {
            tracing::info!(
                container = %container.name,
                sandbox = %request.sandbox.name,
                "resolving container classes"
            );
            let spec = service.generate_container_spec_fragments(container, &request.sandbox)?;
            serde_json::to_value(SandboxAttachments {
                spec,
                namespace: Vec::new(),
            })?
        }
        None => {
            tracing::info!(sandbox = %request.sandbox.name, "resolving sandbox classes");
            serde_json::to_value(service.generate_sandbox_attachments(&request.sandbox)?)?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use classres_common::config::{ClassResConfig, RdtConfig};

    use super::*;

    fn service() -> ClassResourceService {
        ClassResourceService::from_config(&ClassResConfig {
            rdt: RdtConfig {
                enabled: true,
                classes: vec!["gold".into()],
            },
            ..ClassResConfig::default()
        })
        .expect("service")
    }

    #[test]
    fn container_request_yields_spec_fragments() {
        let request: RequestFile = serde_json::from_str(
            r#"{
                "sandbox": { "name": "pod" },
                "container": { "name": "app", "assignments": [ { "domain": "rdt", "class": "gold" } ] }
            }"#,
        )
        .expect("request");
        let value = resolve(&service(), &request).expect("resolve");
        assert_eq!(value["spec"][0]["kind"], "intelRdt");
        assert_eq!(value["spec"][0]["value"]["closID"], "gold");
    }

    #[test]
    fn unknown_class_fails_the_request() {
        let request: RequestFile = serde_json::from_str(
            r#"{ "container": { "name": "app", "assignments": [ { "domain": "rdt", "class": "platinum" } ] } }"#,
        )
        .expect("request");
        let err = resolve(&service(), &request).unwrap_err();
        assert!(err.to_string().contains("platinum"), "got: {err}");
    }

    #[test]
    fn sandbox_request_without_classes_is_empty() {
        let request = RequestFile::default();
        let value = resolve(&service(), &request).expect("resolve");
        assert_eq!(value, serde_json::json!({ "spec": [], "namespace": [] }));
    }
}
