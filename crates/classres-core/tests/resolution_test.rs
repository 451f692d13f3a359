//! Integration tests for class resolution across the registry, resolver,
//! domain handlers, and service.
//!
//! Covered behaviour:
//! 1. Structured assignments take precedence over legacy annotations
//! 2. Unknown classes fail instead of passing silently
//! 3. Unrequested domains produce nothing
//! 4. Network class reconfiguration is atomic for concurrent readers
//! 5. A rejected reconfiguration keeps the previous classes
//! 6. Discovery leaves out domains without classes
//! 7. Duplicate domains are rejected before resolution

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use classres_common::config::{BlockIoConfig, ClassResConfig, RdtConfig};
use classres_common::error::ClassResError;
use classres_common::oci::{LinuxIntelRdt, SpecFragment};
use classres_common::types::{
    Annotations, ClassAssignments, ContainerRequest, ResourceDomain, SandboxRequest, Scope,
};
use classres_core::ClassResourceService;
use classres_core::domain::{ClassDomain, NetDomain};
use classres_core::resolver::ClassRequest;

fn service(blockio_classes: &[&str]) -> ClassResourceService {
    let classes = blockio_classes
        .iter()
        .map(|c| ((*c).to_owned(), classres_common::oci::LinuxBlockIo::default()))
        .collect();
    let config = ClassResConfig {
        rdt: RdtConfig {
            enabled: true,
            classes: vec!["gold".into(), "silver".into()],
        },
        blockio: BlockIoConfig {
            enabled: true,
            classes,
        },
        ..ClassResConfig::default()
    };
    ClassResourceService::from_config(&config).expect("service should initialize")
}

fn annotations(pairs: &[(&str, &str)]) -> Annotations {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn container(assignments: ClassAssignments, annotations: Annotations) -> ContainerRequest {
    ContainerRequest {
        name: "app".into(),
        assignments,
        annotations,
    }
}

fn sandbox(assignments: ClassAssignments, annotations: Annotations) -> SandboxRequest {
    SandboxRequest {
        name: "pod".into(),
        assignments,
        annotations,
    }
}

// ── Precedence ───────────────────────────────────────────────────────

#[test]
fn structured_assignment_overrides_annotations() {
    let svc = service(&[]);
    let ctr = container(
        ClassAssignments::new().with("rdt", "gold"),
        annotations(&[("io.kubernetes.cri.rdt-class", "silver")]),
    );
    let pod = sandbox(
        ClassAssignments::new(),
        annotations(&[("rdt.resources.beta.kubernetes.io/pod", "silver")]),
    );

    let fragments = svc
        .generate_container_spec_fragments(&ctr, &pod)
        .expect("should resolve");
    assert_eq!(
        fragments,
        vec![SpecFragment::IntelRdt(LinuxIntelRdt {
            clos_id: Some("gold".into()),
            ..LinuxIntelRdt::default()
        })]
    );
}

#[test]
fn pod_annotations_apply_per_container_then_pod_wide() {
    let svc = service(&[]);
    let pod = sandbox(
        ClassAssignments::new(),
        annotations(&[
            ("rdt.resources.beta.kubernetes.io/container.app", "silver"),
            ("rdt.resources.beta.kubernetes.io/pod", "gold"),
        ]),
    );

    let app = svc
        .generate_container_spec_fragments(&container(ClassAssignments::new(), Annotations::new()), &pod)
        .expect("should resolve");
    let sidecar = svc
        .generate_container_spec_fragments(
            &ContainerRequest {
                name: "sidecar".into(),
                ..ContainerRequest::default()
            },
            &pod,
        )
        .expect("should resolve");

    let clos = |f: &[SpecFragment]| match f {
        [SpecFragment::IntelRdt(rdt)] => rdt.clos_id.clone(),
        other => panic!("unexpected fragments: {other:?}"),
    };
    assert_eq!(clos(&app).as_deref(), Some("silver"));
    assert_eq!(clos(&sidecar).as_deref(), Some("gold"));
}

// ── Unknown and absent classes ───────────────────────────────────────

#[test]
fn nonexistent_class_is_an_error_in_every_domain() {
    let svc = service(&["slow"]);
    svc.update_cni_classes(r#"{ "qos": { "A": {} } }"#)
        .expect("cni update");
    let pod = sandbox(ClassAssignments::new(), Annotations::new());

    for domain in ["rdt", "blockio"] {
        let ctr = container(
            ClassAssignments::new().with(domain, "nonexistent"),
            Annotations::new(),
        );
        let err = svc.generate_container_spec_fragments(&ctr, &pod).unwrap_err();
        assert!(
            matches!(err, ClassResError::UnknownClass { .. }),
            "{domain}: got {err}"
        );
    }

    let err = svc
        .generate_sandbox_attachments(&sandbox(
            ClassAssignments::new().with("net", "nonexistent"),
            Annotations::new(),
        ))
        .unwrap_err();
    assert!(matches!(err, ClassResError::UnknownClass { .. }), "got {err}");
}

#[test]
fn unrequested_domains_produce_no_fragments() {
    let svc = service(&["slow"]);
    let fragments = svc
        .generate_container_spec_fragments(
            &container(
                ClassAssignments::new(),
                annotations(&[("io.kubernetes.cri.rdt-class", "")]),
            ),
            &sandbox(ClassAssignments::new(), Annotations::new()),
        )
        .expect("nothing requested is not an error");
    assert!(fragments.is_empty());

    let attachments = svc
        .generate_sandbox_attachments(&sandbox(ClassAssignments::new(), Annotations::new()))
        .expect("nothing requested is not an error");
    assert!(attachments.spec.is_empty());
    assert!(attachments.namespace.is_empty());
}

// ── Reconfiguration ──────────────────────────────────────────────────

#[test]
fn concurrent_resolution_sees_whole_class_sets() {
    const READERS: usize = 100;
    const ROUNDS: usize = 300;

    let svc = service(&[]);
    svc.update_cni_classes(r#"{ "qos": { "A": {}, "B": {} } }"#)
        .expect("initial classes");
    let net = NetDomain::new(Arc::clone(svc.registry()));
    let start = Barrier::new(READERS + 1);
    let found = AtomicUsize::new(0);
    let unknown = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..READERS {
            let _ = s.spawn(|| {
                let assignments = ClassAssignments::new().with("net", "A");
                let empty = Annotations::new();
                let request = ClassRequest {
                    container: "pod",
                    assignments: &assignments,
                    container_annotations: &empty,
                    pod_annotations: &empty,
                };
                let mut swapped = false;
                let _ = start.wait();
                for _ in 0..ROUNDS {
                    match net.resolve(&request) {
                        Ok(Some(resolved)) => {
                            assert_eq!(resolved.class.as_str(), "A");
                            assert!(!swapped, "old class set seen after the new one");
                            let _ = found.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(ClassResError::UnknownClass { class, .. }) => {
                            assert_eq!(class, "A");
                            swapped = true;
                            let _ = unknown.fetch_add(1, Ordering::Relaxed);
                        }
                        other => panic!("unexpected resolution outcome: {other:?}"),
                    }

                    let classes = svc
                        .registry()
                        .list_classes(Scope::Pod, &ResourceDomain::Net);
                    let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
                    assert!(
                        names == ["A", "B"] || names == ["C", "D"],
                        "observed partial class set: {names:?}"
                    );
                }
            });
        }
        let _ = s.spawn(|| {
            let _ = start.wait();
            svc.update_cni_classes(r#"{ "qos": { "C": {}, "D": {} } }"#)
                .expect("reconfiguration");
        });
    });

    assert_eq!(
        found.load(Ordering::Relaxed) + unknown.load(Ordering::Relaxed),
        READERS * ROUNDS
    );
    assert!(svc.registry().class_exists(Scope::Pod, &ResourceDomain::Net, "C"));
    assert!(!svc.registry().class_exists(Scope::Pod, &ResourceDomain::Net, "A"));
}

#[test]
fn malformed_reconfiguration_keeps_previous_classes() {
    let svc = service(&[]);
    svc.update_cni_classes(r#"{ "qos": { "A": {}, "B": {} } }"#)
        .expect("initial classes");

    let err = svc
        .update_cni_classes(r#"{ "qos": { "A": { "capacity": "many" } } }"#)
        .unwrap_err();
    assert!(matches!(err, ClassResError::ConfigParse { .. }), "got {err}");

    let names: Vec<_> = svc
        .registry()
        .list_classes(Scope::Pod, &ResourceDomain::Net)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

// ── Discovery and validation ─────────────────────────────────────────

#[test]
fn discovery_omits_blockio_without_classes() {
    let svc = service(&[]);
    let names: Vec<_> = svc
        .container_level_domains()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["rdt"]);
}

#[test]
fn duplicate_domain_is_rejected_before_resolution() {
    let svc = service(&["slow"]);
    let ctr = container(
        ClassAssignments::new()
            .with("rdt", "nonexistent")
            .with("blockio", "slow")
            .with("rdt", "gold"),
        Annotations::new(),
    );
    let err = svc
        .generate_container_spec_fragments(&ctr, &sandbox(ClassAssignments::new(), Annotations::new()))
        .unwrap_err();
    assert!(
        matches!(err, ClassResError::DuplicateDomain { ref domain } if domain == "rdt"),
        "got {err}"
    );
}

#[test]
fn blockio_parameters_reach_the_fragment() {
    let mut classes = BTreeMap::new();
    let _ = classes.insert(
        "throttled".to_owned(),
        classres_common::oci::LinuxBlockIo {
            weight: Some(50),
            ..classres_common::oci::LinuxBlockIo::default()
        },
    );
    let config = ClassResConfig {
        blockio: BlockIoConfig {
            enabled: true,
            classes,
        },
        ..ClassResConfig::default()
    };
    let svc = ClassResourceService::from_config(&config).expect("service");
    let pod = sandbox(
        ClassAssignments::new(),
        annotations(&[("blockio.resources.beta.kubernetes.io/pod", "throttled")]),
    );
    let fragments = svc
        .generate_container_spec_fragments(&container(ClassAssignments::new(), Annotations::new()), &pod)
        .expect("should resolve");
    assert!(matches!(fragments.as_slice(), [SpecFragment::BlockIo(b)] if b.weight == Some(50)));
}
