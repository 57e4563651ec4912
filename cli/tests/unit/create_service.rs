//! Unit tests for the create-instance service.

#![allow(clippy::expect_used)]

use std::time::Duration;

use tins_cli::application::ports::KeyStore;
use tins_cli::application::services::create::{
    CreateOptions, LaunchTarget, Readiness, WaitPolicy, create_instance, wait_for_active,
};
use tins_cli::domain::naming::{MANAGED_METADATA_KEY, MANAGED_METADATA_VALUE};
use tins_cli::domain::{InstanceIdentity, InstanceStatus, KeyError, ProviderError, ResourceKind};
use tins_cli::infra::keys::FsKeyStore;
use tokio_util::sync::CancellationToken;

use crate::mocks::{FakeCloud, MemKeyStore, RecordingReporter, managed};

fn target() -> LaunchTarget<'static> {
    LaunchTarget {
        image_name: "ubuntu-24.04",
        flavor_name: "m1.small",
        network_name: "private",
        availability_zone: "nova",
    }
}

fn opts<'a>(
    reporter: &'a RecordingReporter,
    name: Option<&'a str>,
) -> CreateOptions<'a, RecordingReporter> {
    CreateOptions {
        reporter,
        name,
        target: target(),
        wait: None,
    }
}

fn fast_wait(timeout: Duration, cancel: CancellationToken) -> WaitPolicy {
    WaitPolicy {
        interval: Duration::from_secs(5),
        timeout,
        cancel,
    }
}

#[tokio::test]
async fn test_create_with_explicit_name_registers_everything_under_full_name() {
    let cloud = FakeCloud::new();
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = FsKeyStore::with_dir(dir.path().to_path_buf());
    let reporter = RecordingReporter::new();

    let outcome = create_instance(&cloud, &keys, opts(&reporter, Some("alpha")))
        .await
        .expect("create");

    assert!(dir.path().join("tins-alpha").is_file());
    assert!(dir.path().join("tins-alpha.pub").is_file());
    assert_eq!(outcome.identity.full_name, "tins-alpha");
    assert!(!outcome.generated_name);
    assert_eq!(outcome.readiness, Readiness::Skipped);

    let instances = cloud.instances();
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].name, "tins-alpha");
    assert_eq!(
        instances[0].metadata.get(MANAGED_METADATA_KEY).map(String::as_str),
        Some(MANAGED_METADATA_VALUE)
    );
    assert_eq!(cloud.keypair_names(), vec!["tins-alpha".to_string()]);
    assert_eq!(outcome.identity.provider_id.as_deref(), Some(instances[0].id.as_str()));
}

#[tokio::test]
async fn test_create_request_carries_resolved_ids_and_startup_script() {
    let cloud = FakeCloud::new();
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    create_instance(&cloud, &keys, opts(&reporter, Some("beta")))
        .await
        .expect("create");

    let requests = cloud.requests();
    let request = requests.first().expect("one request");
    assert_eq!(request.image_id, "image-ubuntu-24.04");
    assert_eq!(request.flavor_id, "flavor-m1.small");
    assert_eq!(request.network_id, "net-private");
    assert_eq!(request.availability_zone, "nova");
    assert_eq!(request.key_name.as_deref(), Some("tins-beta"));
    assert!(request.user_data.starts_with("#!/bin/bash"));
    assert!(request.user_data.contains("ssh-rsa AAAAB3Nzabeta"));
}

#[tokio::test]
async fn test_create_without_name_generates_and_reports_one() {
    let cloud = FakeCloud::new();
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let outcome = create_instance(&cloud, &keys, opts(&reporter, None))
        .await
        .expect("create");

    assert!(outcome.generated_name);
    let (adjective, noun) = outcome
        .identity
        .short_name
        .split_once('-')
        .expect("two words");
    assert!(!adjective.is_empty() && !noun.is_empty());
    assert!(reporter.has_step_containing("generated instance name"));
}

#[tokio::test]
async fn test_create_treats_empty_name_as_absent() {
    let cloud = FakeCloud::new();
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let outcome = create_instance(&cloud, &keys, opts(&reporter, Some("")))
        .await
        .expect("create");
    assert!(outcome.generated_name);
}

#[tokio::test]
async fn test_create_failure_after_keygen_rolls_back_keys_and_keypair() {
    let cloud = FakeCloud::new().failing(|f| f.create_instance = true);
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let err = create_instance(&cloud, &keys, opts(&reporter, Some("gamma")))
        .await
        .expect_err("must fail");

    assert!(format!("{err:#}").contains("failed to create instance"));
    assert_eq!(keys.count(), 0, "local keys must be removed");
    assert!(cloud.keypair_names().is_empty(), "keypair must be retracted");
    assert!(cloud.instances().is_empty());
}

#[tokio::test]
async fn test_create_missing_image_rolls_back_and_surfaces_typed_error() {
    let cloud = FakeCloud::new().failing(|f| f.missing_image = true);
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let err = create_instance(&cloud, &keys, opts(&reporter, Some("delta")))
        .await
        .expect_err("must fail");

    let typed = err
        .chain()
        .find_map(|c| c.downcast_ref::<ProviderError>())
        .expect("provider error in chain");
    assert!(matches!(
        typed,
        ProviderError::ResourceNotFound {
            kind: ResourceKind::Image,
            ..
        }
    ));
    assert_eq!(keys.count(), 0);
    assert!(cloud.keypair_names().is_empty());
    assert!(cloud.requests().is_empty());
}

#[tokio::test]
async fn test_keypair_registration_failure_removes_local_keys() {
    let cloud = FakeCloud::new().failing(|f| f.create_keypair = true);
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let err = create_instance(&cloud, &keys, opts(&reporter, Some("eps")))
        .await
        .expect_err("must fail");

    assert!(format!("{err:#}").contains("failed to register keypair"));
    assert_eq!(keys.count(), 0);
    assert!(
        !cloud.calls().iter().any(|c| c.starts_with("create_instance")),
        "no instance may be created without a keypair"
    );
}

#[tokio::test]
async fn test_key_generation_failure_touches_nothing_remote() {
    let cloud = FakeCloud::new();
    let keys = MemKeyStore::failing_generate();
    let reporter = RecordingReporter::new();

    let err = create_instance(&cloud, &keys, opts(&reporter, Some("zeta")))
        .await
        .expect_err("must fail");

    assert!(format!("{err:#}").contains("failed to generate SSH key"));
    assert!(cloud.calls().is_empty());
}

#[tokio::test]
async fn test_existing_key_aborts_before_remote_calls_and_is_kept() {
    let cloud = FakeCloud::new().failing(|f| f.create_keypair = true);
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = FsKeyStore::with_dir(dir.path().to_path_buf());
    let existing = keys
        .generate(&InstanceIdentity::from_short_name("alpha"))
        .expect("seed key");
    let before = std::fs::read_to_string(&existing.private_key_path).expect("read key");
    let reporter = RecordingReporter::new();

    let err = create_instance(&cloud, &keys, opts(&reporter, Some("alpha")))
        .await
        .expect_err("must refuse to reuse the name");

    assert!(matches!(
        err.downcast_ref::<KeyError>(),
        Some(KeyError::AlreadyExists(_))
    ));
    assert!(cloud.calls().is_empty(), "nothing remote may be touched");
    let after = std::fs::read_to_string(&existing.private_key_path).expect("key still present");
    assert_eq!(before, after);
    assert!(existing.public_key_path.exists());
}

#[tokio::test]
async fn test_rollback_failures_are_reported_not_raised_over_primary_error() {
    let cloud = FakeCloud::new().failing(|f| {
        f.create_instance = true;
        f.delete_keypair = true;
    });
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let err = create_instance(&cloud, &keys, opts(&reporter, Some("eta")))
        .await
        .expect_err("must fail");

    assert!(format!("{err:#}").contains("quota exceeded"));
    assert!(
        reporter
            .warnings()
            .iter()
            .any(|w| w.contains("failed to delete keypair tins-eta"))
    );
    assert_eq!(keys.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_create_waits_until_active_and_refetches() {
    let cloud = FakeCloud::new();
    cloud.script_statuses([InstanceStatus::Build, InstanceStatus::Active]);
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let outcome = create_instance(
        &cloud,
        &keys,
        CreateOptions {
            wait: Some(fast_wait(Duration::from_secs(60), CancellationToken::new())),
            ..opts(&reporter, Some("theta"))
        },
    )
    .await
    .expect("create");

    assert_eq!(outcome.readiness, Readiness::Active);
    let current = outcome.current.expect("re-fetched");
    assert_eq!(current.status, InstanceStatus::Active);
}

#[tokio::test(start_paused = true)]
async fn test_error_state_is_a_warning_not_a_failure() {
    let cloud = FakeCloud::new();
    cloud.script_statuses([InstanceStatus::Error]);
    let keys = MemKeyStore::new();
    let reporter = RecordingReporter::new();

    let outcome = create_instance(
        &cloud,
        &keys,
        CreateOptions {
            wait: Some(fast_wait(Duration::from_secs(60), CancellationToken::new())),
            ..opts(&reporter, Some("iota"))
        },
    )
    .await
    .expect("create still succeeds");

    assert_eq!(outcome.readiness, Readiness::Failed);
    assert!(reporter.warnings().iter().any(|w| w.contains("ERROR state")));
    assert!(keys.has("iota"), "keys stay for a created instance");
}

#[tokio::test(start_paused = true)]
async fn test_wait_times_out_when_never_active() {
    let cloud = FakeCloud::with_instances(vec![managed("i-1", "tins-slow")]);
    cloud.script_statuses([InstanceStatus::Build]);

    let readiness = wait_for_active(
        &cloud,
        "i-1",
        &fast_wait(Duration::from_secs(12), CancellationToken::new()),
    )
    .await;

    assert_eq!(readiness, Readiness::TimedOut);
    let polls = cloud
        .calls()
        .iter()
        .filter(|c| c.starts_with("get_instance"))
        .count();
    assert_eq!(polls, 2, "ticks at 5s and 10s before the 12s deadline");
}

#[tokio::test(start_paused = true)]
async fn test_wait_checks_status_on_tick_that_lands_on_deadline() {
    let cloud = FakeCloud::with_instances(vec![managed("i-1", "tins-edge")]);
    cloud.script_statuses([InstanceStatus::Build, InstanceStatus::Active]);

    let readiness = wait_for_active(
        &cloud,
        "i-1",
        &fast_wait(Duration::from_secs(10), CancellationToken::new()),
    )
    .await;

    assert_eq!(readiness, Readiness::Active);
}

#[tokio::test(start_paused = true)]
async fn test_wait_with_unrepresentable_timeout_polls_without_deadline() {
    let cloud = FakeCloud::with_instances(vec![managed("i-1", "tins-patient")]);
    cloud.script_statuses([InstanceStatus::Build, InstanceStatus::Active]);

    let readiness = wait_for_active(
        &cloud,
        "i-1",
        &fast_wait(Duration::from_secs(u64::MAX), CancellationToken::new()),
    )
    .await;

    assert_eq!(readiness, Readiness::Active);
}

#[tokio::test(start_paused = true)]
async fn test_wait_stops_when_cancelled() {
    let cloud = FakeCloud::with_instances(vec![managed("i-1", "tins-slow")]);
    cloud.script_statuses([InstanceStatus::Build]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let readiness =
        wait_for_active(&cloud, "i-1", &fast_wait(Duration::from_secs(300), cancel)).await;

    assert_eq!(readiness, Readiness::Cancelled);
    assert!(cloud.calls().is_empty(), "no poll after cancellation");
}

#[tokio::test(start_paused = true)]
async fn test_wait_reports_vanished_instance() {
    let cloud = FakeCloud::new();
    let readiness = wait_for_active(
        &cloud,
        "gone",
        &fast_wait(Duration::from_secs(60), CancellationToken::new()),
    )
    .await;
    assert!(matches!(readiness, Readiness::Unavailable(_)));
}

#[test]
fn test_mem_key_store_paths_follow_full_name() {
    let keys = MemKeyStore::new();
    let identity = InstanceIdentity::from_short_name("kappa");
    assert!(keys.path(&identity).ends_with("tins-kappa"));
}
