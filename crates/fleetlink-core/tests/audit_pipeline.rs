//! End-to-end tests for the audit pipeline: adapter routing, filtering,
//! batching/flush policy and cross-stream ordering, observed from the
//! coordinator's side via the in-memory fake.

use std::sync::Arc;
use std::time::Duration;

use fleetlink_core::fakes::MemoryCoordinator;
use fleetlink_core::{
    AuditForwarder, AuditId, AuditLogger, ContentKind, Coordinator, EventCategory, Severity,
};

/// Coalescing window used by these tests; long enough to append into, short
/// enough to wait out.
const TEST_DELAY: Duration = Duration::from_millis(40);

fn make_forwarder(coordinator: &Arc<MemoryCoordinator>) -> Arc<AuditForwarder> {
    Arc::new(AuditForwarder::with_max_delay(
        AuditId::new(),
        Arc::clone(coordinator) as Arc<dyn Coordinator>,
        TEST_DELAY,
    ))
}

fn make_pipeline() -> (Arc<MemoryCoordinator>, AuditLogger) {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let logger = AuditLogger::new(make_forwarder(&coordinator));
    (coordinator, logger)
}

/// Give the dispatcher task time to drain the delivery queue.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

/// Wait out the coalescing window plus dispatcher slack.
async fn wait_for_flush() {
    tokio::time::sleep(TEST_DELAY + Duration::from_millis(60)).await;
}

#[tokio::test]
async fn below_level_calls_produce_nothing() {
    let (coordinator, mut logger) = make_pipeline();
    logger.set_level(Severity::Warn);

    assert!(logger.add(Severity::Debug, Some("x"), None));
    assert!(logger.add(Severity::Info, Some("ignored"), None));

    wait_for_flush().await;
    assert!(coordinator.pushes().is_empty());
}

#[tokio::test]
async fn filtered_error_is_fully_suppressed() {
    let (coordinator, mut logger) = make_pipeline();
    // Filtering applies regardless of how low the minimum level is set.
    logger.set_level(Severity::Debug);

    let noise = "recipe::install (step.rb line 3) had an error:\n\
                 Unexpected exit code from action.";
    assert!(logger.add(Severity::Error, Some(noise), None));

    wait_for_flush().await;
    assert!(coordinator.pushes().is_empty());
}

#[tokio::test]
async fn rapid_output_coalesces_into_one_push() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let forwarder = make_forwarder(&coordinator);

    forwarder.append_output("one ");
    forwarder.append_output("two ");
    forwarder.append_output("three");

    wait_for_flush().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].kind, ContentKind::Output);
    assert_eq!(pushes[0].text, "one two three");
}

#[tokio::test]
async fn spaced_output_gets_separate_pushes() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let forwarder = make_forwarder(&coordinator);

    forwarder.append_output("first");
    wait_for_flush().await;
    forwarder.append_output("second");
    wait_for_flush().await;

    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0].text, "first");
    assert_eq!(pushes[1].text, "second");
}

#[tokio::test]
async fn error_flushes_pending_output_and_follows_it() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let forwarder = make_forwarder(&coordinator);

    forwarder.append_output("A");
    forwarder.append_error("B", None);

    settle().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0].kind, ContentKind::Output);
    assert_eq!(pushes[0].text, "A");
    assert_eq!(pushes[1].kind, ContentKind::Error);
    assert_eq!(pushes[1].text, "B");
}

#[tokio::test]
async fn forced_flush_is_not_doubled_by_the_timer() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let forwarder = make_forwarder(&coordinator);

    forwarder.append_output("once");
    forwarder.flush();

    // Wait past the scheduled flush; the epoch guard must notice the batch
    // is already gone.
    wait_for_flush().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].text, "once");
}

#[tokio::test]
async fn section_status_and_info_are_immediate_and_ordered() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let forwarder = make_forwarder(&coordinator);

    forwarder.append_output("script output");
    forwarder.append_section("Running script 'configure'", None);
    forwarder.update_status("configuring");
    forwarder.append_info("note");

    settle().await;
    let kinds: Vec<ContentKind> = coordinator.pushes().iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ContentKind::Output,
            ContentKind::Section,
            ContentKind::Status,
            ContentKind::Info,
        ]
    );
}

#[tokio::test]
async fn warn_is_formatted_and_forwarded_as_output() {
    let (coordinator, mut logger) = make_pipeline();
    logger.set_level(Severity::Warn);

    assert!(logger.add(Severity::Debug, Some("x"), None));
    assert!(logger.add(Severity::Warn, Some("y"), None));

    wait_for_flush().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].kind, ContentKind::Output);

    let line = regex::Regex::new(r"^\[W\] \d{2}:\d{2}:\d{2}: y\n$").unwrap();
    assert!(line.is_match(&pushes[0].text), "got: {:?}", pushes[0].text);
}

#[tokio::test]
async fn unknown_severity_travels_with_output() {
    let (coordinator, logger) = make_pipeline();

    assert!(logger.add(Severity::Unknown, Some("unclassified"), None));

    wait_for_flush().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].kind, ContentKind::Output);
    assert!(pushes[0].text.starts_with("[U] "));
}

#[tokio::test]
async fn error_and_fatal_are_never_batched() {
    let (coordinator, logger) = make_pipeline();

    logger.error("went wrong");
    logger.fatal("went very wrong");

    settle().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0].kind, ContentKind::Error);
    assert_eq!(pushes[0].category, None);
    assert_eq!(pushes[1].kind, ContentKind::Error);
    assert_eq!(pushes[1].category, Some(EventCategory::Error));
}

#[tokio::test]
async fn append_raw_bypasses_format_and_level() {
    let (coordinator, mut logger) = make_pipeline();
    // Even with everything below Fatal suppressed, raw appends go through.
    logger.set_level(Severity::Fatal);

    logger.append_raw("chunk of raw script output");
    logger.forwarder().flush();

    settle().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].text, "chunk of raw script output");
}

#[tokio::test]
async fn message_resolution_falls_back_to_tag() {
    let (coordinator, logger) = make_pipeline();

    assert!(logger.add(Severity::Info, None, Some("tag-as-message")));
    logger.forwarder().flush();

    settle().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert!(pushes[0].text.contains("tag-as-message"));
}

#[tokio::test]
async fn lazy_message_is_not_built_below_level() {
    let (coordinator, mut logger) = make_pipeline();
    logger.set_level(Severity::Error);

    let mut built = false;
    logger.add_with(Severity::Debug, None, || {
        built = true;
        "expensive".to_string()
    });
    assert!(!built);

    logger.add_with(Severity::Error, None, || "cheap".to_string());
    settle().await;
    assert_eq!(coordinator.pushes().len(), 1);
}

#[tokio::test]
async fn failed_pushes_are_dropped_without_retry() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let forwarder = make_forwarder(&coordinator);

    coordinator.set_fail_pushes(true);
    forwarder.append_error("lost", None);
    settle().await;

    // Delivery failed and nothing was recorded; later pushes still flow.
    coordinator.set_fail_pushes(false);
    forwarder.append_error("kept", None);
    settle().await;

    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].text, "kept");
}

#[tokio::test]
async fn adapters_on_different_streams_do_not_share_batches() {
    let coordinator = Arc::new(MemoryCoordinator::new());
    let first = make_forwarder(&coordinator);
    let second = make_forwarder(&coordinator);

    first.append_output("from first");
    second.append_output("from second");
    first.flush();
    second.flush();

    settle().await;
    let pushes = coordinator.pushes();
    assert_eq!(pushes.len(), 2);
    assert_ne!(pushes[0].audit_id, pushes[1].audit_id);
}
