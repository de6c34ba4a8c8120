#![allow(clippy::unwrap_used, clippy::expect_used)]

use kubevc_core::errors::{ExError, ExErrorKind};
use kubevc_core::logging_facility::test_capture::init_test_capture;
use kubevc_core::render::RenderFailure;
use kubevc_core::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use kubevc_core::{log_op_end, log_op_error, log_op_start};
use std::time::Duration;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, repository = "infra");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("repository"), Some("infra"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::NotFound).with_entity_id("infra/c1/metadata.json");
    log_op_error!(op_name, err, duration_ms = 10);

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let events = capture.events_for_op(op_name);
    assert_eq!(events[0].field("err.code"), Some("ERR_NOT_FOUND"));
    // the error value is still usable after logging
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_log_op_error_accepts_render_failure() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_render_unique_4";

    let failure = RenderFailure::Timeout(Duration::from_secs(60));
    log_op_error!(op_name, failure, duration_ms = 60_000);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("err.code"), Some("ERR_TIMEOUT"));
}
