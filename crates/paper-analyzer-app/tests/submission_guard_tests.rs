//! Tests the submission guards: validation, single flight and selection lock.

mod common;

use common::{SpyService, controller, image};
use paper_analyzer_app::SubmissionError;
use paper_analyzer_ui::{VALIDATION_MESSAGE, ViewState};

#[tokio::test]
async fn submission_guard_tests_zero_files_never_call_the_service() {
    let service = SpyService::answering("# Result");
    let mut controller = controller(service.clone());

    assert!(controller.trigger_analyze().is_none());
    assert_eq!(
        controller.state(),
        &ViewState::Failed(VALIDATION_MESSAGE.to_string())
    );

    controller.analyze().await;
    assert_eq!(service.calls(), 0);
    assert_eq!(
        controller.view().error_banner.as_deref(),
        Some(VALIDATION_MESSAGE)
    );
}

#[tokio::test]
async fn submission_guard_tests_double_trigger_makes_one_call() {
    let service = SpyService::answering("# Result");
    let mut controller = controller(service.clone());
    controller
        .select_files(vec![image("a.png"), image("b.png")])
        .expect("selection should be accepted");

    let pending = controller
        .trigger_analyze()
        .expect("first trigger should start");
    assert!(controller.trigger_analyze().is_none());
    assert_eq!(controller.state(), &ViewState::Analyzing);

    let outcome = pending.run().await;
    controller
        .complete(outcome)
        .expect("completion should apply");

    assert_eq!(service.calls(), 1);
    assert_eq!(controller.state(), &ViewState::Done("# Result".to_string()));
}

#[tokio::test]
async fn submission_guard_tests_selection_is_locked_while_analyzing() {
    let service = SpyService::answering("ok");
    let mut controller = controller(service.clone());
    controller
        .select_files(vec![image("a.png")])
        .expect("selection should be accepted");

    let pending = controller
        .trigger_analyze()
        .expect("trigger should start");
    assert!(matches!(
        controller.select_files(vec![image("late.png")]),
        Err(SubmissionError::Busy)
    ));
    assert!(matches!(controller.remove_file(0), Err(SubmissionError::Busy)));
    assert_eq!(pending.file_count(), 1);

    let view = controller.view();
    assert!(!view.submit_enabled);
    assert!(view.loading_message.is_some());

    controller
        .complete(pending.run().await)
        .expect("completion should apply");
    assert_eq!(controller.store().len(), 1);
    assert_eq!(service.last_parts().len(), 1);
}

#[tokio::test]
async fn submission_guard_tests_rejected_files_leave_state_alone() {
    let service = SpyService::answering("ok");
    let mut controller = controller(service);

    let pdf = paper_analyzer_core::RawFile::from_bytes("paper.pdf", "application/pdf", vec![1_u8])
        .expect("fixture file should be valid");
    let report = controller
        .select_files(vec![pdf])
        .expect("selection call should succeed");

    assert_eq!(report.accepted, 0);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(controller.state(), &ViewState::Idle);
}
