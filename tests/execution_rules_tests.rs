//! Integration tests for the execution-state rules: rerun carry-over,
//! verdict precedence, status rollup, and start-test resolution.

use caseflow_lib::models::{
    CaseVerdict, ExecStatus, RerunType, StartAction, StartDecision, carries_forward,
    resolve_start, run_verdict, suite_rollup,
};
use uuid::Uuid;

/// The verdicts recorded in a prior run, keyed by test case.
fn prior_run() -> Vec<(&'static str, CaseVerdict)> {
    vec![
        ("TC-A", CaseVerdict::Pass),
        ("TC-B", CaseVerdict::Fail),
        ("TC-C", CaseVerdict::Block),
        ("TC-D", CaseVerdict::Skip),
    ]
}

#[test]
fn rerun_failed_carries_exactly_pass_and_skip() {
    let carried: Vec<&str> = prior_run()
        .into_iter()
        .filter(|(_, verdict)| carries_forward(RerunType::Failed, *verdict))
        .map(|(id, _)| id)
        .collect();

    assert_eq!(carried, vec!["TC-A", "TC-D"]);
}

#[test]
fn rerun_all_starts_empty() {
    let carried: Vec<&str> = prior_run()
        .into_iter()
        .filter(|(_, verdict)| carries_forward(RerunType::All, *verdict))
        .map(|(id, _)| id)
        .collect();

    assert!(carried.is_empty());
}

#[test]
fn completion_precedence_matches_contract() {
    use CaseVerdict::*;

    assert_eq!(run_verdict([Pass, Pass, Skip]), ExecStatus::Pass);
    assert_eq!(run_verdict([Pass, Block]), ExecStatus::Block);
    assert_eq!(run_verdict([Fail, Block]), ExecStatus::Fail);
}

#[test]
fn item_status_follows_completed_run_into_suite_rollup() {
    // Two items: one just completed with a failure, one previously passing.
    let completed = run_verdict([CaseVerdict::Pass, CaseVerdict::Fail]);
    assert_eq!(completed, ExecStatus::Fail);

    let suite = suite_rollup(&[completed, ExecStatus::Pass]);
    assert_eq!(suite, ExecStatus::Fail);
}

#[test]
fn suite_rollup_prefers_block_then_in_progress_over_pass() {
    let suite = suite_rollup(&[ExecStatus::Pass, ExecStatus::Block, ExecStatus::InProgress]);
    assert_eq!(suite, ExecStatus::Block);

    let suite = suite_rollup(&[ExecStatus::Pass, ExecStatus::InProgress]);
    assert_eq!(suite, ExecStatus::InProgress);
}

#[test]
fn start_test_needs_decision_until_one_is_made() {
    let open = Uuid::now_v7();

    // First request from a tab that does not know about the open run.
    assert_eq!(
        resolve_start(Some(open), None),
        StartAction::NeedsDecision(open)
    );

    // The client presents the choice; resume continues the same run.
    assert_eq!(
        resolve_start(Some(open), Some(StartDecision::Resume)),
        StartAction::Resume(open)
    );

    // Or the run is discarded and a fresh one created.
    assert_eq!(
        resolve_start(Some(open), Some(StartDecision::Discard)),
        StartAction::DiscardAndCreate(open)
    );

    // With nothing open, starting is unconditional.
    assert_eq!(resolve_start(None, None), StartAction::Create);
}

#[test]
fn rerun_cycle_converges_to_pass() {
    // Run 1: two failures among four cases.
    let run1 = [
        CaseVerdict::Pass,
        CaseVerdict::Fail,
        CaseVerdict::Block,
        CaseVerdict::Skip,
    ];
    assert_eq!(run_verdict(run1), ExecStatus::Fail);

    // Rerun (failed-only): Pass and Skip carry, the tester re-records the
    // other two as passing.
    let carried = run1
        .into_iter()
        .filter(|v| carries_forward(RerunType::Failed, *v));
    let run2: Vec<CaseVerdict> = carried
        .chain([CaseVerdict::Pass, CaseVerdict::Pass])
        .collect();

    assert_eq!(run2.len(), 4);
    assert_eq!(run_verdict(run2), ExecStatus::Pass);
}
