//! Execution-state domain types and the pure decision logic behind run
//! finalization, status rollup, rerun carry-over, and start-test resolution.
//!
//! Everything here is independent of transport and storage so the rules can
//! be tested without a database; the `db` layer applies these decisions
//! inside its transactions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Outcome recorded for a single test case within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CaseVerdict {
    Pass,
    Fail,
    Block,
    Skip,
}

impl CaseVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::Block => "Block",
            Self::Skip => "Skip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pass" => Some(Self::Pass),
            "Fail" => Some(Self::Fail),
            "Block" => Some(Self::Block),
            "Skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

impl std::fmt::Display for CaseVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a run, item, or suite.
///
/// `NotStarted` never appears on a run; a run is created `InProgress` and
/// finalized to one of the terminal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ExecStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    Pass,
    Fail,
    Block,
}

impl ExecStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::Block => "Block",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not Started" => Some(Self::NotStarted),
            "In Progress" => Some(Self::InProgress),
            "Pass" => Some(Self::Pass),
            "Fail" => Some(Self::Fail),
            "Block" => Some(Self::Block),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExecStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a rerun treats outcomes recorded in the immediately preceding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RerunType {
    /// Retest everything; nothing is carried forward.
    All,
    /// Carry forward passing/skipped outcomes; retest failures and blocks.
    Failed,
}

impl RerunType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Per-step outcome stored inside a result's `step_results` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StepResult {
    pub step_number: i32,
    pub result: CaseVerdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Final status of a run derived from its recorded verdicts.
///
/// Fail dominates Block dominates Pass; Skip is neutral. A run with no
/// recorded results finalizes to Pass.
pub fn run_verdict<I>(results: I) -> ExecStatus
where
    I: IntoIterator<Item = CaseVerdict>,
{
    let mut verdict = ExecStatus::Pass;
    for result in results {
        match result {
            CaseVerdict::Fail => return ExecStatus::Fail,
            CaseVerdict::Block => verdict = ExecStatus::Block,
            CaseVerdict::Pass | CaseVerdict::Skip => {}
        }
    }
    verdict
}

/// Rollup of a suite's status from its items' statuses.
///
/// Precedence: Fail > Block > In Progress > Pass. An empty suite, or one
/// whose items have all never been run, stays Not Started.
pub fn suite_rollup(statuses: &[ExecStatus]) -> ExecStatus {
    if statuses.is_empty() || statuses.iter().all(|s| *s == ExecStatus::NotStarted) {
        return ExecStatus::NotStarted;
    }
    if statuses.contains(&ExecStatus::Fail) {
        ExecStatus::Fail
    } else if statuses.contains(&ExecStatus::Block) {
        ExecStatus::Block
    } else if statuses.contains(&ExecStatus::InProgress) {
        ExecStatus::InProgress
    } else {
        ExecStatus::Pass
    }
}

/// Whether a prior outcome is carried into the new run under `rerun`.
///
/// Carrying preserves already-good outcomes so the tester only re-records
/// what previously failed or blocked.
pub fn carries_forward(rerun: RerunType, prior: CaseVerdict) -> bool {
    match rerun {
        RerunType::All => false,
        RerunType::Failed => matches!(prior, CaseVerdict::Pass | CaseVerdict::Skip),
    }
}

/// Caller's choice when a start-test request finds an open run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StartDecision {
    /// Keep recording results against the existing open run.
    Resume,
    /// Delete the open run (and its results) and start fresh.
    Discard,
}

impl StartDecision {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resume" => Some(Self::Resume),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

/// Resolution of a start-test request against the item's open run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAction {
    /// No open run: create a new one.
    Create,
    /// Continue the identified open run; nothing is created.
    Resume(Uuid),
    /// Delete the identified open run, then create a fresh one.
    DiscardAndCreate(Uuid),
    /// An open run exists and no decision was supplied; the caller must
    /// choose resume or discard.
    NeedsDecision(Uuid),
}

/// Resolve a start-test request.
///
/// Detection does not assume at most one open run; the caller passes
/// whichever open run it selected.
pub fn resolve_start(open_run: Option<Uuid>, decision: Option<StartDecision>) -> StartAction {
    match (open_run, decision) {
        (None, _) => StartAction::Create,
        (Some(id), Some(StartDecision::Resume)) => StartAction::Resume(id),
        (Some(id), Some(StartDecision::Discard)) => StartAction::DiscardAndCreate(id),
        (Some(id), None) => StartAction::NeedsDecision(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_verdict_all_pass_with_skip() {
        let verdict = run_verdict([CaseVerdict::Pass, CaseVerdict::Pass, CaseVerdict::Skip]);
        assert_eq!(verdict, ExecStatus::Pass);
    }

    #[test]
    fn test_run_verdict_block_dominates_pass() {
        let verdict = run_verdict([CaseVerdict::Pass, CaseVerdict::Block]);
        assert_eq!(verdict, ExecStatus::Block);
    }

    #[test]
    fn test_run_verdict_fail_dominates_block() {
        let verdict = run_verdict([CaseVerdict::Fail, CaseVerdict::Block]);
        assert_eq!(verdict, ExecStatus::Fail);

        // Order must not matter.
        let verdict = run_verdict([CaseVerdict::Block, CaseVerdict::Fail]);
        assert_eq!(verdict, ExecStatus::Fail);
    }

    #[test]
    fn test_run_verdict_skip_is_neutral() {
        assert_eq!(run_verdict([CaseVerdict::Skip]), ExecStatus::Pass);
        assert_eq!(
            run_verdict([CaseVerdict::Skip, CaseVerdict::Block]),
            ExecStatus::Block
        );
    }

    #[test]
    fn test_run_verdict_empty_is_pass() {
        assert_eq!(run_verdict([]), ExecStatus::Pass);
    }

    #[test]
    fn test_suite_rollup_precedence() {
        use ExecStatus::*;

        assert_eq!(suite_rollup(&[Pass, Fail, Block, InProgress]), Fail);
        assert_eq!(suite_rollup(&[Pass, Block, InProgress]), Block);
        assert_eq!(suite_rollup(&[Pass, InProgress]), InProgress);
        assert_eq!(suite_rollup(&[Pass, Pass]), Pass);
    }

    #[test]
    fn test_suite_rollup_empty_is_not_started() {
        assert_eq!(suite_rollup(&[]), ExecStatus::NotStarted);
    }

    #[test]
    fn test_suite_rollup_all_not_started() {
        use ExecStatus::*;

        assert_eq!(suite_rollup(&[NotStarted, NotStarted]), NotStarted);
        // One completed item is enough to leave Not Started.
        assert_eq!(suite_rollup(&[NotStarted, Pass]), Pass);
    }

    #[test]
    fn test_carry_forward_failed_keeps_pass_and_skip() {
        assert!(carries_forward(RerunType::Failed, CaseVerdict::Pass));
        assert!(carries_forward(RerunType::Failed, CaseVerdict::Skip));
        assert!(!carries_forward(RerunType::Failed, CaseVerdict::Fail));
        assert!(!carries_forward(RerunType::Failed, CaseVerdict::Block));
    }

    #[test]
    fn test_carry_forward_all_keeps_nothing() {
        for verdict in [
            CaseVerdict::Pass,
            CaseVerdict::Fail,
            CaseVerdict::Block,
            CaseVerdict::Skip,
        ] {
            assert!(!carries_forward(RerunType::All, verdict));
        }
    }

    #[test]
    fn test_resolve_start_without_open_run() {
        assert_eq!(resolve_start(None, None), StartAction::Create);
        // A stale decision with no open run still just creates.
        assert_eq!(
            resolve_start(None, Some(StartDecision::Resume)),
            StartAction::Create
        );
    }

    #[test]
    fn test_resolve_start_with_open_run() {
        let id = Uuid::now_v7();

        assert_eq!(
            resolve_start(Some(id), Some(StartDecision::Resume)),
            StartAction::Resume(id)
        );
        assert_eq!(
            resolve_start(Some(id), Some(StartDecision::Discard)),
            StartAction::DiscardAndCreate(id)
        );
        assert_eq!(resolve_start(Some(id), None), StartAction::NeedsDecision(id));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ExecStatus::NotStarted,
            ExecStatus::InProgress,
            ExecStatus::Pass,
            ExecStatus::Fail,
            ExecStatus::Block,
        ] {
            assert_eq!(ExecStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ExecStatus::parse("Unknown"), None);
    }

    #[test]
    fn test_verdict_round_trip() {
        for verdict in [
            CaseVerdict::Pass,
            CaseVerdict::Fail,
            CaseVerdict::Block,
            CaseVerdict::Skip,
        ] {
            assert_eq!(CaseVerdict::parse(verdict.as_str()), Some(verdict));
        }
        assert_eq!(CaseVerdict::parse("pass"), None);
    }

    #[test]
    fn test_rerun_type_serde_values() {
        assert_eq!(
            serde_json::from_str::<RerunType>("\"all\"").unwrap(),
            RerunType::All
        );
        assert_eq!(
            serde_json::from_str::<RerunType>("\"failed\"").unwrap(),
            RerunType::Failed
        );
        assert!(serde_json::from_str::<RerunType>("\"ALL\"").is_err());
    }

    #[test]
    fn test_exec_status_serde_uses_display_strings() {
        assert_eq!(
            serde_json::to_string(&ExecStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(
            serde_json::from_str::<ExecStatus>("\"Not Started\"").unwrap(),
            ExecStatus::NotStarted
        );
    }
}
