//! Domain models for the Caseflow server.

pub mod execution;
pub mod generated;

// Re-export commonly used types
pub use execution::{
    CaseVerdict, ExecStatus, RerunType, StartAction, StartDecision, StepResult, carries_forward,
    resolve_start, run_verdict, suite_rollup,
};
pub use generated::{GeneratedBatch, GeneratedStep, GeneratedTestCase};
