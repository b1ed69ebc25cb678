use std::fmt::Display;

use super::classification::{Classification, NormalizedCheck};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    pub has_checks: bool,
    pub all_completed: bool,
    pub all_passed: bool,
    pub pending: Vec<String>,
    pub failed: Vec<String>,
    pub passed: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerdictState {
    NoChecks,
    Pending,
    Failed,
    AllPassed,
}

impl Verdict {
    pub fn aggregate<I>(checks: I) -> Self
    where
        I: IntoIterator<Item = NormalizedCheck>,
    {
        let mut verdict = Verdict::default();

        for check in checks {
            verdict.has_checks = true;
            match check.classification {
                Classification::Pending => verdict.pending.push(check.name),
                Classification::Failed => verdict.failed.push(check.name),
                Classification::Passed => verdict.passed.push(check.name),
            }
        }

        verdict.all_completed = verdict.pending.is_empty();
        verdict.all_passed =
            verdict.all_completed && verdict.failed.is_empty() && !verdict.passed.is_empty();

        verdict
    }

    /// Pending wins over failed: failures do not end the wait while other
    /// checks are still running.
    pub fn state(&self) -> VerdictState {
        if !self.has_checks {
            VerdictState::NoChecks
        } else if !self.all_completed {
            VerdictState::Pending
        } else if self.all_passed {
            VerdictState::AllPassed
        } else {
            VerdictState::Failed
        }
    }
}

impl Display for VerdictState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            VerdictState::NoChecks => "no checks found",
            VerdictState::Pending => "pending",
            VerdictState::Failed => "failed",
            VerdictState::AllPassed => "all passed",
        };

        f.write_str(value)
    }
}
