use std::fmt::Display;

use super::raw::{CheckRun, CheckRunConclusion, CheckRunStatus, RawCheck, StatusCheck, StatusState};

pub const UNNAMED_CHECK: &str = "<unnamed>";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Pending,
    Passed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedCheck {
    pub name: String,
    pub classification: Classification,
}

impl Classification {
    pub fn is_completed(&self) -> bool {
        match &self {
            Classification::Pending => false,
            Classification::Failed | Classification::Passed => true,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Classification::Pending => "pending",
            Classification::Passed => "passed",
            Classification::Failed => "failed",
        };

        f.write_str(value)
    }
}

impl CheckRun {
    pub fn classify(&self) -> Classification {
        if self.status != CheckRunStatus::Completed {
            return Classification::Pending;
        }

        match self.conclusion {
            None => Classification::Pending,
            Some(
                CheckRunConclusion::Success
                | CheckRunConclusion::Skipped
                | CheckRunConclusion::Neutral,
            ) => Classification::Passed,
            Some(_) => Classification::Failed,
        }
    }
}

impl StatusCheck {
    pub fn classify(&self) -> Classification {
        match self.state {
            StatusState::Success | StatusState::Skipped | StatusState::Neutral => {
                Classification::Passed
            }
            StatusState::Pending => Classification::Pending,
            StatusState::Failure | StatusState::Error | StatusState::Unknown => {
                Classification::Failed
            }
        }
    }
}

impl RawCheck {
    pub fn classify(&self) -> Classification {
        match self {
            RawCheck::Status(status) => status.classify(),
            RawCheck::Run(run) => run.classify(),
        }
    }

    pub fn normalize(&self) -> NormalizedCheck {
        match self.name() {
            Some(name) => NormalizedCheck {
                name: name.to_owned(),
                classification: self.classify(),
            },
            None => NormalizedCheck {
                name: UNNAMED_CHECK.to_owned(),
                classification: Classification::Failed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(status: CheckRunStatus, conclusion: Option<CheckRunConclusion>) -> Classification {
        RawCheck::run("build", status, conclusion).classify()
    }

    fn status(state: StatusState) -> Classification {
        RawCheck::status("ci/build", state).classify()
    }

    #[test]
    fn check_run_should_be_pending_until_completed() {
        for check_status in [
            CheckRunStatus::Queued,
            CheckRunStatus::InProgress,
            CheckRunStatus::Waiting,
            CheckRunStatus::Requested,
            CheckRunStatus::Pending,
            CheckRunStatus::Unknown,
        ] {
            assert_eq!(
                run(check_status, Some(CheckRunConclusion::Success)),
                Classification::Pending
            );
        }
    }

    #[test]
    fn completed_check_run_without_conclusion_should_be_pending() {
        assert_eq!(run(CheckRunStatus::Completed, None), Classification::Pending);
    }

    #[test]
    fn completed_check_run_should_pass_on_success_skipped_and_neutral() {
        for conclusion in [
            CheckRunConclusion::Success,
            CheckRunConclusion::Skipped,
            CheckRunConclusion::Neutral,
        ] {
            assert_eq!(
                run(CheckRunStatus::Completed, Some(conclusion)),
                Classification::Passed
            );
        }
    }

    #[test]
    fn completed_check_run_should_fail_on_any_other_conclusion() {
        for conclusion in [
            CheckRunConclusion::Failure,
            CheckRunConclusion::Cancelled,
            CheckRunConclusion::TimedOut,
            CheckRunConclusion::ActionRequired,
            CheckRunConclusion::Stale,
            CheckRunConclusion::StartupFailure,
            CheckRunConclusion::Unknown,
        ] {
            assert_eq!(
                run(CheckRunStatus::Completed, Some(conclusion)),
                Classification::Failed
            );
        }
    }

    #[test]
    fn status_check_should_classify_state_directly() {
        assert_eq!(status(StatusState::Success), Classification::Passed);
        assert_eq!(status(StatusState::Skipped), Classification::Passed);
        assert_eq!(status(StatusState::Neutral), Classification::Passed);
        assert_eq!(status(StatusState::Pending), Classification::Pending);
        assert_eq!(status(StatusState::Failure), Classification::Failed);
        assert_eq!(status(StatusState::Error), Classification::Failed);
        assert_eq!(status(StatusState::Unknown), Classification::Failed);
    }

    #[test]
    fn normalize_should_keep_name_and_classification() {
        let check = RawCheck::run(
            "build",
            CheckRunStatus::Completed,
            Some(CheckRunConclusion::Success),
        );

        assert_eq!(
            check.normalize(),
            NormalizedCheck {
                name: "build".to_owned(),
                classification: Classification::Passed
            }
        );
    }

    #[test]
    fn normalize_should_fail_unnamed_checks() {
        let check = RawCheck::status("", StatusState::Success);

        assert_eq!(
            check.normalize(),
            NormalizedCheck {
                name: UNNAMED_CHECK.to_owned(),
                classification: Classification::Failed
            }
        );
    }

    #[test]
    fn is_completed_should_be_false_only_for_pending() {
        assert!(!Classification::Pending.is_completed());
        assert!(Classification::Passed.is_completed());
        assert!(Classification::Failed.is_completed());
    }
}
