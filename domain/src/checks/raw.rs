use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawCheck {
    Status(StatusCheck),
    Run(CheckRun),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StatusCheck {
    pub context: String,
    pub state: StatusState,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: CheckRunStatus,
    pub conclusion: Option<CheckRunConclusion>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Success,
    Pending,
    Failure,
    Error,
    Skipped,
    Neutral,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
    Waiting,
    Requested,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunConclusion {
    Success,
    Failure,
    Skipped,
    Neutral,
    Cancelled,
    TimedOut,
    ActionRequired,
    Stale,
    StartupFailure,
    #[serde(other)]
    Unknown,
}

impl RawCheck {
    pub fn status(context: impl Into<String>, state: StatusState) -> Self {
        Self::Status(StatusCheck {
            context: context.into(),
            state,
        })
    }

    pub fn run(
        name: impl Into<String>,
        status: CheckRunStatus,
        conclusion: Option<CheckRunConclusion>,
    ) -> Self {
        Self::Run(CheckRun {
            name: name.into(),
            status,
            conclusion,
        })
    }

    /// Display name of the check, `None` when the service sent a blank one.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            RawCheck::Status(status) => status.context.as_str(),
            RawCheck::Run(run) => run.name.as_str(),
        };

        if name.trim().is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

impl From<StatusCheck> for RawCheck {
    fn from(value: StatusCheck) -> Self {
        Self::Status(value)
    }
}

impl From<CheckRun> for RawCheck {
    fn from(value: CheckRun) -> Self {
        Self::Run(value)
    }
}
