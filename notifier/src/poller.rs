use std::time::Duration;

use domain::{ExclusionFilter, PullRequest, VerdictState};
use itertools::Itertools;
use source_control::SourceControlRepository;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::{
    config::PollingConfig,
    evaluation::evaluate_checks,
    gate::MergeGate,
    notification::{Delivery, NotificationLedger, NotifyError},
    status_comment::StatusComment,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    Lenient,
    Strict,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome {
    Notified,
    Failed(Vec<String>),
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("Failed to notify pull request #{pr}: {source}")]
    Notification {
        pr: u64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

enum Step {
    Waiting,
    Notified,
    Failed(Vec<String>),
}

pub struct PollDriver<'a, R> {
    repository: &'a R,
    pull_request: &'a PullRequest,
    message: String,
    exclusions: ExclusionFilter,
    settings: PollingConfig,
    gate: MergeGate,
    ledger: NotificationLedger,
    status_comment: Option<StatusComment>,
    polls: usize,
}

impl<'a, R> PollDriver<'a, R>
where
    R: SourceControlRepository,
{
    pub fn new(
        repository: &'a R,
        pull_request: &'a PullRequest,
        message: String,
        exclusions: ExclusionFilter,
        settings: PollingConfig,
    ) -> Self {
        Self {
            repository,
            pull_request,
            message,
            exclusions,
            settings,
            gate: MergeGate::new(true),
            ledger: NotificationLedger::new(),
            status_comment: None,
            polls: 0,
        }
    }

    pub fn with_gate(mut self, gate: MergeGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_status_comment(mut self, enabled: bool) -> Self {
        self.status_comment = enabled.then(StatusComment::new);
        self
    }

    pub async fn run(&mut self) -> Result<PollOutcome, PollError> {
        let started = Instant::now();
        let pr = self.pull_request.number;

        info!(
            pr,
            interval_secs = self.settings.interval.as_secs(),
            timeout_secs = self.settings.timeout.as_secs(),
            "Polling checks"
        );

        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.settings.timeout {
                warn!(
                    pr,
                    elapsed_secs = elapsed.as_secs(),
                    polls = self.polls,
                    "Timed out waiting for checks"
                );
                return Ok(PollOutcome::TimedOut(elapsed));
            }

            match self.poll_once().await? {
                Step::Notified => return Ok(PollOutcome::Notified),
                Step::Failed(failed) if self.settings.failure_policy == FailurePolicy::Strict => {
                    return Ok(PollOutcome::Failed(failed));
                }
                Step::Failed(_) | Step::Waiting => {}
            }

            sleep(self.settings.interval).await;
        }
    }

    async fn poll_once(&mut self) -> Result<Step, PollError> {
        self.polls += 1;
        let pull_request = self.pull_request;
        let pr = pull_request.number;
        let sha = pull_request.head_sha.as_str();

        let verdict = match evaluate_checks(self.repository, sha, &self.exclusions).await {
            Ok(verdict) => verdict,
            Err(error) => {
                warn!(pr, %error, "Failed to fetch checks, retrying on next poll");
                return Ok(Step::Waiting);
            }
        };

        if let Some(status_comment) = &mut self.status_comment {
            if let Err(error) = status_comment.publish(self.repository, pr, &verdict).await {
                warn!(pr, %error, "Failed to update status comment");
            }
        }

        match verdict.state() {
            VerdictState::NoChecks => {
                info!(pr, sha = %sha, "No checks found yet, waiting");
                Ok(Step::Waiting)
            }
            VerdictState::Pending => {
                info!(
                    pr,
                    pending = %verdict.pending.iter().join(", "),
                    failed = %verdict.failed.iter().join(", "),
                    "Checks still pending"
                );
                Ok(Step::Waiting)
            }
            VerdictState::Failed => {
                warn!(
                    pr,
                    failed = %verdict.failed.iter().join(", "),
                    policy = ?self.settings.failure_policy,
                    "Checks completed with failures"
                );
                Ok(Step::Failed(verdict.failed))
            }
            VerdictState::AllPassed => {
                info!(pr, passed = %verdict.passed.iter().join(", "), "All checks passed");
                self.notify().await
            }
        }
    }

    async fn notify(&mut self) -> Result<Step, PollError> {
        let pr = self.pull_request.number;

        if !self.gate.evaluate(self.repository, pr).await.is_allowed() {
            return Ok(Step::Waiting);
        }

        match self.ledger.notify(self.repository, pr, &self.message).await {
            Ok(Delivery::Sent(_)) => Ok(Step::Notified),
            Ok(Delivery::AlreadySent) => {
                info!(pr, "Pull request was already notified");
                Ok(Step::Notified)
            }
            Err(NotifyError::Lookup(error)) => {
                warn!(pr, %error, "Failed to look up earlier notifications, retrying on next poll");
                Ok(Step::Waiting)
            }
            Err(NotifyError::Send(error)) => Err(PollError::Notification {
                pr,
                source: Box::new(error),
            }),
        }
    }
}

#[cfg(test)]
impl<'a, R> PollDriver<'a, R> {
    pub fn with_ledger(mut self, ledger: NotificationLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn into_ledger(self) -> NotificationLedger {
        self.ledger
    }
}
