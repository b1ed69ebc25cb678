use std::error::Error as StdError;

use domain::PullRequest;
use serde::Deserialize;
use source_control::SourceControlRepository;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TargetConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTarget {
    PullRequest(u64),
    Commit(String),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Please provide PR_NUMBER or GITHUB_EVENT_NAME and GITHUB_EVENT_PATH")]
    MissingEvent,
    #[error("Failed to read event payload: {0}")]
    ReadPayload(#[from] std::io::Error),
    #[error("Failed to parse {event} event payload: {source}")]
    ParsePayload {
        event: String,
        source: serde_json::Error,
    },
    #[error("The {0} event does not reference a pull request")]
    NoPullRequest(String),
    #[error("No open pull request has head commit {0}")]
    NoOpenPullRequest(String),
    #[error("Failed to resolve pull request: {0}")]
    Remote(Box<dyn StdError + Send + Sync>),
}

pub fn determine_target(config: &TargetConfig) -> Result<EventTarget, ResolutionError> {
    if let Some(number) = config.pr_number {
        return Ok(EventTarget::PullRequest(number));
    }

    let (Some(event_name), Some(event_path)) = (&config.event_name, &config.event_path) else {
        return Err(ResolutionError::MissingEvent);
    };

    let body = std::fs::read_to_string(event_path)?;

    parse_event(event_name, &body)?
        .ok_or_else(|| ResolutionError::NoPullRequest(event_name.to_owned()))
}

pub fn parse_event(event: &str, body: &str) -> Result<Option<EventTarget>, ResolutionError> {
    let supported_events = [
        "pull_request",
        "pull_request_target",
        "pull_request_review",
        "pull_request_review_comment",
        "issue_comment",
        "status",
        "check_run",
        "check_suite",
        "workflow_run",
    ];

    if !supported_events.contains(&event) {
        debug!(event, "Ignoring unsupported event");
        return Ok(None);
    }

    let payload = format!(
        r#"{{
            "event": "{event}",
            "payload": {body}
        }}"#,
    );

    let parsed = serde_json::from_str::<ActionEvent>(&payload).map_err(|source| {
        ResolutionError::ParsePayload {
            event: event.to_owned(),
            source,
        }
    })?;

    Ok(parsed.extract_target())
}

pub async fn resolve_pull_request<R>(
    repository: &R,
    target: &EventTarget,
) -> Result<PullRequest, ResolutionError>
where
    R: SourceControlRepository,
{
    let number = match target {
        EventTarget::PullRequest(number) => *number,
        EventTarget::Commit(sha) => repository
            .list_open_pull_requests()
            .await
            .map_err(remote)?
            .into_iter()
            .find(|pull_request| &pull_request.head_sha == sha)
            .map(|pull_request| pull_request.number)
            .ok_or_else(|| ResolutionError::NoOpenPullRequest(sha.to_owned()))?,
    };

    let pull_request = repository.get_pull_request(number).await.map_err(remote)?;

    info!(
        pr = pull_request.number,
        sha = %pull_request.head_sha,
        author = %pull_request.author_login,
        "Resolved pull request"
    );

    Ok(pull_request)
}

fn remote<E>(error: E) -> ResolutionError
where
    E: StdError + Send + Sync + 'static,
{
    ResolutionError::Remote(Box::new(error))
}

#[derive(Deserialize)]
#[serde(tag = "event", content = "payload")]
enum ActionEvent {
    #[serde(
        rename = "pull_request",
        alias = "pull_request_target",
        alias = "pull_request_review",
        alias = "pull_request_review_comment"
    )]
    PullRequest(PullRequestEventData),
    #[serde(rename = "issue_comment")]
    IssueComment(IssueCommentEventData),
    #[serde(rename = "status")]
    Status(StatusEventData),
    #[serde(rename = "check_run")]
    CheckRun(CheckRunEventData),
    #[serde(rename = "check_suite")]
    CheckSuite(CheckSuiteEventData),
    #[serde(rename = "workflow_run")]
    WorkflowRun(WorkflowRunEventData),
}

impl ActionEvent {
    fn extract_target(self) -> Option<EventTarget> {
        match self {
            ActionEvent::PullRequest(data) => {
                Some(EventTarget::PullRequest(data.pull_request.number))
            }
            ActionEvent::IssueComment(data) => {
                let number = data.issue.number;
                data.issue
                    .pull_request
                    .map(|_| EventTarget::PullRequest(number))
            }
            ActionEvent::Status(data) => Some(EventTarget::Commit(data.sha)),
            ActionEvent::CheckRun(data) => data.check_run.extract_target(),
            ActionEvent::CheckSuite(data) => data.check_suite.extract_target(),
            ActionEvent::WorkflowRun(data) => data.workflow_run.extract_target(),
        }
    }
}

#[derive(Deserialize)]
struct PullRequestEventData {
    pull_request: PullRequestReference,
}

#[derive(Deserialize)]
struct IssueCommentEventData {
    issue: Issue,
}

#[derive(Deserialize)]
struct Issue {
    number: u64,
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct StatusEventData {
    sha: String,
}

#[derive(Deserialize)]
struct CheckRunEventData {
    check_run: CommitRun,
}

#[derive(Deserialize)]
struct CheckSuiteEventData {
    check_suite: CommitRun,
}

#[derive(Deserialize)]
struct WorkflowRunEventData {
    workflow_run: CommitRun,
}

#[derive(Deserialize)]
struct CommitRun {
    head_sha: String,
    #[serde(default)]
    pull_requests: Vec<PullRequestReference>,
}

impl CommitRun {
    fn extract_target(self) -> Option<EventTarget> {
        match self.pull_requests.first() {
            Some(pull_request) => Some(EventTarget::PullRequest(pull_request.number)),
            None => Some(EventTarget::Commit(self.head_sha)),
        }
    }
}

#[derive(Deserialize)]
struct PullRequestReference {
    number: u64,
}
