use std::{
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
};

use chrono::{TimeZone, Utc};
use domain::{
    CheckRun, CheckRunConclusion, CheckRunStatus, Comment, MergeableState, PullRequest, Review,
    ReviewState, StatusCheck,
};
use source_control::SourceControlRepository;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct FakeError(pub String);

/// In-memory repository. Check run lists are played back in order, the last
/// one repeats forever. Comments are kept per pull request.
#[derive(Default)]
pub struct FakeRepository {
    state: Mutex<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    pub statuses: Vec<StatusCheck>,
    pub check_runs: VecDeque<Vec<CheckRun>>,
    pub pull_requests: Vec<PullRequest>,
    pub reviews: Vec<Review>,
    pub comments: HashMap<u64, Vec<Comment>>,
    pub next_comment_id: u64,
    pub failing_check_fetches: usize,
    pub fail_reviews: bool,
    pub fail_comment_listing: bool,
    pub fail_comment_creation: bool,
    pub check_fetches: usize,
    pub comment_listings: usize,
    pub created_comments: usize,
    pub updated_comments: usize,
}

impl FakeRepository {
    pub fn with(&self, configure: impl FnOnce(&mut FakeState)) {
        configure(&mut self.state());
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl SourceControlRepository for FakeRepository {
    type Error = FakeError;

    async fn list_statuses(&self, _sha: &str) -> Result<Vec<StatusCheck>, Self::Error> {
        Ok(self.state().statuses.clone())
    }

    async fn list_check_runs(&self, _sha: &str) -> Result<Vec<CheckRun>, Self::Error> {
        let mut state = self.state();
        state.check_fetches += 1;

        if state.failing_check_fetches > 0 {
            state.failing_check_fetches -= 1;
            return Err(FakeError("service unavailable".to_owned()));
        }

        if state.check_runs.len() > 1 {
            Ok(state.check_runs.pop_front().unwrap_or_default())
        } else {
            Ok(state.check_runs.front().cloned().unwrap_or_default())
        }
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, Self::Error> {
        self.state()
            .pull_requests
            .iter()
            .find(|pull_request| pull_request.number == number)
            .cloned()
            .ok_or_else(|| FakeError(format!("pull request {number} not found")))
    }

    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>, Self::Error> {
        Ok(self.state().pull_requests.clone())
    }

    async fn list_reviews(&self, _number: u64) -> Result<Vec<Review>, Self::Error> {
        let state = self.state();

        if state.fail_reviews {
            return Err(FakeError("reviews unavailable".to_owned()));
        }

        Ok(state.reviews.clone())
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<Comment>, Self::Error> {
        let mut state = self.state();
        state.comment_listings += 1;

        if state.fail_comment_listing {
            return Err(FakeError("comments unavailable".to_owned()));
        }

        Ok(state.comments.get(&number).cloned().unwrap_or_default())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<Comment, Self::Error> {
        let mut state = self.state();

        if state.fail_comment_creation {
            return Err(FakeError("comment rejected".to_owned()));
        }

        state.next_comment_id += 1;
        let comment = Comment {
            id: state.next_comment_id,
            body: body.to_owned(),
        };
        state.comments.entry(number).or_default().push(comment.clone());
        state.created_comments += 1;

        Ok(comment)
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<Comment, Self::Error> {
        let mut state = self.state();
        state.updated_comments += 1;

        let comment = state
            .comments
            .values_mut()
            .flatten()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| FakeError(format!("comment {comment_id} not found")))?;
        comment.body = body.to_owned();

        Ok(comment.clone())
    }
}

pub fn pull_request(number: u64, head_sha: &str, mergeable_state: MergeableState) -> PullRequest {
    PullRequest {
        number,
        head_sha: head_sha.to_owned(),
        author_login: "octocat".to_owned(),
        mergeable: Some(mergeable_state == MergeableState::Clean),
        mergeable_state,
    }
}

pub fn approval(reviewer: &str) -> Review {
    Review {
        reviewer: reviewer.to_owned(),
        state: ReviewState::Approved,
        submitted_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
    }
}

pub fn completed(name: &str, conclusion: CheckRunConclusion) -> CheckRun {
    CheckRun {
        name: name.to_owned(),
        status: CheckRunStatus::Completed,
        conclusion: Some(conclusion),
    }
}

pub fn in_progress(name: &str) -> CheckRun {
    CheckRun {
        name: name.to_owned(),
        status: CheckRunStatus::InProgress,
        conclusion: None,
    }
}
