pub mod gate;

pub use gate::*;

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub head_sha: String,
    pub author_login: String,
    /// `None` while the hosting service is still computing mergeability.
    pub mergeable: Option<bool>,
    pub mergeable_state: MergeableState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeableState {
    Clean,
    Dirty,
    Blocked,
    Unstable,
    Behind,
    Draft,
    HasHooks,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Review {
    pub reviewer: String,
    pub state: ReviewState,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub body: String,
}

impl Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            MergeableState::Clean => "clean",
            MergeableState::Dirty => "dirty",
            MergeableState::Blocked => "blocked",
            MergeableState::Unstable => "unstable",
            MergeableState::Behind => "behind",
            MergeableState::Draft => "draft",
            MergeableState::HasHooks => "has_hooks",
            MergeableState::Unknown => "unknown",
        };

        f.write_str(value)
    }
}
