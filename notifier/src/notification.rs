use std::collections::HashSet;

use domain::{Comment, NotificationKey, normalize_message};
use sha2::{Digest, Sha256};
use source_control::SourceControlRepository;
use thiserror::Error;
use tracing::{debug, info};

pub const MARKER_PREFIX: &str = "<!-- pr-ready-notifier:";
const MARKER_SUFFIX: &str = "-->";

#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    Sent(Comment),
    AlreadySent,
}

#[derive(Debug, Error)]
pub enum NotifyError<E>
where
    E: std::error::Error + 'static,
{
    #[error("Failed to list existing comments: {0}")]
    Lookup(#[source] E),
    #[error("Failed to post notification comment: {0}")]
    Send(#[source] E),
}

/// Remembers which notifications went out during this process invocation.
///
/// The session set only short-circuits repeats within one run. Across runs the
/// pull request's comment history is the source of truth, so a key missing
/// here is always checked against the existing comments before posting.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    delivered: HashSet<NotificationKey>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, pr_number: u64, message: &str) -> bool {
        self.delivered
            .contains(&NotificationKey::new(pr_number, message))
    }

    pub fn record_notified(&mut self, pr_number: u64, message: &str) {
        self.delivered.insert(NotificationKey::new(pr_number, message));
    }

    pub async fn should_notify<R>(
        &mut self,
        repository: &R,
        pr_number: u64,
        message: &str,
    ) -> Result<bool, R::Error>
    where
        R: SourceControlRepository,
    {
        if self.contains(pr_number, message) {
            debug!(pr = pr_number, "Notification already delivered in this run");
            return Ok(false);
        }

        let comments = repository.list_comments(pr_number).await?;

        if comments
            .iter()
            .any(|comment| is_notification(&comment.body, message))
        {
            info!(pr = pr_number, "Found earlier notification comment");
            self.record_notified(pr_number, message);
            return Ok(false);
        }

        Ok(true)
    }

    pub async fn notify<R>(
        &mut self,
        repository: &R,
        pr_number: u64,
        message: &str,
    ) -> Result<Delivery, NotifyError<R::Error>>
    where
        R: SourceControlRepository,
    {
        if !self
            .should_notify(repository, pr_number, message)
            .await
            .map_err(NotifyError::Lookup)?
        {
            return Ok(Delivery::AlreadySent);
        }

        let comment = repository
            .create_comment(pr_number, &comment_body(message))
            .await
            .map_err(NotifyError::Send)?;

        self.record_notified(pr_number, message);
        info!(pr = pr_number, comment = comment.id, "Posted notification");

        Ok(Delivery::Sent(comment))
    }
}

pub fn marker(message: &str) -> String {
    let digest = Sha256::digest(normalize_message(message).as_bytes());

    format!("{MARKER_PREFIX}{} {MARKER_SUFFIX}", hex::encode(&digest[..8]))
}

pub fn comment_body(message: &str) -> String {
    format!("{message}\n\n{}", marker(message))
}

/// A comment is an earlier delivery of `message` if it carries the message's
/// marker or if its visible text equals the message after normalization.
pub fn is_notification(body: &str, message: &str) -> bool {
    body.contains(&marker(message))
        || normalize_message(&strip_markers(body)) == normalize_message(message)
}

fn strip_markers(body: &str) -> String {
    let mut stripped = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find(MARKER_PREFIX) {
        stripped.push_str(&rest[..start]);

        match rest[start..].find(MARKER_SUFFIX) {
            Some(end) => rest = &rest[start + end + MARKER_SUFFIX.len()..],
            None => {
                rest = "";
            }
        }
    }

    stripped.push_str(rest);
    stripped
}
