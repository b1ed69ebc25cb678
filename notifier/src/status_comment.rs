use domain::Verdict;
use itertools::Itertools;
use source_control::SourceControlRepository;
use tracing::debug;

use crate::notification::MARKER_PREFIX;

#[derive(Debug, Default)]
pub struct StatusComment {
    comment_id: Option<u64>,
    last_body: Option<String>,
}

pub fn status_marker() -> String {
    format!("{MARKER_PREFIX}status -->")
}

pub fn render_status(verdict: &Verdict) -> String {
    let mut body = format!("{}\n### Check status: {}\n", status_marker(), verdict.state());

    for (label, names) in [
        ("Pending", &verdict.pending),
        ("Failed", &verdict.failed),
        ("Passed", &verdict.passed),
    ] {
        if !names.is_empty() {
            let names = names.iter().map(|name| format!("`{name}`")).join(", ");
            body.push_str(&format!("\n**{label}:** {names}\n"));
        }
    }

    body
}

impl StatusComment {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish<R>(
        &mut self,
        repository: &R,
        pr_number: u64,
        verdict: &Verdict,
    ) -> Result<(), R::Error>
    where
        R: SourceControlRepository,
    {
        let body = render_status(verdict);

        if self.last_body.as_ref() == Some(&body) {
            return Ok(());
        }

        let comment_id = match self.comment_id {
            Some(id) => Some(id),
            None => {
                let marker = status_marker();
                repository
                    .list_comments(pr_number)
                    .await?
                    .into_iter()
                    .find(|comment| comment.body.contains(&marker))
                    .map(|comment| comment.id)
            }
        };

        let comment = match comment_id {
            Some(id) => repository.update_comment(id, &body).await?,
            None => repository.create_comment(pr_number, &body).await?,
        };

        debug!(pr = pr_number, comment = comment.id, "Updated status comment");

        self.comment_id = Some(comment.id);
        self.last_body = Some(body);

        Ok(())
    }
}
