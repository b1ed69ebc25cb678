pub mod error;

use crate::{Credential, SourceControl, SourceControlRepository};
use chrono::{DateTime, Utc};
use domain::{
    CheckRun, Comment, MergeableState, PullRequest, Review, ReviewState, StatusCheck,
};
use jsonwebtoken::EncodingKey;
use octocrab::{
    models::{AppId, CommentId},
    Octocrab,
};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use self::error::GitHubError;

const PAGE_SIZE: u8 = 100;
const MAX_PAGES: u32 = 50;

pub struct GitHub {
    octocrab: Octocrab,
    app: bool,
}

impl GitHub {
    pub fn build(credential: &Credential, api_url: Option<&str>) -> Result<Self, GitHubError> {
        let mut builder = Octocrab::builder();

        if let Some(api_url) = api_url {
            let api_url = Url::parse(api_url)?;
            builder = builder.base_uri(api_url.as_str())?;
        }

        let (builder, app) = match credential {
            Credential::Token(token) => {
                (builder.personal_token(token.expose_secret().to_owned()), false)
            }
            Credential::App {
                app_id,
                private_key,
            } => (
                builder.app(
                    AppId(*app_id),
                    EncodingKey::from_rsa_pem(private_key.expose_secret().as_bytes())?,
                ),
                true,
            ),
        };

        Ok(Self {
            octocrab: builder.build()?,
            app,
        })
    }
}

impl SourceControl for GitHub {
    type Repository = GitHubRepository;
    type Error = GitHubError;

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Self::Repository, Self::Error> {
        let octocrab = if self.app {
            let installation = self
                .octocrab
                .apps()
                .get_repository_installation(owner, repo)
                .await?;
            let (octocrab, _token) = self
                .octocrab
                .installation_and_token(installation.id)
                .await?;
            octocrab
        } else {
            self.octocrab.clone()
        };

        Ok(GitHubRepository {
            octocrab,
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        })
    }
}

#[derive(Clone)]
pub struct GitHubRepository {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubRepository {
    fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{path}", self.owner, self.repo)
    }

    async fn get_all<R, T>(
        &self,
        route: &str,
        state: Option<&str>,
        items: fn(R) -> Vec<T>,
    ) -> Result<Vec<T>, GitHubError>
    where
        R: DeserializeOwned,
    {
        let mut collected = Vec::new();

        for page in 1..=MAX_PAGES {
            let parameters = PageParameters {
                per_page: PAGE_SIZE,
                page,
                state,
            };
            let response: R = self.octocrab.get(route, Some(&parameters)).await?;
            let mut page_items = items(response);
            let last_page = page_items.len() < usize::from(PAGE_SIZE);

            collected.append(&mut page_items);

            if last_page {
                return Ok(collected);
            }
        }

        Err(GitHubError::PageLimit {
            route: route.to_owned(),
            pages: MAX_PAGES,
        })
    }
}

impl SourceControlRepository for GitHubRepository {
    type Error = GitHubError;

    async fn list_statuses(&self, sha: &str) -> Result<Vec<StatusCheck>, Self::Error> {
        let route = self.route(&format!("commits/{sha}/status"));
        let statuses = self
            .get_all(&route, None, |combined: CombinedStatus| combined.statuses)
            .await?;

        debug!(sha, count = statuses.len(), "Fetched commit statuses");

        Ok(statuses)
    }

    async fn list_check_runs(&self, sha: &str) -> Result<Vec<CheckRun>, Self::Error> {
        let route = self.route(&format!("commits/{sha}/check-runs"));
        let check_runs = self
            .get_all(&route, None, |list: CheckRunList| list.check_runs)
            .await?;

        debug!(sha, count = check_runs.len(), "Fetched check runs");

        Ok(check_runs)
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, Self::Error> {
        let route = self.route(&format!("pulls/{number}"));
        let pull_request: PullRequestPayload = self.octocrab.get(route, None::<&()>).await?;

        Ok(pull_request.into())
    }

    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>, Self::Error> {
        let route = self.route("pulls");
        let pull_requests = self
            .get_all(&route, Some("open"), |list: Vec<PullRequestPayload>| list)
            .await?;

        Ok(pull_requests.into_iter().map(PullRequest::from).collect())
    }

    async fn list_reviews(&self, number: u64) -> Result<Vec<Review>, Self::Error> {
        let route = self.route(&format!("pulls/{number}/reviews"));
        let reviews = self
            .get_all(&route, None, |list: Vec<ReviewPayload>| list)
            .await?;

        Ok(reviews.into_iter().filter_map(ReviewPayload::into_review).collect())
    }

    async fn list_comments(&self, number: u64) -> Result<Vec<Comment>, Self::Error> {
        let page = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .list_comments(number)
            .per_page(PAGE_SIZE)
            .send()
            .await?;
        let comments = self.octocrab.all_pages(page).await?;

        Ok(comments.into_iter().map(into_comment).collect())
    }

    async fn create_comment(&self, number: u64, body: &str) -> Result<Comment, Self::Error> {
        let comment = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .create_comment(number, body)
            .await?;

        Ok(into_comment(comment))
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<Comment, Self::Error> {
        let comment = self
            .octocrab
            .issues(&self.owner, &self.repo)
            .update_comment(CommentId(comment_id), body)
            .await?;

        Ok(into_comment(comment))
    }
}

fn into_comment(comment: octocrab::models::issues::Comment) -> Comment {
    Comment {
        id: comment.id.0,
        body: comment.body.unwrap_or_default(),
    }
}

#[derive(Serialize)]
struct PageParameters<'a> {
    per_page: u8,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

#[derive(Deserialize)]
struct CombinedStatus {
    statuses: Vec<StatusCheck>,
}

#[derive(Deserialize)]
struct CheckRunList {
    check_runs: Vec<CheckRun>,
}

#[derive(Deserialize)]
struct User {
    login: String,
}

#[derive(Deserialize)]
struct PullRequestHead {
    sha: String,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: PullRequestHead,
    user: Option<User>,
    #[serde(default)]
    mergeable: Option<bool>,
    #[serde(default)]
    mergeable_state: Option<MergeableState>,
}

impl From<PullRequestPayload> for PullRequest {
    fn from(value: PullRequestPayload) -> Self {
        PullRequest {
            number: value.number,
            head_sha: value.head.sha,
            author_login: value.user.map(|user| user.login).unwrap_or_default(),
            mergeable: value.mergeable,
            mergeable_state: value.mergeable_state.unwrap_or(MergeableState::Unknown),
        }
    }
}

#[derive(Deserialize)]
struct ReviewPayload {
    user: Option<User>,
    state: ReviewState,
    submitted_at: Option<DateTime<Utc>>,
}

impl ReviewPayload {
    /// Reviews from deleted accounts carry no user and cannot be attributed.
    fn into_review(self) -> Option<Review> {
        let reviewer = self.user?.login;

        Some(Review {
            reviewer,
            state: self.state,
            submitted_at: self.submitted_at,
        })
    }
}
