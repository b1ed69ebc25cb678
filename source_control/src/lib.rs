use std::future::Future;

use domain::{CheckRun, Comment, PullRequest, Review, StatusCheck};
use secrecy::SecretString;

pub trait SourceControl {
    type Repository: SourceControlRepository;
    type Error: std::error::Error;

    fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Self::Repository, Self::Error>> + Send;
}

pub trait SourceControlRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_statuses(
        &self,
        sha: &str,
    ) -> impl Future<Output = Result<Vec<StatusCheck>, Self::Error>> + Send;
    fn list_check_runs(
        &self,
        sha: &str,
    ) -> impl Future<Output = Result<Vec<CheckRun>, Self::Error>> + Send;
    fn get_pull_request(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<PullRequest, Self::Error>> + Send;
    fn list_open_pull_requests(
        &self,
    ) -> impl Future<Output = Result<Vec<PullRequest>, Self::Error>> + Send;
    fn list_reviews(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send;
    fn list_comments(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send;
    fn create_comment(
        &self,
        number: u64,
        body: &str,
    ) -> impl Future<Output = Result<Comment, Self::Error>> + Send;
    fn update_comment(
        &self,
        comment_id: u64,
        body: &str,
    ) -> impl Future<Output = Result<Comment, Self::Error>> + Send;
}

pub enum Credential {
    Token(SecretString),
    App {
        app_id: u64,
        private_key: SecretString,
    },
}

pub mod github;
