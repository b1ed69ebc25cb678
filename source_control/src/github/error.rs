use jsonwebtoken::errors::Error as JwtError;
use octocrab::{Error as OctocrabError, GitHubError as OctocrabGitHubError};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error(transparent)]
    GitHub(#[from] OctocrabGitHubError),
    #[error(transparent)]
    Octocrab(#[from] OctocrabError),
    #[error("Invalid GitHub App private key: {0}")]
    PrivateKey(#[from] JwtError),
    #[error("Invalid GitHub API URL: {0}")]
    ApiUrl(#[from] ParseError),
    #[error("{route} has more than {pages} pages of results")]
    PageLimit { route: String, pages: u32 },
}
