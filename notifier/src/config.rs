use std::{path::PathBuf, time::Duration};

use clap::Parser;
use domain::ExclusionFilter;
use secrecy::SecretString;
use source_control::Credential;
use thiserror::Error;

use crate::poller::FailurePolicy;

pub const DEFAULT_MESSAGE: &str =
    "@{user} all checks have passed, this pull request is ready for review.";

/// Notifies a pull request's author once all of its checks have passed.
#[derive(Parser, Debug)]
#[command(name = "pr-ready-notifier", version)]
pub struct Args {
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
    #[arg(long, env = "GITHUB_APP_ID")]
    pub github_app_id: Option<u64>,
    #[arg(long, env = "GITHUB_PRIVATE_KEY", hide_env_values = true)]
    pub github_private_key: Option<String>,
    #[arg(long, env = "GITHUB_API_URL")]
    pub github_api_url: Option<String>,
    /// Repository in `owner/name` form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,
    /// Pull request to watch, resolved from the triggering event when absent
    #[arg(long, env = "PR_NUMBER")]
    pub pr_number: Option<u64>,
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,
    /// Comma-separated, case-insensitive substrings of check names to ignore
    #[arg(long, env = "EXCLUDED_CHECKS", default_value = "")]
    pub excluded_checks: String,
    /// Comment template, `{user}` is replaced with the pull request author
    #[arg(long, env = "NOTIFICATION_MESSAGE", default_value = DEFAULT_MESSAGE)]
    pub notification_message: String,
    /// Seconds between evaluations
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 30)]
    pub poll_interval: u64,
    /// Minutes to wait for checks before giving up
    #[arg(long, env = "TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
    /// Stop with a failure as soon as every check completed and one failed
    #[arg(long, env = "FAIL_ON_CHECK_FAILURE")]
    pub fail_on_check_failure: bool,
    /// Notify without requiring a clean, approved pull request
    #[arg(long, env = "SKIP_MERGE_GATE")]
    pub skip_merge_gate: bool,
    /// Keep a single comment with the current check status up to date
    #[arg(long, env = "STATUS_COMMENT")]
    pub status_comment: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Please provide the GITHUB_TOKEN environment variable, or GITHUB_APP_ID and GITHUB_PRIVATE_KEY"
    )]
    MissingCredential,
    #[error("GITHUB_APP_ID and GITHUB_PRIVATE_KEY need to be provided together")]
    IncompleteAppCredential,
    #[error("Please provide the GITHUB_REPOSITORY environment variable")]
    MissingRepository,
    #[error("GITHUB_REPOSITORY needs to be of the form owner/name, got \"{0}\"")]
    MalformedRepository(String),
    #[error("POLL_INTERVAL needs to be at least one second")]
    InvalidPollInterval,
    #[error("TIMEOUT needs to be a positive number of minutes that fits in a duration")]
    InvalidTimeout,
}

pub struct AppConfig {
    pub github: GitHubConfig,
    pub repository: RepositoryConfig,
    pub target: TargetConfig,
    pub notification: NotificationConfig,
    pub polling: PollingConfig,
    pub exclusions: ExclusionFilter,
}

pub struct GitHubConfig {
    pub credential: Credential,
    pub api_url: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TargetConfig {
    pub pr_number: Option<u64>,
    pub event_name: Option<String>,
    pub event_path: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct NotificationConfig {
    pub template: String,
    pub status_comment: bool,
    pub merge_gate: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollingConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub failure_policy: FailurePolicy,
}

impl AppConfig {
    pub fn from_args(args: Args) -> Result<AppConfig, ConfigError> {
        Ok(AppConfig {
            github: GitHubConfig::from_args(&args)?,
            repository: RepositoryConfig::parse(args.repository.as_deref())?,
            polling: PollingConfig::from_args(&args)?,
            exclusions: ExclusionFilter::parse(&args.excluded_checks),
            notification: NotificationConfig {
                template: args.notification_message,
                status_comment: args.status_comment,
                merge_gate: !args.skip_merge_gate,
            },
            target: TargetConfig {
                pr_number: args.pr_number,
                event_name: args.event_name,
                event_path: args.event_path,
            },
        })
    }
}

impl GitHubConfig {
    fn from_args(args: &Args) -> Result<GitHubConfig, ConfigError> {
        let token = non_empty(args.github_token.as_deref());
        let private_key = non_empty(args.github_private_key.as_deref());

        let credential = match (token, args.github_app_id, private_key) {
            (Some(token), _, _) => Credential::Token(SecretString::new(token.to_owned())),
            (None, Some(app_id), Some(private_key)) => Credential::App {
                app_id,
                private_key: SecretString::new(private_key.to_owned()),
            },
            (None, None, None) => return Err(ConfigError::MissingCredential),
            (None, _, _) => return Err(ConfigError::IncompleteAppCredential),
        };

        Ok(GitHubConfig {
            credential,
            api_url: non_empty(args.github_api_url.as_deref()).map(str::to_owned),
        })
    }
}

impl RepositoryConfig {
    fn parse(value: Option<&str>) -> Result<RepositoryConfig, ConfigError> {
        let value = non_empty(value).ok_or(ConfigError::MissingRepository)?;

        match value.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepositoryConfig {
                    owner: owner.to_owned(),
                    name: name.to_owned(),
                })
            }
            _ => Err(ConfigError::MalformedRepository(value.to_owned())),
        }
    }
}

impl PollingConfig {
    fn from_args(args: &Args) -> Result<PollingConfig, ConfigError> {
        if args.poll_interval == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        let timeout_secs = args
            .timeout
            .checked_mul(60)
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let failure_policy = if args.fail_on_check_failure {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Lenient
        };

        Ok(PollingConfig {
            interval: Duration::from_secs(args.poll_interval),
            timeout: Duration::from_secs(timeout_secs),
            failure_policy,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            github_token: Some("token".to_owned()),
            github_app_id: None,
            github_private_key: None,
            github_api_url: None,
            repository: Some("octo/repo".to_owned()),
            pr_number: None,
            event_name: None,
            event_path: None,
            excluded_checks: String::new(),
            notification_message: DEFAULT_MESSAGE.to_owned(),
            poll_interval: 30,
            timeout: 30,
            fail_on_check_failure: false,
            skip_merge_gate: false,
            status_comment: false,
        }
    }

    fn error_of(args: Args) -> ConfigError {
        match AppConfig::from_args(args) {
            Ok(_) => panic!("expected a configuration error"),
            Err(error) => error,
        }
    }

    #[test]
    fn from_args_should_build_defaults() {
        let config = AppConfig::from_args(args()).unwrap();

        assert!(matches!(config.github.credential, Credential::Token(_)));
        assert_eq!(
            config.repository,
            RepositoryConfig {
                owner: "octo".to_owned(),
                name: "repo".to_owned()
            }
        );
        assert_eq!(
            config.polling,
            PollingConfig {
                interval: Duration::from_secs(30),
                timeout: Duration::from_secs(1800),
                failure_policy: FailurePolicy::Lenient
            }
        );
        assert!(config.exclusions.is_empty());
        assert!(config.notification.merge_gate);
        assert!(!config.notification.status_comment);
    }

    #[test]
    fn from_args_should_fail_without_credential() {
        let args = Args {
            github_token: Some("   ".to_owned()),
            ..args()
        };

        assert_eq!(error_of(args), ConfigError::MissingCredential);
    }

    #[test]
    fn from_args_should_accept_app_credential() {
        let args = Args {
            github_token: None,
            github_app_id: Some(12),
            github_private_key: Some("key".to_owned()),
            ..args()
        };

        let config = AppConfig::from_args(args).unwrap();

        assert!(matches!(
            config.github.credential,
            Credential::App { app_id: 12, .. }
        ));
    }

    #[test]
    fn from_args_should_fail_with_half_an_app_credential() {
        let args = Args {
            github_token: None,
            github_app_id: Some(12),
            ..args()
        };

        assert_eq!(error_of(args), ConfigError::IncompleteAppCredential);
    }

    #[test]
    fn from_args_should_fail_for_malformed_repository() {
        for repository in ["octo", "octo/", "/repo", "a/b/c"] {
            let args = Args {
                repository: Some(repository.to_owned()),
                ..args()
            };

            assert_eq!(
                error_of(args),
                ConfigError::MalformedRepository(repository.to_owned())
            );
        }
    }

    #[test]
    fn from_args_should_fail_without_repository() {
        let args = Args {
            repository: None,
            ..args()
        };

        assert_eq!(error_of(args), ConfigError::MissingRepository);
    }

    #[test]
    fn from_args_should_reject_zero_interval_and_timeout() {
        let interval = Args {
            poll_interval: 0,
            ..args()
        };
        let timeout = Args {
            timeout: 0,
            ..args()
        };

        assert_eq!(error_of(interval), ConfigError::InvalidPollInterval);
        assert_eq!(error_of(timeout), ConfigError::InvalidTimeout);
    }

    #[test]
    fn from_args_should_reject_overflowing_timeout() {
        let args = Args {
            timeout: u64::MAX,
            ..args()
        };

        assert_eq!(error_of(args), ConfigError::InvalidTimeout);
    }

    #[test]
    fn from_args_should_accept_largest_representable_timeout() {
        let args = Args {
            timeout: u64::MAX / 60,
            ..args()
        };

        let config = AppConfig::from_args(args).unwrap();

        assert_eq!(config.polling.timeout.as_secs(), u64::MAX / 60 * 60);
    }

    #[test]
    fn from_args_should_honor_switches() {
        let args = Args {
            excluded_checks: "lint,,deploy".to_owned(),
            fail_on_check_failure: true,
            skip_merge_gate: true,
            status_comment: true,
            ..args()
        };

        let config = AppConfig::from_args(args).unwrap();

        assert_eq!(config.exclusions.patterns(), ["lint", "deploy"]);
        assert_eq!(config.polling.failure_policy, FailurePolicy::Strict);
        assert!(!config.notification.merge_gate);
        assert!(config.notification.status_comment);
    }

    #[test]
    fn args_should_parse_command_line() {
        let args = Args::try_parse_from([
            "pr-ready-notifier",
            "--github-token",
            "token",
            "--repository",
            "octo/repo",
            "--pr-number",
            "5",
            "--poll-interval",
            "10",
        ])
        .unwrap();

        assert_eq!(args.pr_number, Some(5));
        assert_eq!(args.poll_interval, 10);
    }
}
