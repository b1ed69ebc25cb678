use std::process::ExitCode;

use clap::Parser;
use config::{AppConfig, Args, ConfigError};
use domain::render_message;
use event::{ResolutionError, determine_target, resolve_pull_request};
use gate::MergeGate;
use poller::{PollDriver, PollError, PollOutcome};
use source_control::{SourceControl, github::GitHub, github::error::GitHubError};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod evaluation;
mod event;
mod gate;
mod notification;
mod poller;
mod status_comment;
#[cfg(test)]
mod testing;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to connect to GitHub: {0}")]
    GitHub(#[from] GitHubError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()).await {
        Ok(PollOutcome::Notified) => ExitCode::SUCCESS,
        Ok(PollOutcome::Failed(failed)) => {
            error!(failed = %failed.join(", "), "Checks failed");
            ExitCode::FAILURE
        }
        Ok(PollOutcome::TimedOut(elapsed)) => {
            error!(
                elapsed_secs = elapsed.as_secs(),
                "Timed out after {} minutes waiting for checks to pass",
                elapsed.as_secs() / 60
            );
            ExitCode::FAILURE
        }
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<PollOutcome, AppError> {
    let config = AppConfig::from_args(args)?;

    let github = GitHub::build(&config.github.credential, config.github.api_url.as_deref())?;
    let repository = github
        .get_repository(&config.repository.owner, &config.repository.name)
        .await?;

    let target = determine_target(&config.target)?;
    let pull_request = resolve_pull_request(&repository, &target).await?;
    let message = render_message(&config.notification.template, &pull_request.author_login);

    info!(
        repository = %format!("{}/{}", config.repository.owner, config.repository.name),
        excluded = ?config.exclusions.patterns(),
        "Starting notifier"
    );

    let mut driver = PollDriver::new(
        &repository,
        &pull_request,
        message,
        config.exclusions.clone(),
        config.polling.clone(),
    )
    .with_gate(MergeGate::new(config.notification.merge_gate))
    .with_status_comment(config.notification.status_comment);

    Ok(driver.run().await?)
}
