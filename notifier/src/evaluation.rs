use domain::{ExclusionFilter, RawCheck, UNNAMED_CHECK, Verdict};
use source_control::SourceControlRepository;
use tracing::debug;

pub async fn evaluate_checks<R>(
    repository: &R,
    sha: &str,
    exclusions: &ExclusionFilter,
) -> Result<Verdict, R::Error>
where
    R: SourceControlRepository,
{
    let (statuses, check_runs) = futures::try_join!(
        repository.list_statuses(sha),
        repository.list_check_runs(sha)
    )?;

    let checks = statuses
        .into_iter()
        .map(RawCheck::from)
        .chain(check_runs.into_iter().map(RawCheck::from))
        .collect();

    let (relevant, excluded) = exclusions.split(checks);

    for check in &excluded {
        debug!(check = check.name().unwrap_or(UNNAMED_CHECK), "Excluded check");
    }

    let normalized = relevant.iter().map(|check| {
        let normalized = check.normalize();
        debug!(
            check = %normalized.name,
            classification = %normalized.classification,
            "Classified check"
        );
        normalized
    });

    Ok(Verdict::aggregate(normalized))
}
