use std::collections::HashMap;

use thiserror::Error;

use super::{MergeableState, PullRequest, Review, ReviewState};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GateDenial {
    #[error("pull request is not mergeable")]
    NotMergeable,
    #[error("mergeable state is \"{0}\", expected \"clean\"")]
    MergeableState(MergeableState),
    #[error("no reviewer's latest review is an approval")]
    NotApproved,
}

/// Latest review per reviewer. Reviews without a submission time sort first,
/// ties keep the order the service returned them in.
pub fn latest_reviews(reviews: &[Review]) -> HashMap<&str, &Review> {
    let mut ordered: Vec<&Review> = reviews.iter().collect();
    ordered.sort_by_key(|review| review.submitted_at);

    ordered
        .into_iter()
        .map(|review| (review.reviewer.as_str(), review))
        .collect()
}

pub fn check_gate(pull_request: &PullRequest, reviews: &[Review]) -> Result<(), GateDenial> {
    if pull_request.mergeable != Some(true) {
        return Err(GateDenial::NotMergeable);
    }

    if pull_request.mergeable_state != MergeableState::Clean {
        return Err(GateDenial::MergeableState(pull_request.mergeable_state));
    }

    let approved = latest_reviews(reviews)
        .values()
        .any(|review| review.state == ReviewState::Approved);

    if !approved {
        return Err(GateDenial::NotApproved);
    }

    Ok(())
}
