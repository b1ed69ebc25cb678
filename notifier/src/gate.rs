use domain::{GateDenial, check_gate};
use source_control::SourceControlRepository;
use tracing::{info, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny(GateDenial),
    Unavailable,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

pub struct MergeGate {
    enabled: bool,
}

impl MergeGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub async fn evaluate<R>(&self, repository: &R, number: u64) -> GateDecision
    where
        R: SourceControlRepository,
    {
        if !self.enabled {
            return GateDecision::Allow;
        }

        let fetched = futures::try_join!(
            repository.get_pull_request(number),
            repository.list_reviews(number)
        );

        let (pull_request, reviews) = match fetched {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(
                    pr = number,
                    %error,
                    "Failed to evaluate merge gate, treating pull request as not ready"
                );
                return GateDecision::Unavailable;
            }
        };

        match check_gate(&pull_request, &reviews) {
            Ok(()) => {
                info!(pr = number, "Merge gate passed");
                GateDecision::Allow
            }
            Err(denial) => {
                warn!(pr = number, %denial, "Merge gate denied notification");
                GateDecision::Deny(denial)
            }
        }
    }
}
