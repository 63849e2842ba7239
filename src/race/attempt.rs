use super::paths::DeliveryPath;
use crate::transport::TransportError;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttemptOutcome {
    Pending,
    Succeeded,
    Failed(TransportError),
    Cancelled,
}

/// One race participant bound to a single delivery path. The token is owned
/// by this attempt alone.
#[derive(Debug)]
pub(crate) struct PathAttempt<'a> {
    pub index: usize,
    pub path: &'a DeliveryPath,
    pub address: String,
    pub token: CancellationToken,
    outcome: AttemptOutcome,
}

impl<'a> PathAttempt<'a> {
    pub fn new(index: usize, path: &'a DeliveryPath, target: &str, token: CancellationToken) -> Self {
        Self {
            index,
            path,
            address: path.address(target),
            token,
            outcome: AttemptOutcome::Pending,
        }
    }

    pub fn outcome(&self) -> &AttemptOutcome {
        &self.outcome
    }

    pub fn is_pending(&self) -> bool {
        self.outcome == AttemptOutcome::Pending
    }

    /// Leave `Pending`. Returns false if the attempt had already settled.
    pub fn settle(&mut self, outcome: AttemptOutcome) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.outcome = outcome;
        true
    }

    /// Signal the token. Returns true if this moved a pending attempt to `Cancelled`.
    pub fn cancel(&mut self) -> bool {
        self.token.cancel();
        self.settle(AttemptOutcome::Cancelled)
    }
}
