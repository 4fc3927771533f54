use crate::{error::ValidationError, navigation::Destination};

/// Result of submitting a page's form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input accepted; the user was sent to this page
    Accepted(Destination),
    /// Input rejected; the user stays on the page and was told why
    Rejected(ValidationError),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&ValidationError> {
        match self {
            SubmitOutcome::Rejected(error) => Some(error),
            SubmitOutcome::Accepted(_) => None,
        }
    }
}
