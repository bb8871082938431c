use std::error::Error as StdError;
use std::fmt;

/// A failed call to the Conditional Tokens contract.
#[non_exhaustive]
#[derive(Debug)]
pub struct ContractError {
    /// What the client was doing, e.g. `send split transaction`
    pub action: &'static str,
    pub message: String,
}

impl ContractError {
    pub(crate) fn new<E: fmt::Display>(action: &'static str, error: E) -> Self {
        Self {
            action,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {}", self.action, self.message)
    }
}

impl StdError for ContractError {}

impl From<ContractError> for crate::error::Error {
    fn from(err: ContractError) -> Self {
        crate::error::Error::with_source(crate::error::Kind::Internal, err)
    }
}
