use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter your startup idea!")]
    EmptyIdea,
    #[error("Please select at least one section to generate!")]
    NoSections,
}

/// Every way a generation request can end without a saved pitch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A generation is already in progress")]
    Busy,

    /// Transport failure, non-2xx status, or an `error` payload from the backend.
    #[error("{0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    /// The pitch was produced and shown but could not be written to history.
    #[error("Pitch generated but not saved to history: {0}")]
    Persist(String),
}
