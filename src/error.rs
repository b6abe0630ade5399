use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Bad URI or domain syntax, detected before any DNS activity.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// DNS transport or protocol failure (timeout, SERVFAIL, unreachable).
    /// Distinct from a lookup that simply has no records.
    #[error("Lookup failure for {0}: {1}")]
    LookupFailure(String, String),

    #[error("Unsupported transport: {0}")]
    UnsupportedTransport(String),

    /// Every candidate branch was exhausted; carries the last underlying cause.
    #[error("Resolution failed for {0}: {1}")]
    ResolutionFailure(String, Box<Error>),

    #[error("Invalid hop: {0}")]
    InvalidHop(String),
}

impl Error {
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Error::LookupFailure(..))
    }
}
