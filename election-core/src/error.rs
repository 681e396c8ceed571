//! Error types for the election engine

use crate::types::{ElectionId, Identity, Timestamp};
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors
///
/// Every variant is a permanent answer for the arguments that produced it:
/// retrying the same call against the same state fails the same way.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller is not the administrator
    #[error("Unauthorized: {caller} is not the administrator")]
    Unauthorized {
        /// Identity that attempted the call
        caller: Identity,
    },

    /// Candidate list length outside the accepted bounds
    #[error("Invalid candidate count: {0} (expected between 2 and 5)")]
    InvalidCandidateCount(usize),

    /// Candidate name at the given index is empty
    #[error("Invalid candidate name at index {0}: name must not be empty")]
    InvalidCandidateName(usize),

    /// Election duration must be at least one day
    #[error("Invalid duration: {0} days")]
    InvalidDuration(u64),

    /// No election was ever created under this identifier
    #[error("Election not found: {0}")]
    ElectionNotFound(ElectionId),

    /// Election was already closed
    #[error("Election already closed: {0}")]
    ElectionAlreadyClosed(ElectionId),

    /// Election has not been closed
    ///
    /// Returned by close before the deadline, and by tally on any open
    /// election, in which case `ends_at` may already be in the past.
    #[error("Election {election_id} still open until {ends_at}")]
    ElectionStillOpen {
        /// Election identifier
        election_id: ElectionId,
        /// End timestamp (seconds since epoch)
        ends_at: Timestamp,
    },

    /// Vote attempted on a closed election
    #[error("Election closed: {0}")]
    ElectionClosed(ElectionId),

    /// Voter already holds a ballot for this election
    #[error("Voter {voter} has already voted in election {election_id}")]
    AlreadyVoted {
        /// Voter identity
        voter: Identity,
        /// Election identifier
        election_id: ElectionId,
    },

    /// Voter holds no ballot for this election
    #[error("Voter {voter} has not voted in election {election_id}")]
    HasNotVoted {
        /// Voter identity
        voter: Identity,
        /// Election identifier
        election_id: ElectionId,
    },

    /// Malformed ranking
    #[error("Invalid ballot: {0}")]
    InvalidBallot(String),

    /// Event log hash chain is broken
    #[error("Integrity check failed: {0}")]
    Integrity(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Unauthorized { .. } => "unauthorized",
            Error::InvalidCandidateCount(_) => "invalid_candidate_count",
            Error::InvalidCandidateName(_) => "invalid_candidate_name",
            Error::InvalidDuration(_) => "invalid_duration",
            Error::ElectionNotFound(_) => "election_not_found",
            Error::ElectionAlreadyClosed(_) => "election_already_closed",
            Error::ElectionStillOpen { .. } => "election_still_open",
            Error::ElectionClosed(_) => "election_closed",
            Error::AlreadyVoted { .. } => "already_voted",
            Error::HasNotVoted { .. } => "has_not_voted",
            Error::InvalidBallot(_) => "invalid_ballot",
            Error::Integrity(_) => "integrity",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
            Error::Metrics(_) => "metrics",
            Error::Io(_) => "io",
        }
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
