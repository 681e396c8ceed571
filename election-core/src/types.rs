//! Core types for the election engine
//!
//! All types are designed for:
//! - Deterministic serialization (bincode) so events hash identically on replay
//! - Cheap cloning out of the engine for read-only projections

use serde::{Deserialize, Serialize};
use std::fmt;

/// Election identifier, assigned sequentially from 1 and never reused
pub type ElectionId = u64;

/// Seconds since the Unix epoch
pub type Timestamp = i64;

/// Position of a candidate in its election's candidate list
pub type CandidateIndex = u32;

/// Caller identity (address, account name, key fingerprint, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Create new identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Election lifecycle status
///
/// Transitions only move forward: `NotCreated -> Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ElectionStatus {
    /// Identifier not assigned yet
    #[default]
    NotCreated = 0,
    /// Accepting ballots
    Open = 1,
    /// Closed by the administrator (terminal)
    Closed = 2,
}

impl ElectionStatus {
    /// Check if status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, ElectionStatus::Closed)
    }
}

impl fmt::Display for ElectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ElectionStatus::NotCreated => "not_created",
            ElectionStatus::Open => "open",
            ElectionStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Election record as seen through the query layer
///
/// Unknown identifiers read as [`Election::default`]: `NotCreated`, no
/// candidates, zero timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Election {
    /// Candidate names; the position is the candidate index used on ballots
    pub candidates: Vec<String>,

    /// Creation time
    pub start: Timestamp,

    /// Earliest time the election may be closed
    pub end: Timestamp,

    /// Lifecycle status
    pub status: ElectionStatus,
}

impl Election {
    /// Number of candidates
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Whether the deadline has elapsed at `now`
    pub fn deadline_elapsed(&self, now: Timestamp) -> bool {
        now >= self.end
    }
}

/// Per-voter, per-election ballot record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoterRecord {
    /// Set once, on the single successful vote
    pub has_voted: bool,

    /// Candidate indices, most preferred first
    pub choices: Vec<CandidateIndex>,
}
