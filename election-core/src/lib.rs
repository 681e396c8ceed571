//! Election Core
//!
//! Election registry and ranked-choice voting ledger.
//!
//! # Architecture
//!
//! - **Registry**: Elections with 2-5 candidates and a fixed time window
//! - **Voting Ledger**: One ranked ballot per voter per election
//! - **Single Writer**: One actor task owns all state; calls apply in order
//! - **Audit Trail**: Hash-chained, append-only event log
//! - **Tally**: Instant-runoff with lowest-index tie-break
//!
//! # Invariants
//!
//! - Status moves only NotCreated → Open → Closed
//! - A voter's ballot is written once and never changes
//! - Open and closed id sets partition all created ids
//! - Exactly one event per successful mutation, none on failure

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all
)]

pub mod types;
pub mod error;
pub mod config;
pub mod clock;
pub mod validation;
pub mod registry;
pub mod ledger;
pub mod events;
pub mod tally;
pub mod engine;
pub mod actor;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    CandidateIndex, Election, ElectionId, ElectionStatus, Identity, Timestamp, VoterRecord,
};
pub use config::{Config, RankingPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::ElectionEngine;
pub use events::{ElectionEvent, EventLog, LoggedEvent};
pub use tally::{TallyResult, TallyRound};
pub use actor::{spawn_engine_actor, EngineHandle};
