//! Election registry
//!
//! Owns the election catalog, each election's time window and lifecycle
//! status, and the open/closed index sets.
//!
//! # Invariants
//!
//! - Identifiers are assigned sequentially from 1 and never reused
//! - Status only moves `NotCreated -> Open -> Closed`
//! - Every created id is in exactly one of the open/closed sets
//! - Elections are never deleted
//! - Only the administrator fixed at construction may mutate

use crate::types::{Election, ElectionId, ElectionStatus, Identity, Timestamp};
use crate::validation::{validate_candidates, validate_duration};
use crate::{Error, Result};

/// Read access to live election state
///
/// The voting ledger validates every ballot through this trait so it always
/// sees the registry's current state, never a copy.
pub trait ElectionDirectory {
    /// Election by id, `None` if never created
    fn election(&self, election_id: ElectionId) -> Option<&Election>;
}

/// Catalog of elections and their lifecycle
#[derive(Debug)]
pub struct ElectionRegistry {
    /// Administrator identity (immutable)
    admin: Identity,

    /// Elections indexed by `id - 1`
    elections: Vec<Election>,

    /// Open election ids, in creation order
    open: Vec<ElectionId>,

    /// Closed election ids, in closing order
    closed: Vec<ElectionId>,

    /// Clock units per day
    seconds_per_day: i64,
}

impl ElectionRegistry {
    /// Create an empty registry administered by `admin`
    pub fn new(admin: Identity, seconds_per_day: i64) -> Self {
        Self {
            admin,
            elections: Vec::new(),
            open: Vec::new(),
            closed: Vec::new(),
            seconds_per_day,
        }
    }

    /// Administrator identity
    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    fn ensure_admin(&self, caller: &Identity) -> Result<()> {
        if caller != &self.admin {
            return Err(Error::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Create a new open election and return its id
    ///
    /// The candidate order is kept verbatim: it defines the candidate indices
    /// ballots refer to.
    pub fn create_election(
        &mut self,
        caller: &Identity,
        candidates: Vec<String>,
        duration_days: u64,
        now: Timestamp,
    ) -> Result<ElectionId> {
        self.ensure_admin(caller)?;
        validate_candidates(&candidates)?;
        validate_duration(duration_days)?;

        let end = i64::try_from(duration_days)
            .ok()
            .and_then(|days| days.checked_mul(self.seconds_per_day))
            .and_then(|span| now.checked_add(span))
            .ok_or(Error::InvalidDuration(duration_days))?;

        let election_id = self.elections.len() as ElectionId + 1;
        self.elections.push(Election {
            candidates,
            start: now,
            end,
            status: ElectionStatus::Open,
        });
        self.open.push(election_id);

        Ok(election_id)
    }

    /// Close an open election whose deadline has elapsed
    ///
    /// A second close fails with [`Error::ElectionAlreadyClosed`].
    pub fn close_election(
        &mut self,
        caller: &Identity,
        election_id: ElectionId,
        now: Timestamp,
    ) -> Result<()> {
        self.ensure_admin(caller)?;

        let index = self.index_of(election_id)?;
        let election = &self.elections[index];
        match election.status {
            ElectionStatus::Closed => return Err(Error::ElectionAlreadyClosed(election_id)),
            ElectionStatus::NotCreated => return Err(Error::ElectionNotFound(election_id)),
            ElectionStatus::Open => {}
        }
        if !election.deadline_elapsed(now) {
            return Err(Error::ElectionStillOpen {
                election_id,
                ends_at: election.end,
            });
        }

        let position = self
            .open
            .iter()
            .position(|id| *id == election_id)
            .ok_or_else(|| {
                Error::Integrity(format!("open election {} missing from open set", election_id))
            })?;

        self.elections[index].status = ElectionStatus::Closed;
        self.open.remove(position);
        self.closed.push(election_id);

        Ok(())
    }

    fn index_of(&self, election_id: ElectionId) -> Result<usize> {
        usize::try_from(election_id)
            .ok()
            .filter(|&id| id >= 1 && id <= self.elections.len())
            .map(|id| id - 1)
            .ok_or(Error::ElectionNotFound(election_id))
    }

    /// Full election record (defaults for unknown ids)
    pub fn get_election(&self, election_id: ElectionId) -> Election {
        self.election(election_id).cloned().unwrap_or_default()
    }

    /// Election status (`NotCreated` for unknown ids)
    pub fn get_election_status(&self, election_id: ElectionId) -> ElectionStatus {
        self.election(election_id)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    /// Candidate names (empty for unknown ids)
    pub fn get_election_candidates(&self, election_id: ElectionId) -> Vec<String> {
        self.election(election_id)
            .map(|e| e.candidates.clone())
            .unwrap_or_default()
    }

    /// Start timestamp (zero for unknown ids)
    pub fn get_election_start_time(&self, election_id: ElectionId) -> Timestamp {
        self.election(election_id).map(|e| e.start).unwrap_or(0)
    }

    /// End timestamp (zero for unknown ids)
    pub fn get_election_end_time(&self, election_id: ElectionId) -> Timestamp {
        self.election(election_id).map(|e| e.end).unwrap_or(0)
    }

    /// Number of elections ever created
    pub fn get_election_count(&self) -> u64 {
        self.elections.len() as u64
    }

    /// Open election ids
    pub fn get_open_elections(&self) -> Vec<ElectionId> {
        self.open.clone()
    }

    /// Closed election ids
    pub fn get_closed_elections(&self) -> Vec<ElectionId> {
        self.closed.clone()
    }
}

impl ElectionDirectory for ElectionRegistry {
    fn election(&self, election_id: ElectionId) -> Option<&Election> {
        self.index_of(election_id)
            .ok()
            .and_then(|index| self.elections.get(index))
    }
}
