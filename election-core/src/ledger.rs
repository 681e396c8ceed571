//! Voting ledger
//!
//! Per-voter, per-election ballot records and the single-vote rule.
//!
//! A ballot is accepted only after it has been checked against the registry's
//! live state through [`ElectionDirectory`]. Checks run in this order:
//!
//! 1. the election exists (`ElectionNotFound`)
//! 2. the voter holds no ballot for it (`AlreadyVoted`)
//! 3. the election is open (`ElectionClosed`)
//! 4. the ranking is well formed (`InvalidBallot`)
//!
//! The duplicate check comes before the status check so a voter retrying
//! after close learns they already voted rather than that polls are shut.

use crate::registry::ElectionDirectory;
use crate::types::{
    CandidateIndex, Election, ElectionId, ElectionStatus, Identity, Timestamp, VoterRecord,
};
use crate::validation::{resolve_names, BallotValidator};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Ballot records keyed by election, then voter
#[derive(Debug)]
pub struct VotingLedger {
    /// Records exist only for voters who voted successfully
    records: BTreeMap<(ElectionId, Identity), VoterRecord>,

    /// Ranking rules
    validator: BallotValidator,

    /// Treat an elapsed deadline like a closed election
    enforce_deadline: bool,
}

impl VotingLedger {
    /// Create empty ledger
    pub fn new(validator: BallotValidator, enforce_deadline: bool) -> Self {
        Self {
            records: BTreeMap::new(),
            validator,
            enforce_deadline,
        }
    }

    /// Record `voter`'s ranked ballot for `election_id`
    ///
    /// Nothing is written unless every check passes.
    pub fn cast_vote<D: ElectionDirectory>(
        &mut self,
        directory: &D,
        voter: &Identity,
        election_id: ElectionId,
        choices: Vec<CandidateIndex>,
        now: Timestamp,
    ) -> Result<Vec<CandidateIndex>> {
        self.record(directory, voter, election_id, now, |_| Ok(choices))
    }

    /// Record a ballot given as literal candidate names
    ///
    /// Names resolve against the election's candidate list after the
    /// lifecycle checks, so an unknown name never masks `AlreadyVoted` or
    /// `ElectionClosed`.
    pub fn cast_vote_by_name<D: ElectionDirectory, S: AsRef<str>>(
        &mut self,
        directory: &D,
        voter: &Identity,
        election_id: ElectionId,
        names: &[S],
        now: Timestamp,
    ) -> Result<Vec<CandidateIndex>> {
        self.record(directory, voter, election_id, now, |election| {
            resolve_names(&election.candidates, names)
        })
    }

    fn record<D, F>(
        &mut self,
        directory: &D,
        voter: &Identity,
        election_id: ElectionId,
        now: Timestamp,
        choices: F,
    ) -> Result<Vec<CandidateIndex>>
    where
        D: ElectionDirectory,
        F: FnOnce(&Election) -> Result<Vec<CandidateIndex>>,
    {
        let election = directory
            .election(election_id)
            .filter(|e| e.status != ElectionStatus::NotCreated)
            .ok_or(Error::ElectionNotFound(election_id))?;

        let key = (election_id, voter.clone());
        if self.records.get(&key).is_some_and(|r| r.has_voted) {
            return Err(Error::AlreadyVoted {
                voter: voter.clone(),
                election_id,
            });
        }

        let closed = election.status == ElectionStatus::Closed
            || (self.enforce_deadline && election.deadline_elapsed(now));
        if closed {
            return Err(Error::ElectionClosed(election_id));
        }

        let choices = choices(election)?;
        self.validator.validate(&choices, election.candidate_count())?;

        self.records.insert(
            key,
            VoterRecord {
                has_voted: true,
                choices: choices.clone(),
            },
        );
        Ok(choices)
    }

    /// Ranked choices of a voter who has voted
    pub fn get_voter_choices(
        &self,
        voter: &Identity,
        election_id: ElectionId,
    ) -> Result<Vec<CandidateIndex>> {
        self.records
            .get(&(election_id, voter.clone()))
            .filter(|r| r.has_voted)
            .map(|r| r.choices.clone())
            .ok_or_else(|| Error::HasNotVoted {
                voter: voter.clone(),
                election_id,
            })
    }

    /// Whether `voter` has voted in `election_id`
    pub fn get_voter_status(&self, voter: &Identity, election_id: ElectionId) -> bool {
        self.records
            .get(&(election_id, voter.clone()))
            .is_some_and(|r| r.has_voted)
    }

    /// All recorded rankings for an election, ordered by voter identity
    pub fn ballots(&self, election_id: ElectionId) -> impl Iterator<Item = &[CandidateIndex]> {
        self.records
            .range((election_id, Identity::new(String::new()))..)
            .take_while(move |((id, _), _)| *id == election_id)
            .filter(|(_, record)| record.has_voted)
            .map(|(_, record)| record.choices.as_slice())
    }

    /// Number of ballots recorded for an election
    pub fn ballot_count(&self, election_id: ElectionId) -> usize {
        self.ballots(election_id).count()
    }
}
