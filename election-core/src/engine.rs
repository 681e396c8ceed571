//! Election engine
//!
//! Ties the registry, the voting ledger, the event log and metrics into one
//! state machine with a single transaction boundary.
//!
//! Every mutating method takes `&mut self` and runs to completion: it reads
//! the clock once, validates against live registry and ledger state, applies
//! the change and appends exactly one event. A failed call leaves no trace
//! except a rejection metric and a warning log line.
//!
//! # Example
//!
//! ```
//! use election_core::{Config, ElectionEngine, Identity, ManualClock};
//!
//! # fn main() -> election_core::Result<()> {
//! let clock = ManualClock::new(0);
//! let admin = Identity::new("admin");
//! let mut engine = ElectionEngine::new(Config::default(), admin.clone(), clock.clone())?;
//!
//! let id = engine.create_election(&admin, vec!["A".into(), "B".into()], 1)?;
//! engine.cast_vote(&Identity::new("voter"), id, vec![1, 0])?;
//!
//! clock.advance_days(1);
//! engine.close_election(&admin, id)?;
//! assert_eq!(engine.tally(id)?.winner_name(), Some("B"));
//! # Ok(())
//! # }
//! ```

use crate::{
    clock::Clock,
    events::{ElectionEvent, EventLog, LoggedEvent},
    ledger::VotingLedger,
    metrics::Metrics,
    registry::{ElectionDirectory, ElectionRegistry},
    tally::{instant_runoff, TallyResult},
    types::{CandidateIndex, Election, ElectionId, ElectionStatus, Identity, Timestamp},
    validation::BallotValidator,
    Config, Error, Result,
};
use tokio::sync::broadcast;

/// Election registry and voting ledger behind one transaction boundary
pub struct ElectionEngine<C: Clock> {
    /// Election catalog
    registry: ElectionRegistry,

    /// Ballot records
    ledger: VotingLedger,

    /// Audit trail
    events: EventLog,

    /// Metrics
    metrics: Metrics,

    /// Time source
    clock: C,

    /// Configuration
    config: Config,
}

impl<C: Clock> ElectionEngine<C> {
    /// Create engine administered by `admin`
    pub fn new(config: Config, admin: Identity, clock: C) -> Result<Self> {
        config.validate()?;

        let registry = ElectionRegistry::new(admin, config.election.seconds_per_day);
        let ledger = VotingLedger::new(
            BallotValidator::new(config.ballot.ranking),
            config.election.enforce_deadline_on_vote,
        );
        let events = EventLog::new(config.events.subscriber_capacity);
        let metrics = Metrics::new()?;

        Ok(Self {
            registry,
            ledger,
            events,
            metrics,
            clock,
            config,
        })
    }

    /// Replace the metrics collector (e.g. to share a registry with an exporter)
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Administrator identity
    pub fn admin(&self) -> &Identity {
        self.registry.admin()
    }

    /// Alias of [`ElectionEngine::admin`]
    pub fn owner(&self) -> &Identity {
        self.admin()
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current engine time
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn observe<T>(&self, operation: &'static str, caller: &Identity, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            self.metrics.record_rejection(e.kind());
            tracing::warn!(
                operation,
                caller = %caller,
                reason = e.kind(),
                error = %e,
                "Rejected call"
            );
        }
        result
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create an election (administrator only)
    pub fn create_election(
        &mut self,
        caller: &Identity,
        candidates: Vec<String>,
        duration_days: u64,
    ) -> Result<ElectionId> {
        let now = self.clock.now();
        let result = self
            .registry
            .create_election(caller, candidates, duration_days, now);
        let election_id = self.observe("create_election", caller, result)?;

        let election = self.registry.get_election(election_id);
        tracing::info!(
            election_id,
            candidates = election.candidate_count(),
            start = election.start,
            end = election.end,
            "Election created"
        );
        self.events.append(
            ElectionEvent::ElectionCreated {
                election_id,
                candidates: election.candidates,
                start: election.start,
                end: election.end,
            },
            now,
        );
        self.metrics.record_election_created();

        Ok(election_id)
    }

    /// Close an election whose deadline has elapsed (administrator only)
    pub fn close_election(&mut self, caller: &Identity, election_id: ElectionId) -> Result<()> {
        let now = self.clock.now();
        let result = self.registry.close_election(caller, election_id, now);
        self.observe("close_election", caller, result)?;

        tracing::info!(
            election_id,
            ballots = self.ledger.ballot_count(election_id),
            "Election closed"
        );
        self.events
            .append(ElectionEvent::ElectionClosed { election_id }, now);
        self.metrics.record_election_closed();

        Ok(())
    }

    /// Cast a ranked ballot of candidate indices
    pub fn cast_vote(
        &mut self,
        voter: &Identity,
        election_id: ElectionId,
        choices: Vec<CandidateIndex>,
    ) -> Result<()> {
        let now = self.clock.now();
        let result = self
            .ledger
            .cast_vote(&self.registry, voter, election_id, choices, now);
        let choices = self.observe("cast_vote", voter, result)?;
        self.record_vote(voter, election_id, choices, now);
        Ok(())
    }

    /// Cast a ranked ballot of literal candidate names
    pub fn cast_vote_by_name<S: AsRef<str>>(
        &mut self,
        voter: &Identity,
        election_id: ElectionId,
        names: &[S],
    ) -> Result<()> {
        let now = self.clock.now();
        let result = self
            .ledger
            .cast_vote_by_name(&self.registry, voter, election_id, names, now);
        let choices = self.observe("cast_vote_by_name", voter, result)?;
        self.record_vote(voter, election_id, choices, now);
        Ok(())
    }

    fn record_vote(
        &mut self,
        voter: &Identity,
        election_id: ElectionId,
        choices: Vec<CandidateIndex>,
        now: Timestamp,
    ) {
        tracing::info!(election_id, voter = %voter, "Vote cast");
        self.events.append(
            ElectionEvent::VoteCast {
                voter: voter.clone(),
                election_id,
                choices,
            },
            now,
        );
        self.metrics.record_vote_cast();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Election record (defaults for unknown ids)
    pub fn get_election(&self, election_id: ElectionId) -> Election {
        self.registry.get_election(election_id)
    }

    /// Election status (`NotCreated` for unknown ids)
    pub fn get_election_status(&self, election_id: ElectionId) -> ElectionStatus {
        self.registry.get_election_status(election_id)
    }

    /// Candidate names (empty for unknown ids)
    pub fn get_election_candidates(&self, election_id: ElectionId) -> Vec<String> {
        self.registry.get_election_candidates(election_id)
    }

    /// Start timestamp (zero for unknown ids)
    pub fn get_election_start_time(&self, election_id: ElectionId) -> Timestamp {
        self.registry.get_election_start_time(election_id)
    }

    /// End timestamp (zero for unknown ids)
    pub fn get_election_end_time(&self, election_id: ElectionId) -> Timestamp {
        self.registry.get_election_end_time(election_id)
    }

    /// Elections ever created
    pub fn get_election_count(&self) -> u64 {
        self.registry.get_election_count()
    }

    /// Open election ids
    pub fn get_open_elections(&self) -> Vec<ElectionId> {
        self.registry.get_open_elections()
    }

    /// Closed election ids
    pub fn get_closed_elections(&self) -> Vec<ElectionId> {
        self.registry.get_closed_elections()
    }

    /// A voter's ranked choices; `HasNotVoted` if they never voted
    pub fn get_voter_choices(
        &self,
        voter: &Identity,
        election_id: ElectionId,
    ) -> Result<Vec<CandidateIndex>> {
        self.ledger.get_voter_choices(voter, election_id)
    }

    /// Whether a voter has voted
    pub fn get_voter_status(&self, voter: &Identity, election_id: ElectionId) -> bool {
        self.ledger.get_voter_status(voter, election_id)
    }

    /// Ballots recorded for an election
    pub fn get_ballot_count(&self, election_id: ElectionId) -> u64 {
        self.ledger.ballot_count(election_id) as u64
    }

    /// Instant-runoff result of a closed election
    ///
    /// Ballots are only counted once the administrator has closed the
    /// election. Until then this fails with [`Error::ElectionStillOpen`], whose
    /// `ends_at` may already lie in the past if the deadline has elapsed but
    /// nobody has called [`ElectionEngine::close_election`] yet.
    pub fn tally(&self, election_id: ElectionId) -> Result<TallyResult> {
        let election = self
            .registry
            .election(election_id)
            .ok_or(Error::ElectionNotFound(election_id))?;

        if election.status != ElectionStatus::Closed {
            return Err(Error::ElectionStillOpen {
                election_id,
                ends_at: election.end,
            });
        }

        let (winner, rounds) =
            instant_runoff(election.candidate_count(), self.ledger.ballots(election_id));

        Ok(TallyResult {
            election_id,
            candidates: election.candidates.clone(),
            total_ballots: self.get_ballot_count(election_id),
            winner,
            rounds,
        })
    }

    // =========================================================================
    // AUDIT TRAIL
    // =========================================================================

    /// Event log
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Events emitted for one election, oldest first
    pub fn election_events(&self, election_id: ElectionId) -> Vec<LoggedEvent> {
        self.events
            .entries()
            .iter()
            .filter(|entry| entry.event.election_id() == election_id)
            .cloned()
            .collect()
    }

    /// Live feed of appended events
    pub fn subscribe(&self) -> broadcast::Receiver<LoggedEvent> {
        self.events.subscribe()
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
