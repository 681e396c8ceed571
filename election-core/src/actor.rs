//! Actor-based concurrency for the engine
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the [`ElectionEngine`]; nothing else can touch its state
//! - Every call, read or write, is applied in mailbox order
//! - Async message passing with backpressure
//!
//! Because reads queue behind writes, a query always observes the state
//! strictly before or strictly after any given mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │         Admin tooling / voter front-ends              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               EngineHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              EngineActor (Single Task)                │
//! │   ElectionRegistry + VotingLedger + EventLog          │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::clock::Clock;
use crate::engine::ElectionEngine;
use crate::events::LoggedEvent;
use crate::tally::TallyResult;
use crate::types::{CandidateIndex, Election, ElectionId, ElectionStatus, Identity, Timestamp};
use crate::{Error, Result};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Message sent to the engine actor
pub enum EngineMessage {
    /// Create an election
    CreateElection {
        caller: Identity,
        candidates: Vec<String>,
        duration_days: u64,
        response: oneshot::Sender<Result<ElectionId>>,
    },

    /// Close an election
    CloseElection {
        caller: Identity,
        election_id: ElectionId,
        response: oneshot::Sender<Result<()>>,
    },

    /// Cast a ballot of candidate indices
    CastVote {
        voter: Identity,
        election_id: ElectionId,
        choices: Vec<CandidateIndex>,
        response: oneshot::Sender<Result<()>>,
    },

    /// Cast a ballot of candidate names
    CastVoteByName {
        voter: Identity,
        election_id: ElectionId,
        names: Vec<String>,
        response: oneshot::Sender<Result<()>>,
    },

    /// Get election record
    GetElection {
        election_id: ElectionId,
        response: oneshot::Sender<Election>,
    },

    /// Get election count
    GetElectionCount {
        response: oneshot::Sender<u64>,
    },

    /// Get open election ids
    GetOpenElections {
        response: oneshot::Sender<Vec<ElectionId>>,
    },

    /// Get closed election ids
    GetClosedElections {
        response: oneshot::Sender<Vec<ElectionId>>,
    },

    /// Get a voter's choices
    GetVoterChoices {
        voter: Identity,
        election_id: ElectionId,
        response: oneshot::Sender<Result<Vec<CandidateIndex>>>,
    },

    /// Get a voter's status
    GetVoterStatus {
        voter: Identity,
        election_id: ElectionId,
        response: oneshot::Sender<bool>,
    },

    /// Get ballot count
    GetBallotCount {
        election_id: ElectionId,
        response: oneshot::Sender<u64>,
    },

    /// Tally a closed election
    Tally {
        election_id: ElectionId,
        response: oneshot::Sender<Result<TallyResult>>,
    },

    /// Get administrator identity
    GetAdmin {
        response: oneshot::Sender<Identity>,
    },

    /// Snapshot of the event log
    GetEvents {
        response: oneshot::Sender<Vec<LoggedEvent>>,
    },

    /// Subscribe to appended events
    Subscribe {
        response: oneshot::Sender<broadcast::Receiver<LoggedEvent>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the engine
pub struct EngineActor<C: Clock> {
    /// Engine state
    engine: ElectionEngine<C>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<EngineMessage>,
}

impl<C: Clock> EngineActor<C> {
    /// Create new actor
    pub fn new(engine: ElectionEngine<C>, mailbox: mpsc::Receiver<EngineMessage>) -> Self {
        Self { engine, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if let EngineMessage::Shutdown = msg {
                tracing::info!("Engine actor shutting down");
                break;
            }
            self.handle_message(msg);
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: EngineMessage) {
        let engine = &mut self.engine;

        // A dropped response receiver means the caller gave up; the call
        // itself has already been applied or rejected.
        match msg {
            EngineMessage::CreateElection {
                caller,
                candidates,
                duration_days,
                response,
            } => {
                let _ = response.send(engine.create_election(&caller, candidates, duration_days));
            }

            EngineMessage::CloseElection {
                caller,
                election_id,
                response,
            } => {
                let _ = response.send(engine.close_election(&caller, election_id));
            }

            EngineMessage::CastVote {
                voter,
                election_id,
                choices,
                response,
            } => {
                let _ = response.send(engine.cast_vote(&voter, election_id, choices));
            }

            EngineMessage::CastVoteByName {
                voter,
                election_id,
                names,
                response,
            } => {
                let _ = response.send(engine.cast_vote_by_name(&voter, election_id, &names));
            }

            EngineMessage::GetElection {
                election_id,
                response,
            } => {
                let _ = response.send(engine.get_election(election_id));
            }

            EngineMessage::GetElectionCount { response } => {
                let _ = response.send(engine.get_election_count());
            }

            EngineMessage::GetOpenElections { response } => {
                let _ = response.send(engine.get_open_elections());
            }

            EngineMessage::GetClosedElections { response } => {
                let _ = response.send(engine.get_closed_elections());
            }

            EngineMessage::GetVoterChoices {
                voter,
                election_id,
                response,
            } => {
                let _ = response.send(engine.get_voter_choices(&voter, election_id));
            }

            EngineMessage::GetVoterStatus {
                voter,
                election_id,
                response,
            } => {
                let _ = response.send(engine.get_voter_status(&voter, election_id));
            }

            EngineMessage::GetBallotCount {
                election_id,
                response,
            } => {
                let _ = response.send(engine.get_ballot_count(election_id));
            }

            EngineMessage::Tally {
                election_id,
                response,
            } => {
                let _ = response.send(engine.tally(election_id));
            }

            EngineMessage::GetAdmin { response } => {
                let _ = response.send(engine.admin().clone());
            }

            EngineMessage::GetEvents { response } => {
                let _ = response.send(engine.events().entries().to_vec());
            }

            EngineMessage::Subscribe { response } => {
                let _ = response.send(engine.subscribe());
            }

            EngineMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineMessage>,
}

impl EngineHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<EngineMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Create an election
    pub async fn create_election(
        &self,
        caller: Identity,
        candidates: Vec<String>,
        duration_days: u64,
    ) -> Result<ElectionId> {
        self.request(|response| EngineMessage::CreateElection {
            caller,
            candidates,
            duration_days,
            response,
        })
        .await?
    }

    /// Close an election
    pub async fn close_election(&self, caller: Identity, election_id: ElectionId) -> Result<()> {
        self.request(|response| EngineMessage::CloseElection {
            caller,
            election_id,
            response,
        })
        .await?
    }

    /// Cast a ballot of candidate indices
    pub async fn cast_vote(
        &self,
        voter: Identity,
        election_id: ElectionId,
        choices: Vec<CandidateIndex>,
    ) -> Result<()> {
        self.request(|response| EngineMessage::CastVote {
            voter,
            election_id,
            choices,
            response,
        })
        .await?
    }

    /// Cast a ballot of candidate names
    pub async fn cast_vote_by_name(
        &self,
        voter: Identity,
        election_id: ElectionId,
        names: Vec<String>,
    ) -> Result<()> {
        self.request(|response| EngineMessage::CastVoteByName {
            voter,
            election_id,
            names,
            response,
        })
        .await?
    }

    /// Election record
    pub async fn get_election(&self, election_id: ElectionId) -> Result<Election> {
        self.request(|response| EngineMessage::GetElection {
            election_id,
            response,
        })
        .await
    }

    /// Election status
    pub async fn get_election_status(&self, election_id: ElectionId) -> Result<ElectionStatus> {
        Ok(self.get_election(election_id).await?.status)
    }

    /// Candidate names
    pub async fn get_election_candidates(&self, election_id: ElectionId) -> Result<Vec<String>> {
        Ok(self.get_election(election_id).await?.candidates)
    }

    /// Start timestamp
    pub async fn get_election_start_time(&self, election_id: ElectionId) -> Result<Timestamp> {
        Ok(self.get_election(election_id).await?.start)
    }

    /// End timestamp
    pub async fn get_election_end_time(&self, election_id: ElectionId) -> Result<Timestamp> {
        Ok(self.get_election(election_id).await?.end)
    }

    /// Elections ever created
    pub async fn get_election_count(&self) -> Result<u64> {
        self.request(|response| EngineMessage::GetElectionCount { response })
            .await
    }

    /// Open election ids
    pub async fn get_open_elections(&self) -> Result<Vec<ElectionId>> {
        self.request(|response| EngineMessage::GetOpenElections { response })
            .await
    }

    /// Closed election ids
    pub async fn get_closed_elections(&self) -> Result<Vec<ElectionId>> {
        self.request(|response| EngineMessage::GetClosedElections { response })
            .await
    }

    /// A voter's ranked choices
    pub async fn get_voter_choices(
        &self,
        voter: Identity,
        election_id: ElectionId,
    ) -> Result<Vec<CandidateIndex>> {
        self.request(|response| EngineMessage::GetVoterChoices {
            voter,
            election_id,
            response,
        })
        .await?
    }

    /// Whether a voter has voted
    pub async fn get_voter_status(&self, voter: Identity, election_id: ElectionId) -> Result<bool> {
        self.request(|response| EngineMessage::GetVoterStatus {
            voter,
            election_id,
            response,
        })
        .await
    }

    /// Ballots recorded for an election
    pub async fn get_ballot_count(&self, election_id: ElectionId) -> Result<u64> {
        self.request(|response| EngineMessage::GetBallotCount {
            election_id,
            response,
        })
        .await
    }

    /// Instant-runoff result of a closed election
    pub async fn tally(&self, election_id: ElectionId) -> Result<TallyResult> {
        self.request(|response| EngineMessage::Tally {
            election_id,
            response,
        })
        .await?
    }

    /// Administrator identity
    pub async fn owner(&self) -> Result<Identity> {
        self.request(|response| EngineMessage::GetAdmin { response })
            .await
    }

    /// Snapshot of the event log
    pub async fn events(&self) -> Result<Vec<LoggedEvent>> {
        self.request(|response| EngineMessage::GetEvents { response })
            .await
    }

    /// Subscribe to appended events
    pub async fn subscribe(&self) -> Result<broadcast::Receiver<LoggedEvent>> {
        self.request(|response| EngineMessage::Subscribe { response })
            .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(EngineMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the engine actor
pub fn spawn_engine_actor<C: Clock>(engine: ElectionEngine<C>) -> EngineHandle {
    let capacity = engine.config().actor.mailbox_capacity;
    let (tx, rx) = mpsc::channel(capacity); // Bounded channel for backpressure
    let actor = EngineActor::new(engine, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    EngineHandle::new(tx)
}
