//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the engine.
//!
//! # Metrics
//!
//! - `election_elections_created_total` - Elections created
//! - `election_elections_closed_total` - Elections closed
//! - `election_votes_cast_total` - Ballots recorded
//! - `election_operations_rejected_total{reason}` - Mutating calls that failed
//! - `election_open_elections` - Elections currently open

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Each collector owns its own registry, so several engines (or tests) can
/// coexist in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Elections created
    pub elections_created: IntCounter,

    /// Elections closed
    pub elections_closed: IntCounter,

    /// Ballots recorded
    pub votes_cast: IntCounter,

    /// Rejected mutating calls by error kind
    pub operations_rejected: IntCounterVec,

    /// Elections currently open
    pub open_elections: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let elections_created = IntCounter::new(
            "election_elections_created_total",
            "Total number of elections created",
        )?;
        registry.register(Box::new(elections_created.clone()))?;

        let elections_closed = IntCounter::new(
            "election_elections_closed_total",
            "Total number of elections closed",
        )?;
        registry.register(Box::new(elections_closed.clone()))?;

        let votes_cast =
            IntCounter::new("election_votes_cast_total", "Total number of ballots recorded")?;
        registry.register(Box::new(votes_cast.clone()))?;

        let operations_rejected = IntCounterVec::new(
            Opts::new(
                "election_operations_rejected_total",
                "Mutating calls rejected, by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(operations_rejected.clone()))?;

        let open_elections =
            IntGauge::new("election_open_elections", "Number of elections currently open")?;
        registry.register(Box::new(open_elections.clone()))?;

        Ok(Self {
            elections_created,
            elections_closed,
            votes_cast,
            operations_rejected,
            open_elections,
            registry,
        })
    }

    /// Record election creation
    pub fn record_election_created(&self) {
        self.elections_created.inc();
        self.open_elections.inc();
    }

    /// Record election close
    pub fn record_election_closed(&self) {
        self.elections_closed.inc();
        self.open_elections.dec();
    }

    /// Record ballot
    pub fn record_vote_cast(&self) {
        self.votes_cast.inc();
    }

    /// Record rejected call
    pub fn record_rejection(&self, reason: &str) {
        self.operations_rejected.with_label_values(&[reason]).inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
