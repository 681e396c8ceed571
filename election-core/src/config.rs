//! Configuration for the election engine

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Administrator identity used by the node binary
    pub admin: String,

    /// Election lifecycle configuration
    pub election: ElectionConfig,

    /// Ballot shape configuration
    pub ballot: BallotConfig,

    /// Actor configuration
    pub actor: ActorConfig,

    /// Event log configuration
    pub events: EventLogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "election-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            admin: "admin".to_string(),
            election: ElectionConfig::default(),
            ballot: BallotConfig::default(),
            actor: ActorConfig::default(),
            events: EventLogConfig::default(),
        }
    }
}

/// Election lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// Length of one "day" in clock units (seconds)
    pub seconds_per_day: i64,

    /// Reject ballots once the deadline has passed, even before the election is closed
    pub enforce_deadline_on_vote: bool,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: 86_400,
            enforce_deadline_on_vote: false,
        }
    }
}

/// Which rankings a ballot may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Every candidate ranked exactly once
    #[default]
    Full,
    /// Any non-empty ranking of distinct candidates
    Partial,
}

impl std::str::FromStr for RankingPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(RankingPolicy::Full),
            "partial" => Ok(RankingPolicy::Partial),
            other => Err(crate::Error::Config(format!(
                "Unknown ranking policy: {}",
                other
            ))),
        }
    }
}

/// Ballot shape configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BallotConfig {
    /// Ranking policy
    pub ranking: RankingPolicy,
}

/// Actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Bounded mailbox size (backpressure)
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
        }
    }
}

/// Event log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Broadcast buffer per subscriber before it starts lagging
    pub subscriber_capacity: usize,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: 1024,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(admin) = std::env::var("ELECTION_ADMIN") {
            config.admin = admin;
        }

        if let Ok(secs) = std::env::var("ELECTION_SECONDS_PER_DAY") {
            config.election.seconds_per_day = secs.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid ELECTION_SECONDS_PER_DAY: {}", e))
            })?;
        }

        if let Ok(ranking) = std::env::var("ELECTION_RANKING") {
            config.ballot.ranking = ranking.parse()?;
        }

        if let Ok(flag) = std::env::var("ELECTION_ENFORCE_DEADLINE") {
            config.election.enforce_deadline_on_vote = flag.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid ELECTION_ENFORCE_DEADLINE: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.election.seconds_per_day <= 0 {
            return Err(crate::Error::Config(
                "seconds_per_day must be positive".to_string(),
            ));
        }
        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "mailbox_capacity must be positive".to_string(),
            ));
        }
        if self.events.subscriber_capacity == 0 {
            return Err(crate::Error::Config(
                "subscriber_capacity must be positive".to_string(),
            ));
        }
        if self.admin.is_empty() {
            return Err(crate::Error::Config("admin must not be empty".to_string()));
        }
        Ok(())
    }
}
