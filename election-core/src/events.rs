//! Append-only audit trail
//!
//! Every successful mutating call appends exactly one [`ElectionEvent`].
//! Entries are hash-chained: each entry's hash covers its own contents and
//! the previous entry's hash, so editing, dropping or reordering any entry
//! breaks [`verify_chain`] from that point on.
//!
//! The engine only writes here. External tooling reads entries, exports them
//! as JSON lines, or subscribes to a live broadcast feed.

use crate::types::{CandidateIndex, ElectionId, Identity, Timestamp};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::{BufRead, Write};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Domain event emitted by a successful mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionEvent {
    /// Election created and opened
    ElectionCreated {
        /// New election id
        election_id: ElectionId,
        /// Candidate names in index order
        candidates: Vec<String>,
        /// Start timestamp
        start: Timestamp,
        /// End timestamp
        end: Timestamp,
    },

    /// Election closed
    ElectionClosed {
        /// Closed election id
        election_id: ElectionId,
    },

    /// Ballot recorded
    VoteCast {
        /// Voter identity
        voter: Identity,
        /// Election id
        election_id: ElectionId,
        /// Ranked candidate indices
        choices: Vec<CandidateIndex>,
    },
}

impl ElectionEvent {
    /// Election this event belongs to
    pub fn election_id(&self) -> ElectionId {
        match self {
            ElectionEvent::ElectionCreated { election_id, .. }
            | ElectionEvent::ElectionClosed { election_id }
            | ElectionEvent::VoteCast { election_id, .. } => *election_id,
        }
    }

    /// Short event name
    pub fn name(&self) -> &'static str {
        match self {
            ElectionEvent::ElectionCreated { .. } => "ElectionCreated",
            ElectionEvent::ElectionClosed { .. } => "ElectionClosed",
            ElectionEvent::VoteCast { .. } => "VoteCast",
        }
    }
}

/// Event as stored in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at 0
    pub sequence: u64,

    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Engine clock at append time
    pub recorded_at: Timestamp,

    /// Payload
    pub event: ElectionEvent,

    /// Hash of the previous entry (empty for the first)
    pub previous_hash: String,

    /// Hash of this entry
    pub hash: String,
}

impl LoggedEvent {
    /// Create canonical bytes for hashing
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Deterministic serialization, previous_hash and hash excluded
        bincode::serialize(&(
            self.sequence,
            self.event_id.as_bytes(),
            self.recorded_at,
            &self.event,
        ))
        .expect("serialization cannot fail")
    }

    fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        hasher.update(self.previous_hash.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check the stored hash against the entry contents
    pub fn verify_hash(&self) -> bool {
        self.hash == self.compute_hash()
    }
}

/// Verify a sequence of entries forms an unbroken chain from genesis
pub fn verify_chain(entries: &[LoggedEvent]) -> Result<()> {
    let mut previous_hash = String::new();

    for (position, entry) in entries.iter().enumerate() {
        if entry.sequence != position as u64 {
            return Err(Error::Integrity(format!(
                "Sequence gap at position {}: found {}",
                position, entry.sequence
            )));
        }
        if entry.previous_hash != previous_hash {
            return Err(Error::Integrity(format!(
                "Broken link at sequence {}",
                entry.sequence
            )));
        }
        if !entry.verify_hash() {
            return Err(Error::Integrity(format!(
                "Event hash mismatch at sequence {}",
                entry.sequence
            )));
        }
        previous_hash = entry.hash.clone();
    }

    Ok(())
}

/// Parse entries previously written by [`EventLog::export_json_lines`]
pub fn read_json_lines(reader: impl BufRead) -> Result<Vec<LoggedEvent>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LoggedEvent = serde_json::from_str(&line).map_err(std::io::Error::from)?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Hash-chained, append-only event log
#[derive(Debug)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
    sender: broadcast::Sender<LoggedEvent>,
}

impl EventLog {
    /// Create empty log; `subscriber_capacity` bounds each subscriber's backlog
    pub fn new(subscriber_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(subscriber_capacity.max(1));
        Self {
            entries: Vec::new(),
            sender,
        }
    }

    /// Append an event and publish it to subscribers
    pub fn append(&mut self, event: ElectionEvent, recorded_at: Timestamp) -> &LoggedEvent {
        let mut entry = LoggedEvent {
            sequence: self.entries.len() as u64,
            event_id: Uuid::now_v7(),
            recorded_at,
            event,
            previous_hash: self.last_hash().to_string(),
            hash: String::new(),
        };
        entry.hash = entry.compute_hash();

        tracing::debug!(
            sequence = entry.sequence,
            event = entry.event.name(),
            election_id = entry.event.election_id(),
            "Appended event"
        );

        // No subscribers is not an error
        let _ = self.sender.send(entry.clone());
        self.entries.push(entry);

        &self.entries[self.entries.len() - 1]
    }

    /// Live feed of appended events
    pub fn subscribe(&self) -> broadcast::Receiver<LoggedEvent> {
        self.sender.subscribe()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of the newest entry (empty when the log is empty)
    pub fn last_hash(&self) -> &str {
        self.entries.last().map(|e| e.hash.as_str()).unwrap_or("")
    }

    /// Verify the whole chain
    pub fn verify_integrity(&self) -> Result<()> {
        verify_chain(&self.entries)
    }

    /// Write every entry as one JSON object per line
    pub fn export_json_lines(&self, mut writer: impl Write) -> Result<()> {
        for entry in &self.entries {
            serde_json::to_writer(&mut writer, entry).map_err(std::io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(id: ElectionId) -> ElectionEvent {
        ElectionEvent::ElectionCreated {
            election_id: id,
            candidates: vec!["A".to_string(), "B".to_string()],
            start: 0,
            end: 86_400,
        }
    }

    fn sample_log() -> EventLog {
        let mut log = EventLog::new(16);
        log.append(created(1), 0);
        log.append(
            ElectionEvent::VoteCast {
                voter: Identity::new("v1"),
                election_id: 1,
                choices: vec![1, 0],
            },
            10,
        );
        log.append(ElectionEvent::ElectionClosed { election_id: 1 }, 86_400);
        log
    }

    #[test]
    fn test_chain_links() {
        let log = sample_log();
        let entries = log.entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].previous_hash, "");
        assert_eq!(entries[1].previous_hash, entries[0].hash);
        assert_eq!(entries[2].previous_hash, entries[1].hash);
        assert_eq!(log.last_hash(), entries[2].hash);
        assert!(log.verify_integrity().is_ok());
    }

    #[test]
    fn test_tampered_payload_detected() {
        let log = sample_log();
        let mut entries = log.entries().to_vec();

        entries[1].event = ElectionEvent::VoteCast {
            voter: Identity::new("v1"),
            election_id: 1,
            choices: vec![0, 1],
        };

        let err = verify_chain(&entries).unwrap_err();
        assert!(err.to_string().contains("sequence 1"));
    }

    #[test]
    fn test_dropped_entry_detected() {
        let log = sample_log();
        let mut entries = log.entries().to_vec();
        entries.remove(1);

        assert!(matches!(verify_chain(&entries), Err(Error::Integrity(_))));
    }

    #[test]
    fn test_json_lines_roundtrip_verifies() {
        let log = sample_log();
        let mut buffer = Vec::new();
        log.export_json_lines(&mut buffer).unwrap();

        let entries = read_json_lines(buffer.as_slice()).unwrap();
        assert_eq!(entries, log.entries());
        assert!(verify_chain(&entries).is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_receive_appends() {
        let mut log = EventLog::new(16);
        let mut feed = log.subscribe();

        log.append(created(1), 0);

        let received = feed.recv().await.unwrap();
        assert_eq!(received.sequence, 0);
        assert_eq!(received.event.name(), "ElectionCreated");
    }
}
