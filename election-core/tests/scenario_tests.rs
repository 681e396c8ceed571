//! End-to-end election scenarios
//!
//! Drives a full election lifecycle through the engine directly and through
//! the actor handle, with a manual clock standing in for wall time.

use election_core::{
    spawn_engine_actor, Config, ElectionEngine, ElectionEvent, ElectionStatus, Error, Identity,
    ManualClock,
};

const START: i64 = 1_700_000_000;

fn candidates() -> Vec<String> {
    vec!["A".to_string(), "B".to_string(), "C".to_string()]
}

#[test]
fn test_single_election_lifecycle() {
    let clock = ManualClock::new(START);
    let admin = Identity::new("admin");
    let voter = Identity::new("V");
    let mut engine = ElectionEngine::new(Config::default(), admin.clone(), clock.clone()).unwrap();

    // Admin opens election 1
    let id = engine.create_election(&admin, candidates(), 1).unwrap();
    assert_eq!(id, 1);
    assert_eq!(engine.get_election_status(1), ElectionStatus::Open);
    assert_eq!(engine.get_open_elections(), vec![1]);

    // V ranks B, A, C
    engine.cast_vote_by_name(&voter, 1, &["B", "A", "C"]).unwrap();
    assert_eq!(engine.get_voter_choices(&voter, 1).unwrap(), vec![1, 0, 2]);
    assert!(engine.get_voter_status(&voter, 1));

    // Too early to close
    assert!(matches!(
        engine.close_election(&admin, 1),
        Err(Error::ElectionStillOpen { election_id: 1, .. })
    ));

    clock.advance_days(1);
    engine.close_election(&admin, 1).unwrap();
    assert_eq!(engine.get_election_status(1), ElectionStatus::Closed);
    assert!(engine.get_open_elections().is_empty());
    assert_eq!(engine.get_closed_elections(), vec![1]);

    // V retrying learns they already voted; a newcomer finds the polls shut
    assert!(matches!(
        engine.cast_vote_by_name(&voter, 1, &["A", "B", "C"]),
        Err(Error::AlreadyVoted { .. })
    ));
    assert!(matches!(
        engine.cast_vote(&Identity::new("W"), 1, vec![0, 1, 2]),
        Err(Error::ElectionClosed(1))
    ));
    assert_eq!(engine.get_voter_choices(&voter, 1).unwrap(), vec![1, 0, 2]);

    // Second close surfaces as a caller bug
    assert!(matches!(
        engine.close_election(&admin, 1),
        Err(Error::ElectionAlreadyClosed(1))
    ));

    let result = engine.tally(1).unwrap();
    assert_eq!(result.winner_name(), Some("B"));
    assert!(engine.events().verify_integrity().is_ok());
}

#[test]
fn test_non_admin_always_unauthorized() {
    let clock = ManualClock::new(START);
    let admin = Identity::new("admin");
    let mallory = Identity::new("mallory");
    let mut engine = ElectionEngine::new(Config::default(), admin.clone(), clock.clone()).unwrap();

    let id = engine.create_election(&admin, candidates(), 1).unwrap();
    clock.advance_days(5);

    for bad_candidates in [vec![], candidates(), vec!["x".to_string(); 6]] {
        assert!(matches!(
            engine.create_election(&mallory, bad_candidates, 1),
            Err(Error::Unauthorized { .. })
        ));
    }
    assert!(matches!(
        engine.close_election(&mallory, id),
        Err(Error::Unauthorized { .. })
    ));
    assert!(matches!(
        engine.close_election(&mallory, 999),
        Err(Error::Unauthorized { .. })
    ));

    assert_eq!(engine.get_election_count(), 1);
    assert_eq!(engine.get_election_status(id), ElectionStatus::Open);
}

#[test]
fn test_candidate_count_boundaries() {
    let admin = Identity::new("admin");
    let mut engine =
        ElectionEngine::new(Config::default(), admin.clone(), ManualClock::new(START)).unwrap();

    let names = |n: usize| (1..=n).map(|i| format!("Candidate {}", i)).collect::<Vec<_>>();

    assert!(matches!(
        engine.create_election(&admin, names(1), 1),
        Err(Error::InvalidCandidateCount(1))
    ));
    assert!(matches!(
        engine.create_election(&admin, names(6), 1),
        Err(Error::InvalidCandidateCount(6))
    ));
    assert_eq!(engine.create_election(&admin, names(2), 1).unwrap(), 1);
    assert_eq!(engine.create_election(&admin, names(5), 1).unwrap(), 2);
    assert_eq!(engine.get_election_count(), 2);
}

#[test]
fn test_election_record_matches_accessors() {
    let admin = Identity::new("admin");
    let mut engine =
        ElectionEngine::new(Config::default(), admin.clone(), ManualClock::new(START)).unwrap();
    let id = engine.create_election(&admin, candidates(), 3).unwrap();

    let election = engine.get_election(id);
    assert_eq!(election.candidates, engine.get_election_candidates(id));
    assert_eq!(election.start, engine.get_election_start_time(id));
    assert_eq!(election.end, engine.get_election_end_time(id));
    assert_eq!(election.status, engine.get_election_status(id));
    assert_eq!(election.end - election.start, 3 * 86_400);
}

#[test]
fn test_deadline_enforced_on_vote_when_configured() {
    let mut config = Config::default();
    config.election.enforce_deadline_on_vote = true;
    let clock = ManualClock::new(START);
    let admin = Identity::new("admin");
    let mut engine = ElectionEngine::new(config, admin.clone(), clock.clone()).unwrap();

    let id = engine.create_election(&admin, candidates(), 1).unwrap();
    clock.advance_days(1);

    // Not closed yet, but the window has passed
    assert_eq!(engine.get_election_status(id), ElectionStatus::Open);
    assert!(matches!(
        engine.cast_vote(&Identity::new("late"), id, vec![0, 1, 2]),
        Err(Error::ElectionClosed(_))
    ));
}

#[test]
fn test_instant_runoff_through_engine() {
    let clock = ManualClock::new(START);
    let admin = Identity::new("admin");
    let mut engine = ElectionEngine::new(Config::default(), admin.clone(), clock.clone()).unwrap();
    let id = engine.create_election(&admin, candidates(), 1).unwrap();

    // First preferences: A=2, B=2, C=1. C is eliminated and transfers to B.
    let ballots: [(&str, [u32; 3]); 5] = [
        ("v1", [0, 1, 2]),
        ("v2", [0, 2, 1]),
        ("v3", [1, 0, 2]),
        ("v4", [1, 2, 0]),
        ("v5", [2, 1, 0]),
    ];
    for (voter, choices) in ballots {
        engine
            .cast_vote(&Identity::new(voter), id, choices.to_vec())
            .unwrap();
    }

    clock.advance_days(1);
    engine.close_election(&admin, id).unwrap();

    let result = engine.tally(id).unwrap();
    assert_eq!(result.total_ballots, 5);
    assert_eq!(result.rounds.len(), 2);
    assert_eq!(result.rounds[0].eliminated, Some(2));
    assert_eq!(result.winner_name(), Some("B"));
}

#[tokio::test]
async fn test_lifecycle_through_actor() {
    let clock = ManualClock::new(START);
    let admin = Identity::new("admin");
    let engine = ElectionEngine::new(Config::default(), admin.clone(), clock.clone()).unwrap();
    let handle = spawn_engine_actor(engine);
    let mut feed = handle.subscribe().await.unwrap();

    let id = handle
        .create_election(admin.clone(), candidates(), 1)
        .await
        .unwrap();
    handle
        .cast_vote(Identity::new("V"), id, vec![1, 0, 2])
        .await
        .unwrap();

    clock.advance_days(1);
    handle.close_election(admin.clone(), id).await.unwrap();

    assert!(matches!(
        handle.cast_vote(Identity::new("W"), id, vec![0, 1, 2]).await,
        Err(Error::ElectionClosed(_))
    ));
    assert_eq!(handle.get_open_elections().await.unwrap(), Vec::<u64>::new());
    assert_eq!(handle.get_closed_elections().await.unwrap(), vec![id]);
    assert_eq!(handle.get_election_candidates(id).await.unwrap(), candidates());

    let mut seen = Vec::new();
    for _ in 0..3 {
        seen.push(feed.recv().await.unwrap().event);
    }
    assert!(matches!(seen[0], ElectionEvent::ElectionCreated { .. }));
    assert!(matches!(seen[1], ElectionEvent::VoteCast { .. }));
    assert_eq!(seen[2], ElectionEvent::ElectionClosed { election_id: id });

    handle.shutdown().await.unwrap();
}
