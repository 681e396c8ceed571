//! Instant-runoff tally
//!
//! Each round counts every ballot for its highest-ranked candidate still in
//! the race. A candidate holding a strict majority of the non-exhausted
//! ballots wins. Otherwise the candidate with the fewest votes is eliminated
//! and the next round redistributes its ballots.
//!
//! Exactly one candidate is eliminated per round. Ties for fewest votes are
//! broken by eliminating the lowest candidate index, so the outcome depends
//! only on the multiset of ballots.

use crate::types::{CandidateIndex, ElectionId};
use serde::{Deserialize, Serialize};

/// One counting round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRound {
    /// Votes per candidate still in the race, by ascending index
    pub counts: Vec<(CandidateIndex, u64)>,

    /// Ballots with no remaining candidate ranked
    pub exhausted: u64,

    /// Candidate eliminated at the end of this round
    pub eliminated: Option<CandidateIndex>,
}

/// Outcome of an instant-runoff count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    /// Election tallied
    pub election_id: ElectionId,

    /// Candidate names in index order
    pub candidates: Vec<String>,

    /// Ballots counted
    pub total_ballots: u64,

    /// Winning candidate; `None` when no ballot ranks a surviving candidate
    pub winner: Option<CandidateIndex>,

    /// Rounds in order
    pub rounds: Vec<TallyRound>,
}

impl TallyResult {
    /// Name of the winning candidate
    pub fn winner_name(&self) -> Option<&str> {
        self.winner
            .and_then(|index| self.candidates.get(index as usize))
            .map(String::as_str)
    }
}

/// Run instant-runoff over `ballots` for `candidate_count` candidates
///
/// Indices outside `0..candidate_count` are skipped as if unranked.
pub fn instant_runoff<'a, I>(
    candidate_count: usize,
    ballots: I,
) -> (Option<CandidateIndex>, Vec<TallyRound>)
where
    I: IntoIterator<Item = &'a [CandidateIndex]>,
{
    let ballots: Vec<&[CandidateIndex]> = ballots.into_iter().collect();
    let mut active = vec![true; candidate_count];
    let mut rounds = Vec::new();

    loop {
        let mut votes = vec![0u64; candidate_count];
        let mut exhausted = 0u64;

        for ballot in &ballots {
            let preference = ballot
                .iter()
                .map(|&c| c as usize)
                .find(|&c| active.get(c).copied().unwrap_or(false));
            match preference {
                Some(candidate) => votes[candidate] += 1,
                None => exhausted += 1,
            }
        }

        let live = ballots.len() as u64 - exhausted;
        let counts: Vec<(CandidateIndex, u64)> = (0..candidate_count)
            .filter(|&c| active[c])
            .map(|c| (c as CandidateIndex, votes[c]))
            .collect();

        tracing::debug!(round = rounds.len() + 1, live, exhausted, ?counts, "Tally round");

        if live == 0 {
            rounds.push(TallyRound {
                counts,
                exhausted,
                eliminated: None,
            });
            return (None, rounds);
        }

        if let Some(&(winner, _)) = counts.iter().find(|(_, v)| 2 * v > live) {
            rounds.push(TallyRound {
                counts,
                exhausted,
                eliminated: None,
            });
            return (Some(winner), rounds);
        }

        // live > 0 without a majority implies at least two candidates remain
        let Some(&(loser, _)) = counts.iter().min_by_key(|(c, v)| (*v, *c)) else {
            return (None, rounds);
        };

        active[loser as usize] = false;
        rounds.push(TallyRound {
            counts,
            exhausted,
            eliminated: Some(loser),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        candidate_count: usize,
        ballots: &[Vec<CandidateIndex>],
    ) -> (Option<CandidateIndex>, Vec<TallyRound>) {
        instant_runoff(candidate_count, ballots.iter().map(Vec::as_slice))
    }

    #[test]
    fn test_first_round_majority() {
        let ballots = vec![vec![0, 1], vec![0, 1], vec![1, 0]];
        let (winner, rounds) = run(2, &ballots);

        assert_eq!(winner, Some(0));
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].counts, vec![(0, 2), (1, 1)]);
        assert_eq!(rounds[0].eliminated, None);
    }

    #[test]
    fn test_redistribution_changes_winner() {
        // B and C tie for last place; B's ballots then push A over the line
        let ballots = vec![
            vec![0, 1, 2],
            vec![0, 1, 2],
            vec![0, 2, 1],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 1, 0],
            vec![2, 1, 0],
        ];
        let (winner, rounds) = run(3, &ballots);

        // Round 1: A=3, B=2, C=2 -> tie between B and C, B (lower index) goes
        assert_eq!(rounds[0].counts, vec![(0, 3), (1, 2), (2, 2)]);
        assert_eq!(rounds[0].eliminated, Some(1));
        // Round 2: A=4, C=3 -> A wins
        assert_eq!(rounds[1].counts, vec![(0, 4), (2, 3)]);
        assert_eq!(winner, Some(0));
    }

    #[test]
    fn test_runoff_overtakes_leader() {
        let ballots = vec![
            vec![0, 1, 2],
            vec![0, 1, 2],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 1, 0],
        ];
        let (winner, rounds) = run(3, &ballots);

        // Round 1: A=2, B=2, C=1 -> C eliminated, its ballot moves to B
        assert_eq!(rounds[0].eliminated, Some(2));
        assert_eq!(rounds[1].counts, vec![(0, 2), (1, 3)]);
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn test_exhausted_ballots_shrink_majority_threshold() {
        // Partial rankings: the lone C ballot exhausts once C is out
        let ballots = vec![vec![0], vec![0], vec![1], vec![1], vec![2]];
        let (winner, rounds) = run(3, &ballots);

        assert_eq!(rounds[0].eliminated, Some(2));
        assert_eq!(rounds[1].exhausted, 1);
        // A=2, B=2 of 4 live -> tie, A (lower index) eliminated
        assert_eq!(rounds[1].eliminated, Some(0));
        assert_eq!(rounds[2].counts, vec![(1, 2)]);
        assert_eq!(rounds[2].exhausted, 3);
        assert_eq!(winner, Some(1));
    }

    #[test]
    fn test_no_ballots() {
        let (winner, rounds) = run(3, &[]);
        assert_eq!(winner, None);
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].counts, vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_zero_vote_candidates_eliminated_by_index() {
        let ballots = vec![
            vec![3, 0, 1, 2],
            vec![3, 1, 0, 2],
            vec![0, 3, 1, 2],
            vec![1, 0, 3, 2],
        ];
        let (winner, rounds) = run(4, &ballots);

        assert_eq!(rounds[0].eliminated, Some(2));
        assert_eq!(rounds[1].eliminated, Some(0));
        assert_eq!(rounds[2].counts, vec![(1, 1), (3, 3)]);
        assert_eq!(winner, Some(3));
    }

    #[test]
    fn test_winner_name() {
        let result = TallyResult {
            election_id: 1,
            candidates: vec!["A".to_string(), "B".to_string()],
            total_ballots: 1,
            winner: Some(1),
            rounds: vec![],
        };
        assert_eq!(result.winner_name(), Some("B"));
    }
}
