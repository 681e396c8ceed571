//! Input validation
//!
//! - Candidate list bounds and names (election creation)
//! - Election duration
//! - Ballot rankings against a candidate list
//!
//! Validators only inspect their inputs; they never touch engine state.

use crate::config::RankingPolicy;
use crate::types::CandidateIndex;
use crate::{Error, Result};

/// Fewest candidates an election may have
pub const MIN_CANDIDATES: usize = 2;

/// Most candidates an election may have
pub const MAX_CANDIDATES: usize = 5;

/// Validate a candidate list for a new election
///
/// Count is checked before names, so an oversized list of empty names reports
/// the count.
pub fn validate_candidates(candidates: &[String]) -> Result<()> {
    if !(MIN_CANDIDATES..=MAX_CANDIDATES).contains(&candidates.len()) {
        return Err(Error::InvalidCandidateCount(candidates.len()));
    }

    if let Some(index) = candidates.iter().position(|name| name.trim().is_empty()) {
        return Err(Error::InvalidCandidateName(index));
    }

    Ok(())
}

/// Validate an election duration in days
pub fn validate_duration(duration_days: u64) -> Result<()> {
    if duration_days == 0 {
        return Err(Error::InvalidDuration(duration_days));
    }
    Ok(())
}

/// Validator for ranked ballots
#[derive(Debug, Clone, Copy)]
pub struct BallotValidator {
    policy: RankingPolicy,
}

impl BallotValidator {
    /// Create new validator
    pub fn new(policy: RankingPolicy) -> Self {
        Self { policy }
    }

    /// Active ranking policy
    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// Validate `choices` against an election with `candidate_count` candidates
    pub fn validate(&self, choices: &[CandidateIndex], candidate_count: usize) -> Result<()> {
        if choices.is_empty() {
            return Err(Error::InvalidBallot("ranking is empty".to_string()));
        }

        let mut seen = vec![false; candidate_count];
        for &choice in choices {
            let slot = seen.get_mut(choice as usize).ok_or_else(|| {
                Error::InvalidBallot(format!(
                    "candidate index {} out of range (election has {} candidates)",
                    choice, candidate_count
                ))
            })?;
            if *slot {
                return Err(Error::InvalidBallot(format!(
                    "candidate index {} ranked more than once",
                    choice
                )));
            }
            *slot = true;
        }

        if self.policy == RankingPolicy::Full && choices.len() != candidate_count {
            return Err(Error::InvalidBallot(format!(
                "full ranking required: got {} of {} candidates",
                choices.len(),
                candidate_count
            )));
        }

        Ok(())
    }
}

/// Resolve literal candidate names to indices
///
/// Candidate names may repeat: the k-th occurrence of a name on the ballot
/// resolves to the k-th candidate carrying that name. Naming a candidate more
/// often than it appears resolves to its first index, which the ballot
/// validator then rejects as ranked more than once.
pub fn resolve_names<S: AsRef<str>>(
    candidates: &[String],
    names: &[S],
) -> Result<Vec<CandidateIndex>> {
    let mut used = vec![false; candidates.len()];

    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let mut matches = candidates
                .iter()
                .enumerate()
                .filter(|(_, candidate)| candidate.as_str() == name)
                .map(|(index, _)| index);

            let first = matches
                .clone()
                .next()
                .ok_or_else(|| Error::InvalidBallot(format!("unknown candidate: {}", name)))?;
            let index = matches.find(|&index| !used[index]).unwrap_or(first);
            used[index] = true;

            Ok(index as CandidateIndex)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Candidate {}", i)).collect()
    }

    #[test]
    fn test_candidate_bounds() {
        assert!(matches!(
            validate_candidates(&names(1)),
            Err(Error::InvalidCandidateCount(1))
        ));
        assert!(validate_candidates(&names(2)).is_ok());
        assert!(validate_candidates(&names(5)).is_ok());
        assert!(matches!(
            validate_candidates(&names(6)),
            Err(Error::InvalidCandidateCount(6))
        ));
        assert!(matches!(
            validate_candidates(&[]),
            Err(Error::InvalidCandidateCount(0))
        ));
    }

    #[test]
    fn test_empty_candidate_name_rejected() {
        let candidates = vec!["A".to_string(), "  ".to_string()];
        assert!(matches!(
            validate_candidates(&candidates),
            Err(Error::InvalidCandidateName(1))
        ));
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let candidates = vec!["Same".to_string(), "Same".to_string()];
        assert!(validate_candidates(&candidates).is_ok());
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(matches!(validate_duration(0), Err(Error::InvalidDuration(0))));
        assert!(validate_duration(1).is_ok());
    }

    #[test]
    fn test_full_ranking_policy() {
        let validator = BallotValidator::new(RankingPolicy::Full);
        assert!(validator.validate(&[1, 0, 2], 3).is_ok());
        assert!(validator.validate(&[1, 0], 3).is_err());
        assert!(validator.validate(&[1, 1, 2], 3).is_err());
        assert!(validator.validate(&[0, 1, 3], 3).is_err());
        assert!(validator.validate(&[], 3).is_err());
    }

    #[test]
    fn test_partial_ranking_policy() {
        let validator = BallotValidator::new(RankingPolicy::Partial);
        assert!(validator.validate(&[2], 3).is_ok());
        assert!(validator.validate(&[2, 0], 3).is_ok());
        assert!(validator.validate(&[2, 2], 3).is_err());
        assert!(validator.validate(&[], 3).is_err());
    }

    #[test]
    fn test_resolve_names() {
        let candidates = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        assert_eq!(resolve_names(&candidates, &["B", "A"]).unwrap(), vec![1, 0]);
        assert_eq!(
            resolve_names(&candidates, &["A", "B", "A"]).unwrap(),
            vec![0, 1, 2]
        );
        // Third "A" has no unused match left
        assert_eq!(
            resolve_names(&candidates, &["A", "A", "A"]).unwrap(),
            vec![0, 2, 0]
        );
        assert!(matches!(
            resolve_names(&candidates, &["Z"]),
            Err(Error::InvalidBallot(_))
        ));
    }
}
