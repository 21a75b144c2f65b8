use serde::{Deserialize, Serialize};

use crate::model::api::{candidate::CandidateDesc, id::ApiId};

/// Vote count for a single candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCount {
    pub id: ApiId,
    pub name: String,
    pub votes: u64,
}

/// Aggregate election standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    /// Sum of all candidates' vote counts.
    pub total_votes: u64,
    /// Per-candidate counts, in candidate creation order.
    pub counts: Vec<CandidateCount>,
    /// The highest-scoring candidate. Ties go to the earliest-created
    /// candidate; absent entirely while no votes have been cast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<CandidateCount>,
}

impl Tally {
    /// Aggregate the given candidates, which must be in creation order.
    pub fn compute(candidates: &[CandidateDesc]) -> Self {
        let counts: Vec<CandidateCount> = candidates
            .iter()
            .map(|candidate| CandidateCount {
                id: candidate.id,
                name: candidate.name.clone(),
                votes: candidate.vote_count,
            })
            .collect();
        let total_votes = counts.iter().map(|count| count.votes).sum::<u64>();

        // Strictly-greater comparison, so the earliest candidate wins a tie.
        let mut leader: Option<&CandidateCount> = None;
        if total_votes > 0 {
            for count in &counts {
                if leader.map_or(true, |best| count.votes > best.votes) {
                    leader = Some(count);
                }
            }
        }
        let leader = leader.cloned();

        Self {
            total_votes,
            counts,
            leader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{db::Candidate, mongodb::Id};

    fn desc(name: &str, votes: u64) -> CandidateDesc {
        let candidate = Candidate {
            id: Id::new(),
            candidate: crate::model::db::CandidateCore {
                name: name.to_string(),
                vision: "vision".to_string(),
                mission: "mission".to_string(),
                image: None,
            },
        };
        CandidateDesc::new(candidate, votes)
    }

    #[test]
    fn empty_election() {
        let tally = Tally::compute(&[]);
        assert_eq!(tally.total_votes, 0);
        assert!(tally.counts.is_empty());
        assert!(tally.leader.is_none());
    }

    #[test]
    fn no_leader_without_votes() {
        let candidates = vec![desc("a", 0), desc("b", 0)];
        let tally = Tally::compute(&candidates);
        assert_eq!(tally.total_votes, 0);
        assert_eq!(tally.counts.len(), 2);
        // Zero votes means no leader, even though a sort would yield one.
        assert!(tally.leader.is_none());
    }

    #[test]
    fn totals_are_exact() {
        let candidates = vec![desc("a", 3), desc("b", 0), desc("c", 7)];
        let tally = Tally::compute(&candidates);
        assert_eq!(tally.total_votes, 10);
        assert_eq!(
            tally.total_votes,
            tally.counts.iter().map(|c| c.votes).sum::<u64>()
        );
        assert_eq!(tally.leader.unwrap().name, "c");
    }

    #[test]
    fn tie_goes_to_earliest_candidate() {
        let candidates = vec![desc("a", 2), desc("b", 5), desc("c", 5)];
        let tally = Tally::compute(&candidates);
        let leader = tally.leader.unwrap();
        assert_eq!(leader.name, "b");
        assert_eq!(leader.votes, 5);
    }

    #[test]
    fn counts_keep_creation_order() {
        let candidates = vec![desc("a", 1), desc("b", 9), desc("c", 4)];
        let tally = Tally::compute(&candidates);
        let names: Vec<&str> = tally.counts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
