use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, db::Vote};

/// A vote that a student wishes to cast, consuming their NIM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSpec {
    /// Hex ID of the candidate to vote for.
    pub candidate_id: String,
    /// The student number casting the vote.
    pub nim: String,
}

/// API-friendly representation of a persisted vote, with the candidate name
/// joined in for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDesc {
    pub id: ApiId,
    pub nim: String,
    pub candidate_id: ApiId,
    pub candidate_name: String,
    pub created_at: DateTime<Utc>,
}

impl VoteDesc {
    pub fn new(vote: Vote, candidate_name: String) -> Self {
        Self {
            id: vote.id.into(),
            nim: vote.vote.nim,
            candidate_id: vote.vote.candidate_id.into(),
            candidate_name,
            created_at: vote.vote.created_at,
        }
    }
}
