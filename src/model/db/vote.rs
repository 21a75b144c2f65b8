use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core vote data, as stored in the database.
///
/// The `nim` field carries a unique index (see
/// [`ensure_indexes_exist`](crate::model::mongodb::ensure_indexes_exist)),
/// so at most one vote per student can ever be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCore {
    /// The student number (NIM) this vote consumed.
    pub nim: String,
    /// The candidate the vote was cast for.
    pub candidate_id: Id,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl VoteCore {
    /// Create a new vote, timestamped now.
    pub fn new(nim: String, candidate_id: Id) -> Self {
        Self {
            nim,
            candidate_id,
            created_at: Utc::now(),
        }
    }
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mongodb::Database;
    use rocket::local::asynchronous::Client;

    use crate::model::mongodb::{is_duplicate_key_error, Coll};

    #[backend_test]
    async fn nim_unique_index(_client: Client, db: Database) {
        let votes = Coll::<NewVote>::from_db(&db);
        let first = NewVote::new("1234567890".to_string(), Id::new());
        let second = NewVote::new("1234567890".to_string(), Id::new());

        // Race two inserts for the same NIM; the unique index must admit
        // exactly one regardless of interleaving.
        let (first_result, second_result) =
            rocket::tokio::join!(votes.insert_one(&first, None), votes.insert_one(&second, None));
        let results = [first_result, second_result];

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let duplicates = results
            .iter()
            .filter(|r| r.as_ref().err().map_or(false, is_duplicate_key_error))
            .count();
        assert_eq!(duplicates, 1);

        // Exactly one row was persisted.
        let count = votes.count_documents(None, None).await.unwrap();
        assert_eq!(count, 1);
    }
}
