//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in a DB-friendly way, e.g.:
//!
//! - IDs and datetimes are serialised in MongoDB's own format.

mod candidate;
pub use candidate::{Candidate, CandidateCore, NewCandidate};

mod vote;
pub use vote::{NewVote, Vote, VoteCore};
