//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as hex strings.
//! - Datetimes are serialised as RFC 3339 timestamps.

pub mod candidate;
pub mod id;
pub mod tally;
pub mod vote;
