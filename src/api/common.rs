use mongodb::{bson::doc, options::FindOptions};
use rocket::futures::TryStreamExt;

use crate::error::Result;
use crate::model::{
    api::candidate::CandidateDesc,
    db::{Candidate, Vote},
    mongodb::Coll,
};

/// Every candidate with its current vote count, in creation order.
///
/// Counts are read straight from the store on every call; they are never
/// cached, so concurrent writers are always reflected.
pub async fn candidates_with_counts(
    candidates: &Coll<Candidate>,
    votes: &Coll<Vote>,
) -> Result<Vec<CandidateDesc>> {
    // ObjectIds are monotonic in creation time, so this sort is the stable
    // insertion order the UI depends on.
    let creation_order = FindOptions::builder().sort(doc! {"_id": 1}).build();
    let mut cursor = candidates.find(None, creation_order).await?;

    let mut descs = Vec::new();
    while let Some(candidate) = cursor.try_next().await? {
        let count = votes
            .count_documents(doc! {"candidate_id": candidate.id}, None)
            .await?;
        descs.push(CandidateDesc::new(candidate, count));
    }
    Ok(descs)
}
