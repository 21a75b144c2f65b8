use mongodb::bson::doc;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::candidate::{CandidateDesc, CandidateSpec},
        db::{Candidate, NewCandidate, Vote},
        mongodb::{Coll, Id},
    },
    Config,
};

use super::common::candidates_with_counts;

pub fn routes() -> Vec<Route> {
    routes![list_candidates, create_candidate, delete_candidate]
}

#[get("/candidates")]
async fn list_candidates(
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<Json<Vec<CandidateDesc>>> {
    Ok(Json(candidates_with_counts(&candidates, &votes).await?))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    spec: Json<CandidateSpec>,
    config: &State<Config>,
    new_candidates: Coll<NewCandidate>,
    candidates: Coll<Candidate>,
) -> Result<Json<CandidateDesc>> {
    spec.validate(config.inner())?;

    // Create and insert the candidate.
    let candidate: NewCandidate = spec.0.into();
    let new_id: Id = new_candidates
        .insert_one(&candidate, None)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB
        .into();

    // Retrieve the full record including ID.
    let candidate = candidates.find_one(new_id.as_doc(), None).await?.unwrap();
    Ok(Json(CandidateDesc::new(candidate, 0)))
}

#[delete("/candidates/<id>")]
async fn delete_candidate(
    id: Id,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
) -> Result<()> {
    // The votes must go before the candidate row, or a failure in between
    // would leave votes referencing a candidate that no longer exists.
    votes.delete_many(doc! {"candidate_id": id}, None).await?;

    let result = candidates.delete_one(id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        Err(Error::not_found(format!("Candidate {id}")))
    } else {
        Ok(())
    }
}
