use std::collections::HashMap;

use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::vote::{VoteDesc, VoteSpec},
        db::{Candidate, NewVote, Vote},
        mongodb::{is_duplicate_key_error, Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![submit_vote, list_votes, delete_vote]
}

#[post("/votes", data = "<spec>", format = "json")]
async fn submit_vote(
    spec: Json<VoteSpec>,
    candidates: Coll<Candidate>,
    new_votes: Coll<NewVote>,
    votes: Coll<Vote>,
) -> Result<Json<VoteDesc>> {
    let spec = spec.0;
    if spec.candidate_id.trim().is_empty() || spec.nim.trim().is_empty() {
        return Err(Error::BadRequest(
            "Candidate ID and NIM are required".to_string(),
        ));
    }
    let candidate_id: Id = spec.candidate_id.parse()?;

    // The vote must reference a real candidate.
    let candidate = candidates
        .find_one(candidate_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;

    // Insert the vote. The unique index on `nim` is the authority on double
    // voting, not this handler: a concurrent duplicate surfaces here as a
    // duplicate key error rather than a second row.
    let vote = NewVote::new(spec.nim, candidate_id);
    let new_id: Id = match new_votes.insert_one(&vote, None).await {
        Ok(result) => result
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB
            .into(),
        Err(err) if is_duplicate_key_error(&err) => {
            return Err(Error::AlreadyVoted(vote.nim));
        }
        Err(err) => return Err(err.into()),
    };

    // Retrieve the full record including ID.
    let vote = votes.find_one(new_id.as_doc(), None).await?.unwrap();
    Ok(Json(VoteDesc::new(vote, candidate.candidate.name)))
}

#[get("/votes")]
async fn list_votes(
    votes: Coll<Vote>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<VoteDesc>>> {
    let names: HashMap<Id, String> = candidates
        .find(None, None)
        .await?
        .map_ok(|candidate| (candidate.id, candidate.candidate.name))
        .try_collect()
        .await?;

    let newest_first = FindOptions::builder()
        .sort(doc! {"created_at": -1, "_id": -1})
        .build();
    let all: Vec<Vote> = votes.find(None, newest_first).await?.try_collect().await?;

    let descs = all
        .into_iter()
        .map(|vote| {
            // Cascade deletion means a dangling reference is only ever
            // visible mid-deletion; don't fail the whole listing over it.
            let name = names.get(&vote.candidate_id).cloned().unwrap_or_default();
            VoteDesc::new(vote, name)
        })
        .collect();
    Ok(Json(descs))
}

#[delete("/votes/<id>")]
async fn delete_vote(id: Id, votes: Coll<Vote>) -> Result<()> {
    let result = votes.delete_one(id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        Err(Error::not_found(format!("Vote {id}")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use mongodb::Database;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::model::db::{NewCandidate, VoteCore};

    use super::*;

    #[backend_test]
    async fn one_vote_per_nim(client: Client, db: Database) {
        let candidate_id = insert_candidate(&db, NewCandidate::example1()).await;

        // The first vote goes through.
        let desc = submit(
            &client,
            &VoteSpec {
                candidate_id: candidate_id.to_string(),
                nim: "1234567890".to_string(),
            },
        )
        .await;
        assert_eq!(desc.nim, "1234567890");
        assert_eq!(*desc.candidate_id, candidate_id);
        assert_eq!(desc.candidate_name, NewCandidate::example1().name);

        // The same NIM is rejected, even for a different candidate.
        let other_id = insert_candidate(&db, NewCandidate::example2()).await;
        submit_expect_status(
            &client,
            &VoteSpec {
                candidate_id: other_id.to_string(),
                nim: "1234567890".to_string(),
            },
            Status::Conflict,
        )
        .await;

        // Exactly one row was persisted for that NIM.
        let votes = Coll::<Vote>::from_db(&db);
        let count = votes
            .count_documents(doc! {"nim": "1234567890"}, None)
            .await
            .unwrap();
        assert_eq!(count, 1);

        // A different NIM still succeeds.
        submit(
            &client,
            &VoteSpec {
                candidate_id: candidate_id.to_string(),
                nim: "1234567891".to_string(),
            },
        )
        .await;
        let count = votes.count_documents(None, None).await.unwrap();
        assert_eq!(count, 2);
    }

    #[backend_test]
    async fn bad_submit(client: Client, db: Database) {
        let candidate_id = insert_candidate(&db, NewCandidate::example1()).await;

        // Missing NIM.
        submit_expect_status(
            &client,
            &VoteSpec {
                candidate_id: candidate_id.to_string(),
                nim: "".to_string(),
            },
            Status::BadRequest,
        )
        .await;

        // Missing candidate ID.
        submit_expect_status(
            &client,
            &VoteSpec {
                candidate_id: "".to_string(),
                nim: "1234567890".to_string(),
            },
            Status::BadRequest,
        )
        .await;

        // Malformed candidate ID.
        submit_expect_status(
            &client,
            &VoteSpec {
                candidate_id: "not-an-id".to_string(),
                nim: "1234567890".to_string(),
            },
            Status::BadRequest,
        )
        .await;

        // Nonexistent candidate.
        submit_expect_status(
            &client,
            &VoteSpec {
                candidate_id: Id::new().to_string(),
                nim: "1234567890".to_string(),
            },
            Status::NotFound,
        )
        .await;

        // None of the above created a vote.
        let votes = Coll::<Vote>::from_db(&db);
        let count = votes.count_documents(None, None).await.unwrap();
        assert_eq!(count, 0);
    }

    #[backend_test]
    async fn votes_list_newest_first(client: Client, db: Database) {
        let candidate_id = insert_candidate(&db, NewCandidate::example1()).await;

        // Insert votes with staggered timestamps, oldest first.
        let new_votes = Coll::<NewVote>::from_db(&db);
        for (age_secs, nim) in [(30, "1111111111"), (20, "2222222222"), (10, "3333333333")] {
            let vote = VoteCore {
                nim: nim.to_string(),
                candidate_id,
                created_at: Utc::now() - Duration::seconds(age_secs),
            };
            new_votes.insert_one(&vote, None).await.unwrap();
        }

        let listed = list(&client).await;
        let nims: Vec<&str> = listed.iter().map(|v| v.nim.as_str()).collect();
        assert_eq!(nims, vec!["3333333333", "2222222222", "1111111111"]);
        for vote in &listed {
            assert_eq!(vote.candidate_name, NewCandidate::example1().name);
        }
    }

    #[backend_test]
    async fn delete_vote_by_id(client: Client, db: Database) {
        let candidate_id = insert_candidate(&db, NewCandidate::example1()).await;
        let desc = submit(
            &client,
            &VoteSpec {
                candidate_id: candidate_id.to_string(),
                nim: "1234567890".to_string(),
            },
        )
        .await;

        // Delete it.
        let response = client.delete(uri!(delete_vote(*desc.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(list(&client).await.is_empty());

        // Deleting again is a 404.
        let response = client.delete(uri!(delete_vote(*desc.id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    async fn insert_candidate(db: &Database, candidate: NewCandidate) -> Id {
        Coll::<NewCandidate>::from_db(db)
            .insert_one(candidate, None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into()
    }

    async fn submit(client: &Client, spec: &VoteSpec) -> VoteDesc {
        let response = client
            .post(uri!(submit_vote))
            .header(ContentType::JSON)
            .body(serde_json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    async fn submit_expect_status(client: &Client, spec: &VoteSpec, status: Status) {
        let response = client
            .post(uri!(submit_vote))
            .header(ContentType::JSON)
            .body(serde_json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(status, response.status());
    }

    async fn list(client: &Client) -> Vec<VoteDesc> {
        let response = client.get(uri!(list_votes)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }
}
