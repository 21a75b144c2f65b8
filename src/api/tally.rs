use rocket::{serde::json::Json, Route};

use crate::{
    error::Result,
    model::{
        api::tally::Tally,
        db::{Candidate, Vote},
        mongodb::Coll,
    },
};

use super::common::candidates_with_counts;

pub fn routes() -> Vec<Route> {
    routes![get_tally]
}

#[get("/tally")]
async fn get_tally(candidates: Coll<Candidate>, votes: Coll<Vote>) -> Result<Json<Tally>> {
    let standings = candidates_with_counts(&candidates, &votes).await?;
    Ok(Json(Tally::compute(&standings)))
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{http::Status, local::asynchronous::Client, serde::json::serde_json};

    use crate::model::{
        db::{NewCandidate, NewVote},
        mongodb::Id,
    };

    use super::*;

    #[backend_test]
    async fn empty_tally(client: Client) {
        let tally = fetch_tally(&client).await;
        assert_eq!(tally.total_votes, 0);
        assert!(tally.counts.is_empty());
        assert!(tally.leader.is_none());
    }

    #[backend_test]
    async fn no_leader_before_first_vote(client: Client, db: Database) {
        insert_candidate(&db, NewCandidate::example1()).await;
        insert_candidate(&db, NewCandidate::example2()).await;

        let tally = fetch_tally(&client).await;
        assert_eq!(tally.total_votes, 0);
        assert_eq!(tally.counts.len(), 2);
        assert!(tally.leader.is_none());
    }

    #[backend_test]
    async fn leader_has_most_votes(client: Client, db: Database) {
        let first = insert_candidate(&db, NewCandidate::example1()).await;
        let second = insert_candidate(&db, NewCandidate::example2()).await;

        let votes = Coll::<NewVote>::from_db(&db);
        for (nim, candidate_id) in [
            ("1111111111", first),
            ("2222222222", second),
            ("3333333333", second),
        ] {
            votes
                .insert_one(NewVote::new(nim.to_string(), candidate_id), None)
                .await
                .unwrap();
        }

        let tally = fetch_tally(&client).await;
        assert_eq!(tally.total_votes, 3);
        let leader = tally.leader.unwrap();
        assert_eq!(*leader.id, second);
        assert_eq!(leader.votes, 2);
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

    async fn fetch_tally(client: &Client) -> Tally {
        let response = client.get(uri!(get_tally)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }
}
