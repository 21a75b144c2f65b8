use rocket::Route;

mod candidates;
mod common;
mod tally;
mod votes;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(candidates::routes());
    routes.extend(votes::routes());
    routes.extend(tally::routes());
    routes
}
