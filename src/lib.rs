#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

use rocket::{Build, Rocket};

pub use config::Config;

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

/// Construct the rocket instance for the full server.
///
/// The heavy lifting (config loading, database connection, index creation)
/// happens in the attached fairings at ignite time.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(LoggerFairing)
}

/// Get a database client for tests.
/// Reads `DB_URI` from the environment, falling back to a local instance.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri =
        std::env::var("DB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Failed to connect to test database")
}

/// Get the name of the database to use for a test.
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// Construct a rocket instance running against the given database, skipping
/// the production `DatabaseFairing` so each test gets its own isolated DB.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create test indexes");
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .manage(client)
        .manage(db)
}
