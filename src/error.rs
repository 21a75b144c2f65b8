use std::io::Cursor;

use rocket::{
    http::{ContentType, Status, StatusClass},
    response::{Responder, Response},
    serde::json::json,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] mongodb::error::Error),
    #[error(transparent)]
    OidParse(#[from] mongodb::bson::oid::Error),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("NIM {0} has already voted")]
    AlreadyVoted(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(target: String) -> Self {
        Self::NotFound(target)
    }
}

/// The single place where errors become HTTP responses: every handler returns
/// `Result<_, Error>` and this mapping applies uniformly.
impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = match &self {
            Self::Db(_) => Status::InternalServerError,
            Self::OidParse(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::AlreadyVoted(_) => Status::Conflict,
            Self::NotFound(_) => Status::NotFound,
        };

        // Store errors keep their details in the log; the caller only ever
        // sees a generic message for them.
        let message = match &self {
            Self::Db(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        };
        match status.class() {
            StatusClass::ServerError => error!("{self:?}"),
            _ => warn!("{self}"),
        }

        let body = json!({ "error": message }).to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
