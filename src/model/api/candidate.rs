use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    model::{
        api::id::ApiId,
        db::{Candidate, NewCandidate},
    },
    Config,
};

/// A candidate creation request, received from an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSpec {
    pub name: String,
    pub vision: String,
    pub mission: String,
    pub image: Option<String>,
}

impl CandidateSpec {
    /// Reject blank required fields and oversized images.
    pub fn validate(&self, config: &Config) -> Result<(), Error> {
        if self.name.trim().is_empty()
            || self.vision.trim().is_empty()
            || self.mission.trim().is_empty()
        {
            return Err(Error::BadRequest(
                "Name, vision, and mission are required".to_string(),
            ));
        }
        if let Some(image) = &self.image {
            if image.len() > config.max_image_bytes() {
                return Err(Error::BadRequest(format!(
                    "Image exceeds the {} byte limit",
                    config.max_image_bytes()
                )));
            }
        }
        Ok(())
    }
}

impl From<CandidateSpec> for NewCandidate {
    fn from(spec: CandidateSpec) -> Self {
        Self {
            name: spec.name,
            vision: spec.vision,
            mission: spec.mission,
            image: spec.image,
        }
    }
}

/// API-friendly representation of a candidate, including its current vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDesc {
    pub id: ApiId,
    pub name: String,
    pub vision: String,
    pub mission: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub vote_count: u64,
}

impl CandidateDesc {
    pub fn new(candidate: Candidate, vote_count: u64) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            vision: candidate.candidate.vision,
            mission: candidate.candidate.mission,
            image: candidate.candidate.image,
            vote_count,
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    use crate::model::db::CandidateCore;

    impl CandidateSpec {
        pub fn example1() -> Self {
            let CandidateCore {
                name,
                vision,
                mission,
                image,
            } = CandidateCore::example1();
            Self {
                name,
                vision,
                mission,
                image,
            }
        }

        pub fn example2() -> Self {
            let CandidateCore {
                name,
                vision,
                mission,
                image,
            } = CandidateCore::example2();
            Self {
                name,
                vision,
                mission,
                image,
            }
        }

        pub fn empty() -> Self {
            Self {
                name: "".to_string(),
                vision: "".to_string(),
                mission: "".to_string(),
                image: None,
            }
        }
    }
}
