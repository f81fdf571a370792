use thiserror::Error;

use crate::{
    db::StoreError,
    error::{ErrorMessage, HttpError},
};

#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("Invalid referral data: {0}")]
    InvalidInput(String),

    #[error("Ambassador not found for referral code {0}")]
    NotFound(String),

    #[error("Referral already exists for {platform} user {source_ref_id}")]
    Conflict { platform: String, source_ref_id: String },

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl ReferralError {
    /// Reason code carried on the failure redirect.
    pub fn reason(&self) -> &'static str {
        match self {
            ReferralError::InvalidInput(_) => "invalid-data",
            ReferralError::NotFound(_) => "ambassador-not-found",
            ReferralError::Conflict { .. } => "already-exist",
            ReferralError::Upstream(_) => "server-error",
        }
    }
}

impl From<StoreError> for ReferralError {
    fn from(error: StoreError) -> Self {
        ReferralError::Upstream(error.to_string())
    }
}

impl From<reqwest::Error> for ReferralError {
    fn from(error: reqwest::Error) -> Self {
        ReferralError::Upstream(error.to_string())
    }
}

impl From<ReferralError> for HttpError {
    fn from(error: ReferralError) -> Self {
        match error {
            ReferralError::InvalidInput(_) => HttpError::bad_request(error.to_string()),
            ReferralError::NotFound(_) => HttpError::not_found(error.to_string()),
            ReferralError::Conflict { .. } => {
                HttpError::unique_constraint_violation(error.to_string())
            }
            ReferralError::Upstream(_) => {
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        }
    }
}
