use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External platform a referral arrived from. Stored as its display name.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferralSource {
    Discord,
}

impl ReferralSource {
    pub fn to_str(&self) -> &str {
        match self {
            ReferralSource::Discord => "Discord",
        }
    }
}

impl fmt::Display for ReferralSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct AmbassadorReferral {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub source_ref_id: String,
    /// Id of the referring ambassador
    pub referrer: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NewAmbassadorReferral {
    pub referrer: String,
    pub source: String,
    pub source_ref_id: String,
    pub username: String,
}
