use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::referralmodel::{AmbassadorReferral, ReferralSource};

/// Query sent by the airdrop service once a Discord user finishes OAuth.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DiscordReferralQueryDto {
    #[serde(rename = "discord-id")]
    pub discord_id: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "referral-code")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReferralResultQueryDto {
    pub success: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "ref")]
    pub ref_code: Option<String>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateReferralDto {
    pub source: ReferralSource,

    #[validate(length(min = 1, max = 64, message = "source_ref_id is required"))]
    pub source_ref_id: String,

    #[validate(length(min = 1, max = 32, message = "referral_code is required"))]
    pub referral_code: String,

    #[validate(length(min = 1, max = 100, message = "username is required"))]
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReferralResponseDto {
    pub status: String,
    pub data: AmbassadorReferral,
}
