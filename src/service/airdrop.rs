// service/airdrop.rs
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const AIRDROP_KEY_HEADER: &str = "x-airdrop-key";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordUserInfo {
    pub id: String,
    pub username: String,
}

/// Client for the airdrop service that completes the Discord OAuth exchange.
#[derive(Debug, Clone)]
pub struct AirdropClient {
    client: reqwest::Client,
    base_url: String,
    shared_secret: String,
}

impl AirdropClient {
    pub fn new(base_url: impl Into<String>, shared_secret: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            shared_secret: shared_secret.into(),
        })
    }

    /// `None` unless both the base URL and shared secret are configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, reqwest::Error> {
        match (&config.airdrop_api_base_url, &config.airdrop_shared_secret) {
            (Some(base_url), Some(secret)) => Ok(Some(Self::new(base_url.clone(), secret.clone())?)),
            _ => Ok(None),
        }
    }

    pub async fn get_discord_user_info(
        &self,
        discord_id: &str,
    ) -> Result<DiscordUserInfo, reqwest::Error> {
        let url = format!(
            "{}/discord/users/{}",
            self.base_url,
            urlencoding::encode(discord_id)
        );

        let user = self
            .client
            .get(&url)
            .header(AIRDROP_KEY_HEADER, &self.shared_secret)
            .send()
            .await?
            .error_for_status()?
            .json::<DiscordUserInfo>()
            .await?;

        tracing::debug!("Resolved Discord user {} as {}", user.id, user.username);
        Ok(user)
    }
}
