// config.rs
use std::{env, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataSource {
    /// Ambassadors and referrals live in PostgreSQL.
    Database,
    /// Seeded fixture data held in memory, for local development and demos.
    Mock,
}

impl FromStr for DataSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" | "postgres" => Ok(DataSource::Database),
            "mock" => Ok(DataSource::Mock),
            _ => Err(ConfigError::Invalid {
                key: "DATA_SOURCE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_source: DataSource,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub app_url: String,
    pub port: u16,
    // Airdrop service (identity-provider exchange)
    pub airdrop_api_base_url: Option<String>,
    pub airdrop_shared_secret: Option<String>,
    // Community join links shown on the referral page
    pub discord_client_id: String,
    pub discord_redirect_uri: String,
    pub telegram_url: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `init` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_source = match var("DATA_SOURCE") {
            Some(value) => value.parse::<DataSource>()?,
            None => DataSource::Database,
        };

        let database_url = var("DATABASE_URL");
        if data_source == DataSource::Database && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let run_migrations = match var("RUN_MIGRATIONS") {
            Some(value) => parse_bool("RUN_MIGRATIONS", &value)?,
            None => false,
        };

        let app_url = var("APP_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let port = match var("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value,
            })?,
            None => 8000,
        };

        let discord_redirect_uri = var("DISCORD_REDIRECT_URI")
            .unwrap_or_else(|| format!("{}/api/discord/callback", app_url));

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            data_source,
            database_url,
            run_migrations,
            app_url,
            port,
            airdrop_api_base_url: var("AIRDROP_API_BASE_URL"),
            airdrop_shared_secret: var("AIRDROP_SHARED_SECRET_KEY"),
            discord_client_id: var("DISCORD_CLIENT_ID").unwrap_or_default(),
            discord_redirect_uri,
            telegram_url: var("TELEGRAM_URL").unwrap_or_else(|| "https://t.me/".to_string()),
            cors_origins,
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
