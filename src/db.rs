// db.rs
pub mod memory;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use thiserror::Error;

use crate::models::{
    ambassadormodel::Ambassador,
    referralmodel::{AmbassadorReferral, NewAmbassadorReferral},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Lifts unique-violation errors out of the generic sqlx error.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(
                    db_err
                        .constraint()
                        .unwrap_or("ambassador_referrals_source_source_ref_id_key")
                        .to_string(),
                )
            }
            other => StoreError::Database(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

#[async_trait]
pub trait AmbassadorExt {
    async fn get_all_ambassadors(&self) -> Result<Vec<Ambassador>, StoreError>;

    async fn get_ambassador_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<Ambassador>, StoreError>;
}

#[async_trait]
pub trait ReferralExt {
    async fn get_referral_by_source(
        &self,
        source_ref_id: &str,
        source: &str,
    ) -> Result<Option<AmbassadorReferral>, StoreError>;

    /// Fails with `StoreError::UniqueViolation` when `(source, source_ref_id)` already exists.
    async fn create_referral(
        &self,
        payload: NewAmbassadorReferral,
    ) -> Result<AmbassadorReferral, StoreError>;
}

/// Everything the handlers need from a backing store.
pub trait LeaderboardStore: AmbassadorExt + ReferralExt + std::fmt::Debug + Send + Sync {}

impl<T> LeaderboardStore for T where T: AmbassadorExt + ReferralExt + std::fmt::Debug + Send + Sync {}

#[async_trait]
impl AmbassadorExt for DBClient {
    async fn get_all_ambassadors(&self) -> Result<Vec<Ambassador>, StoreError> {
        let ambassadors = sqlx::query_as::<_, Ambassador>(
            r#"
            SELECT id::text AS id, name, handle, country, invites, score,
            referral_code, created_at, updated_at
            FROM ambassador
            ORDER BY score DESC, invites DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch ambassadors: {}", e);
            StoreError::from_sqlx(e)
        })?;

        Ok(ambassadors)
    }

    async fn get_ambassador_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<Ambassador>, StoreError> {
        sqlx::query_as::<_, Ambassador>(
            r#"SELECT 
                id::text AS id, name, handle, country, invites, score,
                referral_code, created_at, updated_at
            FROM ambassador 
            WHERE referral_code = $1"#,
        )
        .bind(referral_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up referral code {}: {}", referral_code, e);
            StoreError::from_sqlx(e)
        })
    }
}

#[async_trait]
impl ReferralExt for DBClient {
    async fn get_referral_by_source(
        &self,
        source_ref_id: &str,
        source: &str,
    ) -> Result<Option<AmbassadorReferral>, StoreError> {
        sqlx::query_as::<_, AmbassadorReferral>(
            r#"
            SELECT id, created_at, source, source_ref_id, referrer::text AS referrer, username
            FROM ambassador_referrals
            WHERE source_ref_id = $1 AND source = $2
            "#,
        )
        .bind(source_ref_id)
        .bind(source)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch referral {}/{}: {}", source, source_ref_id, e);
            StoreError::from_sqlx(e)
        })
    }

    async fn create_referral(
        &self,
        payload: NewAmbassadorReferral,
    ) -> Result<AmbassadorReferral, StoreError> {
        sqlx::query_as::<_, AmbassadorReferral>(
            r#"
            INSERT INTO ambassador_referrals (referrer, source, source_ref_id, username)
            VALUES ($1::uuid, $2, $3, $4)
            RETURNING id, created_at, source, source_ref_id, referrer::text AS referrer, username
            "#,
        )
        .bind(&payload.referrer)
        .bind(&payload.source)
        .bind(&payload.source_ref_id)
        .bind(&payload.username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = StoreError::from_sqlx(e);
            if !matches!(err, StoreError::UniqueViolation(_)) {
                tracing::error!("Failed to insert referral: {}", err);
            }
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_stay_generic() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn db_client_is_a_leaderboard_store() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/leaderboard")
            .unwrap();
        let store: std::sync::Arc<dyn LeaderboardStore> = std::sync::Arc::new(DBClient::new(pool));
        assert!(format!("{:?}", store).contains("DBClient"));
    }
}
