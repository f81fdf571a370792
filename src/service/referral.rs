use rand::{distr::Alphanumeric, Rng};

use crate::{
    db::{AmbassadorExt, ReferralExt, StoreError},
    models::referralmodel::{AmbassadorReferral, NewAmbassadorReferral, ReferralSource},
    service::error::ReferralError,
};

pub fn generate_referral_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

pub fn generate_referral_link(base_url: &str, code: &str) -> String {
    format!("{}/ref/{}", base_url, urlencoding::encode(code))
}

/// A referral callback from an external platform.
#[derive(Debug, Clone)]
pub struct ReferralIntake {
    pub source: ReferralSource,
    pub source_ref_id: String,
    pub referral_code: String,
    pub username: String,
}

/// Attributes an external identity to the ambassador owning `referral_code`.
///
/// The `(source, source_ref_id)` uniqueness is finally decided by the store on
/// insert, so two concurrent callbacks for the same identity yield one row and one
/// `Conflict`.
pub async fn intake_referral<S>(
    store: &S,
    intake: ReferralIntake,
) -> Result<AmbassadorReferral, ReferralError>
where
    S: AmbassadorExt + ReferralExt + ?Sized,
{
    let source_ref_id = required("source_ref_id", &intake.source_ref_id)?;
    let referral_code = required("referral_code", &intake.referral_code)?;
    let username = required("username", &intake.username)?;

    let ambassador = store
        .get_ambassador_by_referral_code(referral_code)
        .await?
        .ok_or_else(|| ReferralError::NotFound(referral_code.to_string()))?;

    let source = intake.source.to_string();
    let conflict = || ReferralError::Conflict {
        platform: source.clone(),
        source_ref_id: source_ref_id.to_string(),
    };

    // Fast path; the insert below still catches a concurrent duplicate.
    if store
        .get_referral_by_source(source_ref_id, &source)
        .await?
        .is_some()
    {
        return Err(conflict());
    }

    let payload = NewAmbassadorReferral {
        referrer: ambassador.id,
        source: source.clone(),
        source_ref_id: source_ref_id.to_string(),
        username: username.to_string(),
    };

    match store.create_referral(payload).await {
        Ok(referral) => {
            tracing::info!(
                "Referral {} recorded: {} user {} -> ambassador {}",
                referral.id,
                referral.source,
                referral.source_ref_id,
                referral.referrer
            );
            Ok(referral)
        }
        Err(StoreError::UniqueViolation(_)) => Err(conflict()),
        Err(e) => Err(e.into()),
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ReferralError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ReferralError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::ambassadormodel::Ambassador,
        service::mock_data::sample_ambassador,
    };

    fn intake(source_ref_id: &str, code: &str, username: &str) -> ReferralIntake {
        ReferralIntake {
            source: ReferralSource::Discord,
            source_ref_id: source_ref_id.to_string(),
            referral_code: code.to_string(),
            username: username.to_string(),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(vec![
            sample_ambassador("amb-1", "ABC123", 500),
            sample_ambassador("amb-2", "XYZ789", 400),
        ])
    }

    #[test]
    fn referral_codes_are_eight_uppercase_alphanumerics() {
        let mut rng = StdRng::seed_from_u64(1);
        let code = generate_referral_code(&mut rng);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn referral_link_points_at_code_page() {
        assert_eq!(
            generate_referral_link("https://board.example.com", "ABC123"),
            "https://board.example.com/ref/ABC123"
        );
    }

    #[tokio::test]
    async fn records_referral_for_known_code() {
        let store = store();

        let referral = intake_referral(&store, intake("555", "ABC123", "bob"))
            .await
            .unwrap();

        assert_eq!(referral.referrer, "amb-1");
        assert_eq!(referral.source, "Discord");
        assert_eq!(referral.source_ref_id, "555");
        assert_eq!(referral.username, "bob");
    }

    #[tokio::test]
    async fn unknown_code_is_not_found_and_inserts_nothing() {
        let store = store();

        let err = intake_referral(&store, intake("555", "NOPE00", "bob"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReferralError::NotFound(ref code) if code == "NOPE00"));
        assert_eq!(store.referral_count().await, 0);
    }

    #[tokio::test]
    async fn same_identity_twice_conflicts_with_one_row() {
        let store = store();

        intake_referral(&store, intake("555", "ABC123", "bob")).await.unwrap();
        let err = intake_referral(&store, intake("555", "XYZ789", "bob"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReferralError::Conflict { .. }));
        assert_eq!(store.referral_count().await, 1);
        let kept = store.get_referral_by_source("555", "Discord").await.unwrap().unwrap();
        assert_eq!(kept.referrer, "amb-1");
    }

    #[tokio::test]
    async fn blank_fields_are_invalid_input() {
        let store = store();

        for bad in [intake(" ", "ABC123", "bob"), intake("555", "", "bob"), intake("555", "ABC123", "\t")] {
            let err = intake_referral(&store, bad).await.unwrap_err();
            assert_eq!(err.reason(), "invalid-data");
        }
        assert_eq!(store.referral_count().await, 0);
    }

    #[tokio::test]
    async fn trims_fields_before_storing() {
        let store = store();

        let referral = intake_referral(&store, intake(" 555 ", " ABC123 ", " bob "))
            .await
            .unwrap();

        assert_eq!(referral.source_ref_id, "555");
        assert_eq!(referral.username, "bob");
    }

    #[derive(Debug)]
    struct FailingStore;

    #[async_trait]
    impl AmbassadorExt for FailingStore {
        async fn get_all_ambassadors(&self) -> Result<Vec<Ambassador>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn get_ambassador_by_referral_code(
            &self,
            _referral_code: &str,
        ) -> Result<Option<Ambassador>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[async_trait]
    impl ReferralExt for FailingStore {
        async fn get_referral_by_source(
            &self,
            _source_ref_id: &str,
            _source: &str,
        ) -> Result<Option<AmbassadorReferral>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn create_referral(
            &self,
            _payload: NewAmbassadorReferral,
        ) -> Result<AmbassadorReferral, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn store_failures_are_upstream() {
        let err = intake_referral(&FailingStore, intake("555", "ABC123", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReferralError::Upstream(_)));
        assert_eq!(err.reason(), "server-error");
    }
}
