// db/memory.rs
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AmbassadorExt, ReferralExt, StoreError};
use crate::models::{
    ambassadormodel::Ambassador,
    referralmodel::{AmbassadorReferral, NewAmbassadorReferral},
};

/// Process-local store used in mock mode and by tests.
///
/// Ambassadors are fixed at construction. Referrals are append-only and keyed
/// on `(source, source_ref_id)` the same way the database constraint is, so the
/// insert-and-check happens under one write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ambassadors: Vec<Ambassador>,
    referrals: RwLock<Vec<AmbassadorReferral>>,
}

impl MemoryStore {
    pub fn new(ambassadors: Vec<Ambassador>) -> Self {
        MemoryStore {
            ambassadors,
            referrals: RwLock::new(Vec::new()),
        }
    }

    pub async fn referral_count(&self) -> usize {
        self.referrals.read().await.len()
    }
}

#[async_trait]
impl AmbassadorExt for MemoryStore {
    async fn get_all_ambassadors(&self) -> Result<Vec<Ambassador>, StoreError> {
        let mut ambassadors = self.ambassadors.clone();
        ambassadors.sort_by(|a, b| b.score.cmp(&a.score).then(b.invites.cmp(&a.invites)));
        Ok(ambassadors)
    }

    async fn get_ambassador_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<Ambassador>, StoreError> {
        Ok(self
            .ambassadors
            .iter()
            .find(|a| a.referral_code == referral_code)
            .cloned())
    }
}

#[async_trait]
impl ReferralExt for MemoryStore {
    async fn get_referral_by_source(
        &self,
        source_ref_id: &str,
        source: &str,
    ) -> Result<Option<AmbassadorReferral>, StoreError> {
        let referrals = self.referrals.read().await;
        Ok(referrals
            .iter()
            .find(|r| r.source_ref_id == source_ref_id && r.source == source)
            .cloned())
    }

    async fn create_referral(
        &self,
        payload: NewAmbassadorReferral,
    ) -> Result<AmbassadorReferral, StoreError> {
        let mut referrals = self.referrals.write().await;

        if referrals
            .iter()
            .any(|r| r.source == payload.source && r.source_ref_id == payload.source_ref_id)
        {
            return Err(StoreError::UniqueViolation(
                "ambassador_referrals_source_source_ref_id_key".to_string(),
            ));
        }

        let referral = AmbassadorReferral {
            id: referrals.len() as i64 + 1,
            created_at: Utc::now(),
            source: payload.source,
            source_ref_id: payload.source_ref_id,
            referrer: payload.referrer,
            username: payload.username,
        };
        referrals.push(referral.clone());

        Ok(referral)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::service::mock_data::sample_ambassador;

    fn payload(source_ref_id: &str) -> NewAmbassadorReferral {
        NewAmbassadorReferral {
            referrer: "amb-1".to_string(),
            source: "Discord".to_string(),
            source_ref_id: source_ref_id.to_string(),
            username: "bob".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_ambassadors_by_score_descending() {
        let store = MemoryStore::new(vec![
            sample_ambassador("amb-1", "AAA111", 100),
            sample_ambassador("amb-2", "BBB222", 300),
            sample_ambassador("amb-3", "CCC333", 200),
        ]);

        let ids: Vec<String> = store
            .get_all_ambassadors()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["amb-2", "amb-3", "amb-1"]);
    }

    #[tokio::test]
    async fn looks_up_by_exact_referral_code() {
        let store = MemoryStore::new(vec![sample_ambassador("amb-1", "ABC123", 10)]);

        assert!(store.get_ambassador_by_referral_code("ABC123").await.unwrap().is_some());
        assert!(store.get_ambassador_by_referral_code("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_insert_for_same_identity_is_rejected() {
        let store = MemoryStore::new(vec![]);

        let first = store.create_referral(payload("555")).await.unwrap();
        assert_eq!(first.id, 1);

        let second = store.create_referral(payload("555")).await;
        assert!(matches!(second, Err(StoreError::UniqueViolation(_))));

        store.create_referral(payload("556")).await.unwrap();
        assert_eq!(store.referral_count().await, 2);

        let found = store.get_referral_by_source("555", "Discord").await.unwrap();
        assert_eq!(found.map(|r| r.username), Some("bob".to_string()));
    }

    #[tokio::test]
    async fn concurrent_inserts_persist_one_row() {
        let store = Arc::new(MemoryStore::new(vec![]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_referral(payload("777")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.referral_count().await, 1);
    }
}
