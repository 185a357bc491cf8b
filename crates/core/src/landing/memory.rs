//! Process-local landing repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use uuid::Uuid;

use super::error::LandingError;
use super::service::LandingRepository;
use super::types::{Landing, LandingContent};

/// Landing repository kept in memory, for tests and local development.
///
/// Counts successful writes so callers can assert that rejected updates
/// never reached persistence.
#[derive(Debug, Default)]
pub struct InMemoryLandingRepository {
    pages: Mutex<HashMap<Uuid, Landing>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl InMemoryLandingRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pages(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Landing>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a page as-is, bypassing the write counter.
    pub fn insert(&self, landing: Landing) {
        self.pages().insert(landing.user_id, landing);
    }

    /// Current page of an owner.
    #[must_use]
    pub fn stored(&self, user_id: Uuid) -> Option<Landing> {
        self.pages().get(&user_id).cloned()
    }

    /// Number of successful upserts.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent upsert fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl LandingRepository for InMemoryLandingRepository {
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Landing>, LandingError> {
        Ok(self.stored(user_id))
    }

    async fn upsert_by_owner(
        &self,
        user_id: Uuid,
        content: LandingContent,
    ) -> Result<Landing, LandingError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LandingError::repository("in-memory writes disabled"));
        }
        // Let concurrent callers interleave here if nothing serializes them.
        tokio::task::yield_now().await;

        let now = Utc::now();
        let mut pages = self.pages();
        let landing = pages.entry(user_id).or_insert_with(|| Landing {
            id: Some(Uuid::new_v4()),
            created_at: Some(now),
            ..Landing::empty(user_id)
        });
        landing.content = content;
        landing.updated_at = Some(now);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(landing.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_keeps_identity() {
        let repo = InMemoryLandingRepository::new();
        let owner = Uuid::new_v4();

        let first = repo
            .upsert_by_owner(owner, LandingContent::default())
            .await
            .unwrap();
        let second = repo
            .upsert_by_owner(
                owner,
                LandingContent {
                    headline: Some("x".to_string()),
                    ..LandingContent::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(repo.writes(), 2);
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let repo = InMemoryLandingRepository::new();
        repo.fail_writes(true);
        let err = repo
            .upsert_by_owner(Uuid::new_v4(), LandingContent::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LandingError::Repository(_)));
        assert_eq!(repo.writes(), 0);
    }
}
