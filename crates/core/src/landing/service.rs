//! Landing service implementation.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::cleanup::spawn_orphan_cleanup;
use super::error::LandingError;
use super::policy::{resolve_content, should_delete_old_image};
use super::types::{Landing, LandingContent, LandingUpsert};
use crate::storage::{ImageStore, UploadedImage};

/// Repository trait for landing persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait LandingRepository: Send + Sync {
    /// Find the landing page owned by a user.
    fn find_by_owner(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Landing>, LandingError>> + Send;

    /// Atomically create or replace the landing page owned by a user.
    ///
    /// Every optional field is written, `None` included.
    fn upsert_by_owner(
        &self,
        user_id: Uuid,
        content: LandingContent,
    ) -> impl std::future::Future<Output = Result<Landing, LandingError>> + Send;
}

/// Landing service owning the upsert policy and image lifecycle.
///
/// Upserts for the same owner are serialized inside this service so the
/// read-decide-write sequence always sees the latest committed page. Owners
/// never contend with each other.
pub struct LandingService<R: LandingRepository> {
    repo: Arc<R>,
    store: ImageStore,
    owner_locks: OwnerLocks,
}

/// One async mutex per owner, dropped once nobody holds or waits on it.
#[derive(Debug, Clone, Default)]
struct OwnerLocks(Arc<DashMap<Uuid, Arc<Mutex<()>>>>);

impl OwnerLocks {
    fn acquire(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.0.entry(user_id).or_default().clone()
    }

    /// Call after dropping the handle returned by `acquire`.
    fn release(&self, user_id: Uuid) {
        self.0
            .remove_if(&user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<R: LandingRepository + 'static> LandingService<R> {
    /// Create a new landing service.
    #[must_use]
    pub fn new(repo: Arc<R>, store: ImageStore) -> Self {
        Self {
            repo,
            store,
            owner_locks: OwnerLocks::default(),
        }
    }

    /// The image store this service deletes from.
    #[must_use]
    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Get a user's landing page, or an empty page if none was ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn get(&self, user_id: Uuid) -> Result<Landing, LandingError> {
        Ok(self
            .repo
            .find_by_owner(user_id)
            .await?
            .unwrap_or_else(|| Landing::empty(user_id)))
    }

    /// Get a user's saved landing page.
    ///
    /// # Errors
    ///
    /// Returns [`LandingError::NotFound`] if the user never saved one.
    pub async fn find(&self, user_id: Uuid) -> Result<Landing, LandingError> {
        self.repo
            .find_by_owner(user_id)
            .await?
            .ok_or(LandingError::NotFound(user_id))
    }

    /// Apply a partial update to a user's landing page.
    ///
    /// If the update orphans the previously stored image, its deletion is
    /// started in the background after the new state is committed.
    ///
    /// The work runs on its own task: dropping the returned future (a client
    /// disconnect, a timeout) neither skips the deletion of an image replaced
    /// by a committed write nor leaks the owner's lock.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `InvalidImageUrl` if the image URL is not https with a host
    /// - `MissingImageKey` if a new image URL arrives without its key
    /// - `Repository` if loading or saving fails
    pub async fn upsert(
        &self,
        user_id: Uuid,
        update: LandingUpsert,
    ) -> Result<Landing, LandingError> {
        let (landing, _cleanup) = self.upsert_with_cleanup(user_id, update).await?;
        Ok(landing)
    }

    async fn upsert_with_cleanup(
        &self,
        user_id: Uuid,
        update: LandingUpsert,
    ) -> Result<(Landing, Option<JoinHandle<()>>), LandingError> {
        let repo = Arc::clone(&self.repo);
        let store = self.store.clone();
        let locks = self.owner_locks.clone();

        let task = tokio::spawn(async move {
            let lock = locks.acquire(user_id);
            let result = {
                let _guard = lock.lock().await;
                reconcile(repo.as_ref(), user_id, update).await
            };
            drop(lock);
            locks.release(user_id);

            let (landing, orphaned_key) = result?;

            let cleanup = match orphaned_key {
                Some(key) if store.is_enabled() => {
                    debug!(owner_id = %user_id, image_key = %key, "scheduling orphaned image deletion");
                    Some(spawn_orphan_cleanup(store, user_id, key))
                }
                _ => None,
            };

            Ok::<_, LandingError>((landing, cleanup))
        });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(LandingError::repository(format!("landing upsert task failed: {e}"))),
        }
    }

    /// Upload a landing image for a user.
    ///
    /// The returned key must be sent back with the image URL on the next upsert.
    ///
    /// # Errors
    ///
    /// Returns `Storage(UploadDisabled)` when no image store is configured, or
    /// the store's error if the upload fails.
    pub async fn upload_image(
        &self,
        user_id: Uuid,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, LandingError> {
        let size = bytes.len();
        let uploaded = self.store.upload(filename, content_type, bytes).await?;
        info!(
            owner_id = %user_id,
            image_key = %uploaded.key,
            size,
            provider = self.store.provider_name(),
            "landing image uploaded"
        );
        Ok(uploaded)
    }
}

/// Load, merge, validate and persist. Returns the saved page and the key it
/// no longer references, if any.
async fn reconcile<R: LandingRepository>(
    repo: &R,
    user_id: Uuid,
    update: LandingUpsert,
) -> Result<(Landing, Option<String>), LandingError> {
    let existing = repo.find_by_owner(user_id).await?;

    let content = resolve_content(existing.as_ref().map(|l| &l.content), update)?;
    let updated = repo.upsert_by_owner(user_id, content).await?;

    let orphaned_key = existing
        .and_then(|l| l.content.image_key)
        .filter(|old| should_delete_old_image(Some(old), updated.content.image_key.as_deref()));

    info!(owner_id = %user_id, image_replaced = orphaned_key.is_some(), "landing page saved");
    Ok((updated, orphaned_key))
}
