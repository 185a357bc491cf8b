//! Detached deletion of orphaned landing images.

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::ImageStore;

/// Delete an image that no landing page references any more.
///
/// Runs on its own task so the request that orphaned the image neither waits
/// for it nor sees its outcome. Failures end up in the log only; nothing is
/// retried or persisted, so a crash before completion leaves the object behind.
pub fn spawn_orphan_cleanup(store: ImageStore, owner_id: Uuid, key: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.delete(&key).await {
            Ok(()) => debug!(owner_id = %owner_id, image_key = %key, "orphaned landing image deleted"),
            Err(e) => warn!(
                owner_id = %owner_id,
                image_key = %key,
                error = %e,
                "failed to delete orphaned landing image"
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryImageStore;

    #[tokio::test]
    async fn test_cleanup_deletes_key() {
        let memory = InMemoryImageStore::new();
        spawn_orphan_cleanup(ImageStore::InMemory(memory.clone()), Uuid::new_v4(), "k1".into())
            .await
            .unwrap();
        assert_eq!(memory.deleted_keys(), vec!["k1".to_string()]);
    }

    #[tokio::test]
    async fn test_cleanup_swallows_failures() {
        let memory = InMemoryImageStore::new();
        memory.fail_deletes(true);
        let handle =
            spawn_orphan_cleanup(ImageStore::InMemory(memory.clone()), Uuid::new_v4(), "k1".into());
        assert!(handle.await.is_ok());
        assert_eq!(memory.deleted_keys(), vec!["k1".to_string()]);
    }
}
