//! Image store façade.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use callflow_shared::StorageSettings;
use serde::Serialize;
use tokio::sync::Notify;
use uuid::Uuid;

use super::error::StorageError;
use super::sanitize::sanitize_filename;
use super::uploadthing::UploadThingClient;

/// Result of a successful upload. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    /// Public address of the stored object.
    #[serde(rename = "image_url")]
    pub url: String,
    /// Opaque handle needed to delete the object later.
    #[serde(rename = "image_key")]
    pub key: String,
}

/// Where landing images are stored, chosen once at startup.
#[derive(Debug, Clone)]
pub enum ImageStore {
    /// No provider configured: uploads fail, deletes do nothing.
    Disabled,
    /// UploadThing REST API.
    UploadThing(UploadThingClient),
    /// Process-local store for tests and local development.
    InMemory(InMemoryImageStore),
}

impl ImageStore {
    /// Select the store from configuration.
    ///
    /// No token means [`ImageStore::Disabled`].
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if a token is present but unusable.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        Ok(UploadThingClient::from_settings(settings)?.map_or(Self::Disabled, Self::UploadThing))
    }

    /// Whether uploads can succeed at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Backend name for logs.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::UploadThing(_) => "uploadthing",
            Self::InMemory(_) => "memory",
        }
    }

    /// Store an image and return its public URL and key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UploadDisabled`] when no backend is configured,
    /// otherwise whatever the backend reports.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, StorageError> {
        match self {
            Self::Disabled => Err(StorageError::UploadDisabled),
            Self::UploadThing(client) => client.upload(filename, content_type, bytes).await,
            Self::InMemory(store) => store.upload(filename, content_type, bytes),
        }
    }

    /// Delete a stored image. Blank keys and a disabled store are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Disabled => Ok(()),
            Self::UploadThing(client) => client.delete(key).await,
            Self::InMemory(store) => store.delete(key),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: HashMap<String, StoredObject>,
    deleted: Vec<String>,
    fail_deletes: bool,
}

/// An object held by [`InMemoryImageStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Sanitized filename.
    pub file_name: String,
    /// Content type given at upload.
    pub content_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

/// Process-local image store.
///
/// Records every delete so callers can observe detached cleanup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageStore {
    state: Arc<Mutex<MemoryState>>,
    deleted_signal: Arc<Notify>,
}

impl InMemoryImageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent delete fail.
    pub fn fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }

    /// Put an object under a caller-chosen key.
    pub fn insert(&self, key: impl Into<String>, object: StoredObject) {
        self.lock().objects.insert(key.into(), object);
    }

    /// Look up a stored object.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.lock().objects.get(key).cloned()
    }

    /// Keys for which a delete was attempted, in order.
    #[must_use]
    pub fn deleted_keys(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    /// Wait until at least `count` deletes have been attempted.
    pub async fn wait_for_deletes(&self, count: usize) {
        loop {
            let notified = self.deleted_signal.notified();
            if self.lock().deleted.len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }
        let key = Uuid::new_v4().simple().to_string();
        self.insert(
            key.clone(),
            StoredObject {
                file_name: sanitize_filename(filename),
                content_type: content_type.trim().to_string(),
                bytes,
            },
        );
        Ok(UploadedImage {
            url: format!("https://memory.invalid/f/{key}"),
            key,
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(());
        }
        let result = {
            let mut state = self.lock();
            state.deleted.push(key.to_string());
            if state.fail_deletes {
                Err(StorageError::request_failed(
                    "delete",
                    "503 Service Unavailable",
                    "memory store refusing deletes",
                ))
            } else {
                state.objects.remove(key);
                Ok(())
            }
        };
        self.deleted_signal.notify_waiters();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_store() {
        let store = ImageStore::Disabled;
        assert!(!store.is_enabled());
        assert!(matches!(
            store.upload("a.png", "image/png", b"x".to_vec()).await,
            Err(StorageError::UploadDisabled)
        ));
        assert!(store.delete("k1").await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_store_upload_and_delete() {
        let memory = InMemoryImageStore::new();
        let store = ImageStore::InMemory(memory.clone());

        let uploaded = store
            .upload("../a b.png", "image/png", b"bytes".to_vec())
            .await
            .unwrap();
        assert!(uploaded.url.ends_with(&uploaded.key));
        let stored = memory.get(&uploaded.key).unwrap();
        assert_eq!(stored.file_name, "a_b.png");

        store.delete(&uploaded.key).await.unwrap();
        assert!(memory.get(&uploaded.key).is_none());
        assert_eq!(memory.deleted_keys(), vec![uploaded.key]);
    }

    #[tokio::test]
    async fn test_memory_store_blank_delete_not_recorded() {
        let memory = InMemoryImageStore::new();
        ImageStore::InMemory(memory.clone()).delete(" ").await.unwrap();
        assert!(memory.deleted_keys().is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_failing_deletes() {
        let memory = InMemoryImageStore::new();
        memory.fail_deletes(true);
        let err = ImageStore::InMemory(memory.clone())
            .delete("k1")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::RequestFailed { .. }));
        assert_eq!(memory.deleted_keys(), vec!["k1".to_string()]);
    }

    #[test]
    fn test_uploaded_image_serializes_wire_names() {
        let image = UploadedImage {
            url: "https://app.ufs.sh/f/k".to_string(),
            key: "k".to_string(),
        };
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"image_url": "https://app.ufs.sh/f/k", "image_key": "k"})
        );
    }

    #[test]
    fn test_from_settings_without_token_is_disabled() {
        let settings = StorageSettings {
            token: Some(String::new()),
            ..StorageSettings::default()
        };
        temp_env::with_var_unset(callflow_shared::config::UPLOADTHING_TOKEN_ENV, || {
            let store = ImageStore::from_settings(&settings).unwrap();
            assert_eq!(store.provider_name(), "disabled");
        });
    }
}
