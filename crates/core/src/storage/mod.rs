//! Image storage for landing pages.
//!
//! The reconciliation logic only sees [`ImageStore`], a façade with two
//! capabilities: `upload` and `delete`. Which backend sits behind it is
//! decided once at startup from configuration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ImageStore                               │
//! │          upload(filename, content_type, bytes) / delete(key)     │
//! ├───────────────┬──────────────────────────────┬──────────────────┤
//! │   Disabled    │         UploadThing          │    InMemory      │
//! │ (no network)  │ prepareUpload → PUT → delete │     (tests)      │
//! └───────────────┴──────────────────────────────┴──────────────────┘
//! ```

pub mod content_type;
mod credentials;
mod error;
mod sanitize;
mod store;
mod uploadthing;

pub use credentials::UploadThingCredentials;
pub use error::StorageError;
pub use sanitize::{DEFAULT_FILENAME, sanitize_filename};
pub use store::{ImageStore, InMemoryImageStore, StoredObject, UploadedImage};
pub use uploadthing::{PreparedUpload, UploadThingClient, UploadThingConfig};
