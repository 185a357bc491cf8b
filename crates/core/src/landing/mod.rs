//! Landing page management.
//!
//! This module owns the upsert policy for a user's landing page:
//! - Input normalization (trim, blank clears the field)
//! - Image key retention across metadata-only updates
//! - Image URL / key validation
//! - Detached deletion of images no longer referenced

mod cleanup;
mod error;
mod memory;
mod policy;
mod service;
mod types;

pub use cleanup::spawn_orphan_cleanup;
pub use error::LandingError;
pub use memory::InMemoryLandingRepository;
pub use policy::{resolve_content, should_delete_old_image, validate_image_url};
pub use service::{LandingRepository, LandingService};
pub use types::{Landing, LandingContent, LandingUpsert, Patch};
