//! Core business logic for Callflow landing pages.
//!
//! This crate contains pure business logic with ZERO web server or database
//! dependencies. Persistence is reached through the [`landing::LandingRepository`]
//! trait, implemented by the db crate.
//!
//! # Modules
//!
//! - `storage` - Image storage façade and the UploadThing object store protocol
//! - `landing` - Landing page reconciliation (normalization, image key policy, orphan cleanup)

pub mod landing;
pub mod storage;
