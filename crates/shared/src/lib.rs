//! Shared types, errors, and configuration for Callflow.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::{AppConfig, StorageSettings};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
