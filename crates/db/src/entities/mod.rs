//! `SeaORM` entity definitions.

pub mod landing_pages;

/// Commonly used entity types.
pub mod prelude {
    pub use super::landing_pages::Entity as LandingPages;
}
