//! Module to export all database entities.
pub mod profile;
pub mod project;
pub mod property;
pub mod requirement;

pub use profile::Entity as ProfileEntity;
pub use project::Entity as ProjectEntity;
pub use property::Entity as PropertyEntity;
pub use requirement::Entity as RequirementEntity;
