//! Record store: the relational backend behind every listing page.
//!
//! [`RecordStore`] is the seam the services and the code generator talk to.
//! [`SqlStore`] is the SeaORM/SQLite implementation used by the binary.
pub mod connection;
pub mod conversions;
pub mod dao;
pub mod entities;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod migration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    Profile, Project, Property, PropertyListing, Requirement, RequirementListing, Role,
};

pub use dao::SqlStore;
pub use error::StoreError;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Looks up a property by code. Codes compare case-insensitively.
    async fn find_property_by_code(&self, code: &str) -> Result<Option<Property>, StoreError>;
    async fn get_property(&self, id: Uuid) -> Result<Option<Property>, StoreError>;
    async fn get_property_listing(&self, id: Uuid)
    -> Result<Option<PropertyListing>, StoreError>;
    /// All properties joined with project and agent, newest first.
    async fn list_properties(&self) -> Result<Vec<PropertyListing>, StoreError>;
    async fn insert_property(&self, property: &Property) -> Result<Property, StoreError>;
    async fn update_property(&self, property: &Property) -> Result<Property, StoreError>;
    async fn delete_property(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;
    async fn insert_project(&self, project: &Project) -> Result<Project, StoreError>;
    /// Deletes the project and every property that belongs to it.
    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>, StoreError>;
    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, StoreError>;

    async fn get_requirement(&self, id: Uuid) -> Result<Option<Requirement>, StoreError>;
    /// All requirements joined with assigned agent and creator, newest first.
    async fn list_requirements(&self) -> Result<Vec<RequirementListing>, StoreError>;
    async fn insert_requirement(&self, requirement: &Requirement)
    -> Result<Requirement, StoreError>;
    async fn update_requirement(&self, requirement: &Requirement)
    -> Result<Requirement, StoreError>;
    async fn delete_requirement(&self, id: Uuid) -> Result<bool, StoreError>;
}
