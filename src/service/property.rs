use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceError;
use crate::auth::Actor;
use crate::blob::{BlobStore, image_object_path};
use crate::codegen::CodeGenerator;
use crate::filter::{PropertyCriteria, filter_properties};
use crate::model::{NewProperty, Property, PropertyListing, PropertyPatch, non_blank};
use crate::store::{RecordStore, StoreError};
use crate::suggest::{Suggestion, suggest};

pub struct PropertyService {
    store: Arc<dyn RecordStore>,
    codes: CodeGenerator,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl PropertyService {
    pub fn new(store: Arc<dyn RecordStore>, codes: CodeGenerator) -> Self {
        Self {
            store,
            codes,
            blobs: None,
        }
    }

    pub fn with_blobs(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    pub fn codes(&self) -> &CodeGenerator {
        &self.codes
    }

    pub async fn list(
        &self,
        criteria: &PropertyCriteria,
    ) -> Result<Vec<PropertyListing>, ServiceError> {
        let all = self.store.list_properties().await?;
        Ok(filter_properties(&all, criteria)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn suggest(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Suggestion>, ServiceError> {
        let all = self.store.list_properties().await?;
        Ok(suggest(&all, query, max_results))
    }

    pub async fn get(&self, id: Uuid) -> Result<PropertyListing, ServiceError> {
        self.store
            .get_property_listing(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Property {id} not found")))
    }

    async fn check_references(&self, property: &Property) -> Result<(), ServiceError> {
        if let Some(agent_id) = property.agent_id
            && self.store.get_profile(agent_id).await?.is_none()
        {
            return Err(ServiceError::InvalidReference("Invalid agent_id".into()));
        }
        if let Some(project_id) = property.project_id
            && self.store.get_project(project_id).await?.is_none()
        {
            return Err(ServiceError::InvalidReference("Invalid project_id".into()));
        }
        Ok(())
    }

    /// Fills in a missing code when a code type is set. Returns whether a code was generated.
    async fn assign_code(&self, property: &mut Property) -> Result<bool, ServiceError> {
        if property.property_code.is_some() {
            return Ok(false);
        }
        let Some(code_type) = property.property_code_type.clone() else {
            return Ok(false);
        };
        property.property_code = Some(self.codes.generate(&code_type).await?);
        Ok(true)
    }

    /// Writes `property`. A generated code that hits the unique index at write
    /// time is regenerated.
    async fn save(
        &self,
        mut property: Property,
        generated: bool,
        insert: bool,
    ) -> Result<Property, ServiceError> {
        if property.has_pending_code() {
            return Err(ServiceError::validation(
                "Property code is required when a code type is set",
            ));
        }

        let retries = self.codes.config().insert_retries;
        let mut attempt = 0;
        loop {
            let res = if insert {
                self.store.insert_property(&property).await
            } else {
                self.store.update_property(&property).await
            };
            match res {
                Ok(saved) => return Ok(saved),
                Err(StoreError::DuplicateCode(code)) if generated && attempt < retries => {
                    attempt += 1;
                    warn!(
                        code = %code,
                        attempt,
                        "generated code taken at write time; regenerating"
                    );
                    let code_type = property.property_code_type.clone().unwrap_or_default();
                    property.property_code = Some(self.codes.generate(&code_type).await?);
                }
                Err(StoreError::DuplicateCode(code)) => {
                    return Err(ServiceError::Validation(format!(
                        "Property code {code} is already in use"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: NewProperty,
    ) -> Result<Property, ServiceError> {
        let title = non_blank(input.title.clone())
            .ok_or_else(|| ServiceError::validation("Title is required"))?;
        let mut property = input.into_property(title);

        property.agent_id = match actor {
            Actor::Agent(id) => Some(*id),
            Actor::Admin(id) => property.agent_id.or(Some(*id)),
        };
        self.check_references(&property).await?;

        let generated = self.assign_code(&mut property).await?;
        let saved = self.save(property, generated, true).await?;
        info!(
            id = %saved.id,
            code = saved.property_code.as_deref().unwrap_or("-"),
            "property created"
        );
        Ok(saved)
    }

    async fn load_for_mutation(&self, actor: &Actor, id: Uuid) -> Result<Property, ServiceError> {
        let property = self
            .store
            .get_property(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Property {id} not found")))?;
        if !actor.can_mutate_property(&property) {
            return Err(ServiceError::forbidden(
                "You can only modify properties assigned to you",
            ));
        }
        Ok(property)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: PropertyPatch,
    ) -> Result<Property, ServiceError> {
        let mut property = self.load_for_mutation(actor, id).await?;

        if let (Actor::Agent(me), Some(agent_id)) = (actor, patch.agent_id)
            && agent_id != *me
        {
            return Err(ServiceError::forbidden(
                "Agents cannot reassign properties to another agent",
            ));
        }
        patch.apply(&mut property);
        if property.title.is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        self.check_references(&property).await?;

        let generated = self.assign_code(&mut property).await?;
        property.updated_at = Utc::now();
        let saved = self.save(property, generated, false).await?;
        info!(id = %saved.id, "property updated");
        Ok(saved)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        self.load_for_mutation(actor, id).await?;
        self.store.delete_property(id).await?;
        info!(%id, "property deleted");
        Ok(())
    }

    /// Uploads an image and appends its public URL to the property.
    pub async fn attach_image(
        &self,
        actor: &Actor,
        id: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Property, ServiceError> {
        let blobs = self
            .blobs
            .as_ref()
            .ok_or_else(|| ServiceError::validation("Image uploads are not configured"))?;
        let mut property = self.load_for_mutation(actor, id).await?;

        let owner = match actor {
            Actor::Admin(_) => "admin".to_string(),
            Actor::Agent(agent) => agent.to_string(),
        };
        let url = blobs
            .upload(bytes, &image_object_path(&owner, file_name))
            .await?;
        property.images.push(url);
        property.updated_at = Utc::now();
        Ok(self.store.update_property(&property).await?)
    }
}
