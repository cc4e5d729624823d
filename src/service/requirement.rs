use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::Actor;
use crate::filter::{RequirementCriteria, filter_requirements};
use crate::model::{
    NewRequirement, Requirement, RequirementListing, RequirementPatch, RequirementStatus, Role,
    non_blank, requirement::clean_locations,
};
use crate::store::RecordStore;

pub struct RequirementService {
    store: Arc<dyn RecordStore>,
}

impl RequirementService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        criteria: &RequirementCriteria,
    ) -> Result<Vec<RequirementListing>, ServiceError> {
        let all = self.store.list_requirements().await?;
        Ok(filter_requirements(&all, criteria)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<RequirementListing, ServiceError> {
        self.store
            .list_requirements()
            .await?
            .into_iter()
            .find(|r| r.requirement.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Requirement {id} not found")))
    }

    async fn check_agent(&self, agent_id: Uuid) -> Result<(), ServiceError> {
        match self.store.get_profile(agent_id).await? {
            Some(p) if p.role == Role::Agent => Ok(()),
            _ => Err(ServiceError::InvalidReference(
                "Invalid assigned_agent_id".into(),
            )),
        }
    }

    /// Agents always own what they create; admins may pick an assignee.
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewRequirement,
    ) -> Result<Requirement, ServiceError> {
        let title = non_blank(input.title)
            .ok_or_else(|| ServiceError::validation("Title is required"))?;
        let customer_name = non_blank(input.customer_name)
            .ok_or_else(|| ServiceError::validation("Customer name is required"))?;
        let customer_phone = non_blank(input.customer_phone)
            .ok_or_else(|| ServiceError::validation("Customer phone is required"))?;

        let mut r = Requirement::new(title, customer_name, customer_phone);
        r.description = non_blank(input.description);
        r.customer_email = non_blank(input.customer_email);
        r.property_type = non_blank(input.property_type);
        r.price = input.price;
        r.bedrooms = input.bedrooms;
        r.bathrooms = input.bathrooms;
        r.area = input.area;
        r.preferred_locations = clean_locations(input.preferred_locations);
        r.priority = input.priority.unwrap_or_default();
        r.status = input.status.unwrap_or_default();
        r.notes = non_blank(input.notes);
        r.created_by = Some(actor.id());
        r.assigned_agent_id = match actor {
            Actor::Agent(id) => Some(*id),
            Actor::Admin(_) => input.assigned_agent_id,
        };
        if let (Actor::Admin(_), Some(agent_id)) = (actor, r.assigned_agent_id) {
            self.check_agent(agent_id).await?;
        }

        let saved = self.store.insert_requirement(&r).await?;
        info!(id = %saved.id, priority = %saved.priority, "requirement created");
        Ok(saved)
    }

    async fn load_for_mutation(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<Requirement, ServiceError> {
        let r = self
            .store
            .get_requirement(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Requirement {id} not found")))?;
        if !actor.can_mutate_requirement(&r) {
            return Err(ServiceError::forbidden(
                "You can only modify requirements you created or are assigned to",
            ));
        }
        Ok(r)
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: RequirementPatch,
    ) -> Result<Requirement, ServiceError> {
        let mut r = self.load_for_mutation(actor, id).await?;
        if let Some(agent_id) = patch.assigned_agent_id {
            if !actor.is_admin() {
                return Err(ServiceError::forbidden("Only admins can assign requirements"));
            }
            self.check_agent(agent_id).await?;
        }
        patch.apply(&mut r);
        if r.title.is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        if r.customer_name.is_empty() {
            return Err(ServiceError::validation("Customer name is required"));
        }
        if r.customer_phone.is_empty() {
            return Err(ServiceError::validation("Customer phone is required"));
        }
        Ok(self.store.update_requirement(&r).await?)
    }

    pub async fn set_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: RequirementStatus,
    ) -> Result<Requirement, ServiceError> {
        let patch = RequirementPatch {
            status: Some(status),
            ..Default::default()
        };
        let saved = self.update(actor, id, patch).await?;
        info!(%id, status = %status, "requirement status changed");
        Ok(saved)
    }

    /// Admin only. `None` clears the assignment.
    pub async fn assign(
        &self,
        actor: &Actor,
        id: Uuid,
        agent_id: Option<Uuid>,
    ) -> Result<Requirement, ServiceError> {
        if !actor.is_admin() {
            return Err(ServiceError::forbidden("Only admins can assign requirements"));
        }
        let mut r = self.load_for_mutation(actor, id).await?;
        if let Some(agent_id) = agent_id {
            self.check_agent(agent_id).await?;
        }
        r.assigned_agent_id = agent_id;
        r.updated_at = chrono::Utc::now();
        let saved = self.store.update_requirement(&r).await?;
        info!(%id, agent = ?agent_id, "requirement assigned");
        Ok(saved)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        self.load_for_mutation(actor, id).await?;
        self.store.delete_requirement(id).await?;
        info!(%id, "requirement deleted");
        Ok(())
    }
}
