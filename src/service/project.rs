use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::Actor;
use crate::model::{NewProject, Project, non_blank};
use crate::store::RecordStore;

pub struct ProjectService {
    store: Arc<dyn RecordStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.list_projects().await?)
    }

    pub async fn create(&self, actor: &Actor, input: NewProject) -> Result<Project, ServiceError> {
        let name = non_blank(input.name)
            .ok_or_else(|| ServiceError::validation("Project name is required"))?;
        let mut project = Project::new(name);
        project.location = non_blank(input.location);
        project.description = non_blank(input.description);
        project.created_by = Some(actor.id());

        let saved = self.store.insert_project(&project).await?;
        info!(id = %saved.id, name = %saved.name, "project created");
        Ok(saved)
    }

    /// Removes the project together with its properties.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        let project = self
            .store
            .get_project(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Project {id} not found")))?;
        if !actor.is_admin() && project.created_by != Some(actor.id()) {
            return Err(ServiceError::forbidden(
                "You can only delete projects you created",
            ));
        }
        self.store.delete_project(id).await?;
        info!(%id, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Property;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn create_and_delete_with_cascade() {
        let store = Arc::new(MemoryStore::new());
        let svc = ProjectService::new(store.clone());
        let agent = Actor::Agent(Uuid::new_v4());
        let other = Actor::Agent(Uuid::new_v4());

        assert!(matches!(
            svc.create(&agent, NewProject::default()).await,
            Err(ServiceError::Validation(_))
        ));

        let project = svc
            .create(&agent, NewProject {
                name: Some(" Skyline Towers ".into()),
                location: Some("Baner".into()),
                description: Some("".into()),
            })
            .await
            .unwrap();
        assert_eq!(project.name, "Skyline Towers");
        assert_eq!(project.description, None);
        assert_eq!(project.created_by, Some(agent.id()));

        let mut p = Property::new("Unit 4B");
        p.project_id = Some(project.id);
        store.insert_property(&p).await.unwrap();

        assert!(matches!(
            svc.delete(&other, project.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        svc.delete(&agent, project.id).await.unwrap();
        assert!(svc.list().await.unwrap().is_empty());
        assert!(store.get_property(p.id).await.unwrap().is_none());
        assert!(matches!(
            svc.delete(&Actor::Admin(Uuid::new_v4()), project.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
