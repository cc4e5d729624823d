//! In-memory store for unit tests, with failure injection for code lookups.
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::model::{
    AgentRef, Profile, Project, ProjectRef, Property, PropertyListing, Requirement,
    RequirementListing, Role,
};
use crate::store::{RecordStore, StoreError};

#[derive(Default)]
struct Tables {
    properties: Vec<Property>,
    projects: Vec<Project>,
    profiles: Vec<Profile>,
    requirements: Vec<Requirement>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_lookups: AtomicUsize,
    lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n` calls to `find_property_by_code` fail with `Unavailable`.
    pub fn fail_next_lookups(&self, n: usize) {
        self.failing_lookups.store(n, Ordering::SeqCst);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    fn agent_ref(t: &Tables, id: Option<Uuid>) -> Option<AgentRef> {
        let id = id?;
        t.profiles.iter().find(|p| p.id == id).map(|p| AgentRef {
            name: p.name.clone(),
            email: Some(p.email.clone()),
        })
    }

    fn listing(t: &Tables, p: &Property) -> PropertyListing {
        let project = p.project_id.and_then(|id| {
            t.projects.iter().find(|x| x.id == id).map(|x| ProjectRef {
                name: x.name.clone(),
                location: x.location.clone(),
            })
        });
        PropertyListing {
            property: p.clone(),
            project,
            agent: Self::agent_ref(t, p.agent_id),
        }
    }

    fn code_taken(t: &Tables, code: &str, except: Uuid) -> bool {
        t.properties.iter().any(|p| {
            p.id != except
                && p.property_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
        })
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_property_by_code(&self, code: &str) -> Result<Option<Property>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        let t = self.lock();
        Ok(t.properties
            .iter()
            .find(|p| {
                p.property_code
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(code))
            })
            .cloned())
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>, StoreError> {
        Ok(self.lock().properties.iter().find(|p| p.id == id).cloned())
    }

    async fn get_property_listing(
        &self,
        id: Uuid,
    ) -> Result<Option<PropertyListing>, StoreError> {
        let t = self.lock();
        Ok(t.properties
            .iter()
            .find(|p| p.id == id)
            .map(|p| Self::listing(&t, p)))
    }

    async fn list_properties(&self) -> Result<Vec<PropertyListing>, StoreError> {
        let t = self.lock();
        let mut out: Vec<_> = t.properties.iter().map(|p| Self::listing(&t, p)).collect();
        out.sort_by(|a, b| b.property.created_at.cmp(&a.property.created_at));
        Ok(out)
    }

    async fn insert_property(&self, property: &Property) -> Result<Property, StoreError> {
        let mut t = self.lock();
        if let Some(code) = property.property_code.as_deref()
            && Self::code_taken(&t, code, property.id)
        {
            return Err(StoreError::DuplicateCode(code.to_string()));
        }
        t.properties.push(property.clone());
        Ok(property.clone())
    }

    async fn update_property(&self, property: &Property) -> Result<Property, StoreError> {
        let mut t = self.lock();
        if let Some(code) = property.property_code.as_deref()
            && Self::code_taken(&t, code, property.id)
        {
            return Err(StoreError::DuplicateCode(code.to_string()));
        }
        let slot = t
            .properties
            .iter_mut()
            .find(|p| p.id == property.id)
            .ok_or_else(|| StoreError::Missing(format!("property {}", property.id)))?;
        *slot = property.clone();
        Ok(property.clone())
    }

    async fn delete_property(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.lock();
        let before = t.properties.len();
        t.properties.retain(|p| p.id != id);
        Ok(t.properties.len() != before)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.lock().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.lock().projects.clone())
    }

    async fn insert_project(&self, project: &Project) -> Result<Project, StoreError> {
        self.lock().projects.push(project.clone());
        Ok(project.clone())
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.lock();
        let before = t.projects.len();
        t.projects.retain(|p| p.id != id);
        t.properties.retain(|p| p.project_id != Some(id));
        Ok(t.projects.len() != before)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self.lock().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .filter(|p| role.is_none_or(|r| p.role == r))
            .cloned()
            .collect())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        self.lock().profiles.push(profile.clone());
        Ok(profile.clone())
    }

    async fn get_requirement(&self, id: Uuid) -> Result<Option<Requirement>, StoreError> {
        Ok(self.lock().requirements.iter().find(|r| r.id == id).cloned())
    }

    async fn list_requirements(&self) -> Result<Vec<RequirementListing>, StoreError> {
        let t = self.lock();
        let mut out: Vec<_> = t
            .requirements
            .iter()
            .map(|r| RequirementListing {
                requirement: r.clone(),
                assigned_agent: Self::agent_ref(&t, r.assigned_agent_id),
                creator: Self::agent_ref(&t, r.created_by),
            })
            .collect();
        out.sort_by(|a, b| b.requirement.created_at.cmp(&a.requirement.created_at));
        Ok(out)
    }

    async fn insert_requirement(
        &self,
        requirement: &Requirement,
    ) -> Result<Requirement, StoreError> {
        self.lock().requirements.push(requirement.clone());
        Ok(requirement.clone())
    }

    async fn update_requirement(
        &self,
        requirement: &Requirement,
    ) -> Result<Requirement, StoreError> {
        let mut t = self.lock();
        let slot = t
            .requirements
            .iter_mut()
            .find(|r| r.id == requirement.id)
            .ok_or_else(|| StoreError::Missing(format!("requirement {}", requirement.id)))?;
        *slot = requirement.clone();
        Ok(requirement.clone())
    }

    async fn delete_requirement(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut t = self.lock();
        let before = t.requirements.len();
        t.requirements.retain(|r| r.id != id);
        Ok(t.requirements.len() != before)
    }
}
