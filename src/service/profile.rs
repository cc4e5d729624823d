use std::sync::Arc;
use tracing::info;

use super::ServiceError;
use crate::auth::Actor;
use crate::model::{Profile, Role};
use crate::store::RecordStore;

pub struct ProfileService {
    store: Arc<dyn RecordStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn agents(&self) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.store.list_profiles(Some(Role::Agent)).await?)
    }

    pub async fn all(&self) -> Result<Vec<Profile>, ServiceError> {
        Ok(self.store.list_profiles(None).await?)
    }

    /// Creates a profile. Only admins may add people, except for the very first admin.
    pub async fn create(
        &self,
        actor: Option<&Actor>,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<Profile, ServiceError> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Name is required"));
        }
        if !email.contains('@') {
            return Err(ServiceError::validation("A valid email is required"));
        }

        match actor {
            Some(a) if a.is_admin() => {}
            Some(_) => return Err(ServiceError::forbidden("Only admins can add people")),
            None => {
                let bootstrap = role == Role::Admin
                    && self
                        .store
                        .list_profiles(Some(Role::Admin))
                        .await?
                        .is_empty();
                if !bootstrap {
                    return Err(ServiceError::forbidden("Only admins can add people"));
                }
            }
        }

        let all = self.store.list_profiles(None).await?;
        if all.iter().any(|p| p.email.eq_ignore_ascii_case(email)) {
            return Err(ServiceError::Validation(format!(
                "A profile with email {email} already exists"
            )));
        }

        let saved = self
            .store
            .insert_profile(&Profile::new(name, email, role))
            .await?;
        info!(id = %saved.id, role = %saved.role, "profile created");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn bootstrap_then_admin_only() {
        let svc = ProfileService::new(Arc::new(MemoryStore::new()));

        assert!(matches!(
            svc.create(None, "Ann", "ann@example.com", Role::Agent).await,
            Err(ServiceError::Forbidden(_))
        ));
        let root = svc
            .create(None, "Root", "root@example.com", Role::Admin)
            .await
            .unwrap();
        assert!(matches!(
            svc.create(None, "Eve", "eve@example.com", Role::Admin).await,
            Err(ServiceError::Forbidden(_))
        ));

        let admin = Actor::from_profile(&root);
        let ann = svc
            .create(Some(&admin), "Ann", "ann@example.com", Role::Agent)
            .await
            .unwrap();
        assert!(matches!(
            svc.create(Some(&Actor::from_profile(&ann)), "Bo", "bo@example.com", Role::Agent)
                .await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            svc.create(Some(&admin), "Dup", "ANN@example.com", Role::Agent).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            svc.create(Some(&admin), "NoMail", "nomail", Role::Agent).await,
            Err(ServiceError::Validation(_))
        ));

        let agents = svc.agents().await.unwrap();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "Ann");
        assert_eq!(svc.all().await.unwrap().len(), 2);
    }
}
