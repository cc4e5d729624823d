//! Use cases over the record store, each gated by the caller's [`Actor`](crate::auth::Actor).
pub mod error;
pub mod profile;
pub mod project;
pub mod property;
pub mod requirement;

use anyhow::{Context, Result, bail};
use std::sync::Arc;

pub use error::ServiceError;
pub use profile::ProfileService;
pub use project::ProjectService;
pub use property::PropertyService;
pub use requirement::RequirementService;

use crate::blob::BlobStore;
use crate::codegen::{CodeAuthority, CodeGenerator, RemoteCodeAuthority, SqlCodeAuthority};
use crate::config::{AppConfig, AuthorityKind};
use crate::filter::{DashboardStats, dashboard_stats};
use crate::store::{RecordStore, SqlStore};

/// Number of listings shown under "recent" on the dashboard.
pub const RECENT_LISTINGS: usize = 5;

pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub properties: PropertyService,
    pub requirements: RequirementService,
    pub projects: ProjectService,
    pub profiles: ProfileService,
}

impl Services {
    pub fn new(
        store: Arc<dyn RecordStore>,
        codes: CodeGenerator,
        blobs: Option<Arc<dyn BlobStore>>,
    ) -> Self {
        let mut properties = PropertyService::new(store.clone(), codes);
        if let Some(blobs) = blobs {
            properties = properties.with_blobs(blobs);
        }
        Self {
            properties,
            requirements: RequirementService::new(store.clone()),
            projects: ProjectService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            store,
        }
    }

    /// Wires the services over a SQL store the way `config` asks.
    pub fn from_config(
        config: &AppConfig,
        store: SqlStore,
        blobs: Option<Arc<dyn BlobStore>>,
    ) -> Result<Self> {
        let authority = build_authority(config, &store)?;
        let store: Arc<dyn RecordStore> = Arc::new(store);
        let codes = CodeGenerator::new(store.clone(), authority, config.codegen.clone());
        Ok(Self::new(store, codes, blobs))
    }

    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let profiles = self.store.list_profiles(None).await?;
        let projects = self.store.list_projects().await?;
        let properties = self.store.list_properties().await?;
        Ok(dashboard_stats(
            &profiles,
            &projects,
            &properties,
            RECENT_LISTINGS,
        ))
    }
}

fn build_authority(
    config: &AppConfig,
    store: &SqlStore,
) -> Result<Option<Arc<dyn CodeAuthority>>> {
    let cfg = &config.codegen;
    match cfg.authority {
        AuthorityKind::Local => Ok(Some(Arc::new(SqlCodeAuthority::new(
            store.connection().clone(),
        )))),
        AuthorityKind::Remote => {
            let Some(url) = cfg.authority_url.as_deref() else {
                bail!("code authority is 'remote' but no authority_url is configured");
            };
            let remote = RemoteCodeAuthority::new(url, cfg.authority_key.clone())
                .context("Failed to build code authority client")?;
            Ok(Some(Arc::new(remote)))
        }
        AuthorityKind::None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Actor;
    use crate::config::CodegenConfig;
    use crate::model::{NewProperty, Profile, PropertyStatus, Role};
    use crate::store::dao::tests::setup_test_store;

    #[tokio::test]
    async fn local_authority_issues_sequential_codes() {
        let (_tmp, store) = setup_test_store().await;
        let config = AppConfig::default();
        let services = Services::from_config(&config, store, None).unwrap();

        let admin = Profile::new("Root", "root@example.com", Role::Admin);
        services.store.insert_profile(&admin).await.unwrap();
        let actor = Actor::from_profile(&admin);

        let mut codes = Vec::new();
        for title in ["A", "B"] {
            let p = services
                .properties
                .create(&actor, NewProperty {
                    title: Some(title.into()),
                    property_code_type: Some("Old House".into()),
                    status: Some(PropertyStatus::Sold),
                    ..Default::default()
                })
                .await
                .unwrap();
            codes.push(p.property_code.unwrap());
        }
        assert_eq!(codes, vec!["OH001".to_string(), "OH002".to_string()]);

        let stats = services.stats().await.unwrap();
        assert_eq!(stats.total_properties, 2);
        assert_eq!(stats.sold_properties, 2);
        assert_eq!(stats.total_agents, 0);
    }

    #[tokio::test]
    async fn remote_authority_requires_url() {
        let (_tmp, store) = setup_test_store().await;
        let config = AppConfig {
            codegen: CodegenConfig {
                authority: AuthorityKind::Remote,
                ..CodegenConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(Services::from_config(&config, store, None).is_err());
    }
}
