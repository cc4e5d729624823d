use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{
    AgentRef, Profile, Project, ProjectRef, Property, PropertyListing, Requirement,
    RequirementListing, Role,
};
use crate::store::RecordStore;
use crate::store::connection::{connect_database, ensure_sqlite_dir};
use crate::store::conversions::{
    model_to_profile, model_to_project, model_to_property, model_to_requirement,
    profile_to_active_model, project_to_active_model, property_to_active_model,
    requirement_to_active_model,
};
use crate::store::entities::{
    ProfileEntity, ProjectEntity, PropertyEntity, RequirementEntity, profile, property,
    requirement,
};
use crate::store::error::StoreError;
use crate::store::migration::run_migrations;

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqlStore {
    conn: DatabaseConnection,
}

impl SqlStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Connects to `url` and brings the schema up to date.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        ensure_sqlite_dir(url).map_err(|e| {
            StoreError::Unavailable(format!("cannot create database directory: {e}"))
        })?;
        let conn = connect_database(url).await?;
        run_migrations(&conn).await?;
        info!("Record store ready");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    async fn agent_refs(&self) -> Result<HashMap<Uuid, AgentRef>, StoreError> {
        let rows = ProfileEntity::find().all(&self.conn).await?;
        Ok(rows
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    AgentRef {
                        name: m.name,
                        email: Some(m.email),
                    },
                )
            })
            .collect())
    }

    async fn project_refs(&self) -> Result<HashMap<Uuid, ProjectRef>, StoreError> {
        let rows = ProjectEntity::find().all(&self.conn).await?;
        Ok(rows
            .into_iter()
            .map(|m| {
                (
                    m.id,
                    ProjectRef {
                        name: m.name,
                        location: m.location,
                    },
                )
            })
            .collect())
    }
}

fn map_property_write(err: DbErr, property: &Property) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            StoreError::DuplicateCode(property.property_code.clone().unwrap_or_default())
        }
        _ => match err {
            DbErr::RecordNotUpdated => StoreError::Missing(format!("property {}", property.id)),
            other => StoreError::Database(other),
        },
    }
}

fn join_property(
    property: Property,
    projects: &HashMap<Uuid, ProjectRef>,
    agents: &HashMap<Uuid, AgentRef>,
) -> PropertyListing {
    PropertyListing {
        project: property.project_id.and_then(|id| projects.get(&id).cloned()),
        agent: property.agent_id.and_then(|id| agents.get(&id).cloned()),
        property,
    }
}

#[async_trait]
impl RecordStore for SqlStore {
    async fn find_property_by_code(&self, code: &str) -> Result<Option<Property>, StoreError> {
        // property_code is declared COLLATE NOCASE, so `=` ignores case
        let found = PropertyEntity::find()
            .filter(property::Column::PropertyCode.eq(code))
            .one(&self.conn)
            .await?;
        found.map(model_to_property).transpose()
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>, StoreError> {
        let found = PropertyEntity::find_by_id(id).one(&self.conn).await?;
        found.map(model_to_property).transpose()
    }

    async fn get_property_listing(
        &self,
        id: Uuid,
    ) -> Result<Option<PropertyListing>, StoreError> {
        let Some(property) = self.get_property(id).await? else {
            return Ok(None);
        };
        let project = match property.project_id {
            Some(pid) => ProjectEntity::find_by_id(pid)
                .one(&self.conn)
                .await?
                .map(|m| ProjectRef {
                    name: m.name,
                    location: m.location,
                }),
            None => None,
        };
        let agent = match property.agent_id {
            Some(aid) => ProfileEntity::find_by_id(aid)
                .one(&self.conn)
                .await?
                .map(|m| AgentRef {
                    name: m.name,
                    email: Some(m.email),
                }),
            None => None,
        };
        Ok(Some(PropertyListing {
            property,
            project,
            agent,
        }))
    }

    async fn list_properties(&self) -> Result<Vec<PropertyListing>, StoreError> {
        let rows = PropertyEntity::find()
            .order_by_desc(property::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        let projects = self.project_refs().await?;
        let agents = self.agent_refs().await?;
        debug!("Loaded {} properties", rows.len());

        rows.into_iter()
            .map(|m| model_to_property(m).map(|p| join_property(p, &projects, &agents)))
            .collect()
    }

    async fn insert_property(&self, property: &Property) -> Result<Property, StoreError> {
        let model = property_to_active_model(property)
            .insert(&self.conn)
            .await
            .map_err(|e| map_property_write(e, property))?;
        model_to_property(model)
    }

    async fn update_property(&self, property: &Property) -> Result<Property, StoreError> {
        let model = property_to_active_model(property)
            .update(&self.conn)
            .await
            .map_err(|e| map_property_write(e, property))?;
        model_to_property(model)
    }

    async fn delete_property(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = PropertyEntity::delete_by_id(id).exec(&self.conn).await?;
        Ok(res.rows_affected > 0)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let found = ProjectEntity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(model_to_project))
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let rows = ProjectEntity::find()
            .order_by_desc(crate::store::entities::project::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(model_to_project).collect())
    }

    async fn insert_project(&self, project: &Project) -> Result<Project, StoreError> {
        let model = project_to_active_model(project).insert(&self.conn).await?;
        Ok(model_to_project(model))
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let txn = self.conn.begin().await?;
        let removed = PropertyEntity::delete_many()
            .filter(property::Column::ProjectId.eq(id))
            .exec(&txn)
            .await?;
        let res = ProjectEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        if res.rows_affected > 0 {
            info!(
                "Deleted project {} with {} properties",
                id, removed.rows_affected
            );
        }
        Ok(res.rows_affected > 0)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let found = ProfileEntity::find_by_id(id).one(&self.conn).await?;
        found.map(model_to_profile).transpose()
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>, StoreError> {
        let mut query = ProfileEntity::find().order_by_asc(profile::Column::Name);
        if let Some(role) = role {
            query = query.filter(profile::Column::Role.eq(role.as_str()));
        }
        query
            .all(&self.conn)
            .await?
            .into_iter()
            .map(model_to_profile)
            .collect()
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile, StoreError> {
        let model = profile_to_active_model(profile).insert(&self.conn).await?;
        model_to_profile(model)
    }

    async fn get_requirement(&self, id: Uuid) -> Result<Option<Requirement>, StoreError> {
        let found = RequirementEntity::find_by_id(id).one(&self.conn).await?;
        found.map(model_to_requirement).transpose()
    }

    async fn list_requirements(&self) -> Result<Vec<RequirementListing>, StoreError> {
        let rows = RequirementEntity::find()
            .order_by_desc(requirement::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        let agents = self.agent_refs().await?;

        rows.into_iter()
            .map(|m| {
                model_to_requirement(m).map(|r| RequirementListing {
                    assigned_agent: r.assigned_agent_id.and_then(|id| agents.get(&id).cloned()),
                    creator: r.created_by.and_then(|id| agents.get(&id).cloned()),
                    requirement: r,
                })
            })
            .collect()
    }

    async fn insert_requirement(
        &self,
        requirement: &Requirement,
    ) -> Result<Requirement, StoreError> {
        let model = requirement_to_active_model(requirement)
            .insert(&self.conn)
            .await?;
        model_to_requirement(model)
    }

    async fn update_requirement(
        &self,
        requirement: &Requirement,
    ) -> Result<Requirement, StoreError> {
        let model = requirement_to_active_model(requirement)
            .update(&self.conn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => {
                    StoreError::Missing(format!("requirement {}", requirement.id))
                }
                other => StoreError::Database(other),
            })?;
        model_to_requirement(model)
    }

    async fn delete_requirement(&self, id: Uuid) -> Result<bool, StoreError> {
        let res = RequirementEntity::delete_by_id(id).exec(&self.conn).await?;
        Ok(res.rows_affected > 0)
    }
}
