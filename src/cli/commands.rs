use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::print;
use super::{
    Cli, Command, ProfileCommand, ProjectCommand, PropertyFilterArgs, RequirementFilterArgs,
};
use crate::api::{self, ApiContext};
use crate::auth::{Actor, JwtAuthority};
use crate::blob::{BlobStore, FsBlobStore};
use crate::config::{AppConfig, ConfigOverrides};
use crate::filter::{PropertyCriteria, RequirementCriteria};
use crate::model::NewProject;
use crate::service::Services;
use crate::share::{self, ShareFormat};
use crate::store::SqlStore;

struct App {
    config: AppConfig,
    services: Services,
    blobs: Arc<dyn BlobStore>,
}

impl App {
    async fn open(config: AppConfig) -> Result<Self> {
        let store = SqlStore::open(&config.database_url)
            .await
            .with_context(|| format!("Failed to open database {}", config.database_url))?;
        let blobs: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(
            config.blob_root.clone(),
            config.blob_public_url.clone(),
        ));
        let services = Services::from_config(&config, store, Some(blobs.clone()))?;
        Ok(Self {
            config,
            services,
            blobs,
        })
    }

    async fn actor(&self, profile_id: Uuid) -> Result<Actor> {
        let profile = self
            .services
            .store
            .get_profile(profile_id)
            .await?
            .ok_or_else(|| anyhow!("No profile with id {profile_id}"))?;
        Ok(Actor::from_profile(&profile))
    }

    fn jwt(&self) -> Result<Option<JwtAuthority>> {
        self.config
            .jwt_secret
            .as_deref()
            .map(|secret| JwtAuthority::new(secret, self.config.session_ttl_secs))
            .transpose()
            .context("Invalid jwt_secret")
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let listen = match &cli.command {
        Command::Serve { listen } => listen.clone(),
        _ => None,
    };
    let config = AppConfig::load(ConfigOverrides {
        project_root: cli.project_root.clone(),
        database_url: cli.database_url.clone(),
        listen,
    })?;
    info!(database = %config.database_url, "configuration loaded");

    let app = App::open(config).await?;
    match cli.command {
        Command::Migrate => {
            println!("Database is up to date: {}", app.config.database_url);
            Ok(())
        }
        Command::Serve { .. } => serve(app).await,
        Command::Properties(args) => list_properties(&app, args).await,
        Command::Suggest { query, max, json } => {
            let max = max.unwrap_or(app.config.suggest.max_results);
            let hints = app.services.properties.suggest(&query, max).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&hints)?);
            } else {
                print::suggestions(&hints);
            }
            Ok(())
        }
        Command::Share {
            id,
            whatsapp,
            url,
            requirement,
        } => {
            let text = share_text(&app, id, whatsapp || url, requirement).await?;
            if url {
                println!("{}", share::whatsapp_url(&text));
            } else {
                println!("{text}");
            }
            Ok(())
        }
        Command::Code { code_type } => {
            let code = app.services.properties.codes().generate(&code_type).await?;
            println!("{code}");
            Ok(())
        }
        Command::Requirements(args) => list_requirements(&app, args).await,
        Command::Stats { json } => {
            let stats = app.services.stats().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print::stats(&stats);
            }
            Ok(())
        }
        Command::Token { profile_id } => {
            let jwt = app
                .jwt()?
                .ok_or_else(|| anyhow!("jwt_secret is not configured (set RDESK_JWT_SECRET)"))?;
            let profile = app
                .services
                .store
                .get_profile(profile_id)
                .await?
                .ok_or_else(|| anyhow!("No profile with id {profile_id}"))?;
            println!("{}", jwt.issue_session(&profile)?);
            Ok(())
        }
        Command::Upload {
            property_id,
            file,
            actor,
        } => {
            let actor = app.actor(actor).await?;
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("Invalid file name: {}", file.display()))?;
            let property = app
                .services
                .properties
                .attach_image(&actor, property_id, file_name, &bytes)
                .await?;
            if let Some(url) = property.images.last() {
                println!("{url}");
            }
            Ok(())
        }
        Command::Profiles { command } => profiles(&app, command).await,
        Command::Projects { command } => projects(&app, command).await,
    }
}

async fn serve(app: App) -> Result<()> {
    let jwt = app.jwt()?;
    if jwt.is_none() && app.config.api_key.is_none() {
        warn!("neither api_key nor jwt_secret is configured; every webhook call will be rejected");
    }

    let listener = TcpListener::bind(&app.config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", app.config.listen))?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                trigger.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    let ctx = ApiContext {
        api_key: app.config.api_key.clone(),
        jwt,
        blobs: Some(app.blobs.clone()),
        services: Arc::new(app.services),
    };
    api::serve(listener, ctx, shutdown).await
}

async fn share_text(app: &App, id: Uuid, decorate: bool, requirement: bool) -> Result<String> {
    let cfg = &app.config.share;
    if requirement {
        let listing = app.services.requirements.get(id).await?;
        let format = if decorate {
            ShareFormat::WhatsApp
        } else {
            ShareFormat::Clipboard
        };
        return Ok(share::requirement_text(&listing, format, cfg));
    }
    let listing = app.services.properties.get(id).await?;
    Ok(if decorate {
        share::format_whatsapp(&listing, cfg)
    } else {
        share::format_clipboard(&listing, cfg)
    })
}

impl From<PropertyFilterArgs> for PropertyCriteria {
    fn from(a: PropertyFilterArgs) -> Self {
        Self {
            status: a.status,
            code_type: a.code_type,
            source_type: a.source,
            project_id: a.project,
            bedrooms: a.bedrooms,
            bathrooms: a.bathrooms,
            min_price: a.min_price,
            max_price: a.max_price,
            min_area: a.min_area,
            max_area: a.max_area,
            min_price_per_sqft: a.min_price_per_sqft,
            max_price_per_sqft: a.max_price_per_sqft,
            search: a.search,
        }
    }
}

impl From<RequirementFilterArgs> for RequirementCriteria {
    fn from(a: RequirementFilterArgs) -> Self {
        Self {
            status: a.status,
            priority: a.priority,
            property_type: a.property_type,
            assigned_agent_id: a.agent,
            unassigned_only: a.unassigned,
            search: a.search,
        }
    }
}

async fn list_properties(app: &App, args: PropertyFilterArgs) -> Result<()> {
    let json = args.json;
    let listings = app.services.properties.list(&args.into()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        print::properties(&listings);
    }
    Ok(())
}

async fn list_requirements(app: &App, args: RequirementFilterArgs) -> Result<()> {
    let json = args.json;
    let listings = app.services.requirements.list(&args.into()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else {
        print::requirements(&listings);
    }
    Ok(())
}

async fn profiles(app: &App, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::List { role } => {
            let profiles = app.services.store.list_profiles(role).await?;
            print::profiles(&profiles);
        }
        ProfileCommand::Add {
            name,
            email,
            role,
            actor,
        } => {
            let actor = match actor {
                Some(id) => Some(app.actor(id).await?),
                None => None,
            };
            let profile = app
                .services
                .profiles
                .create(actor.as_ref(), &name, &email, role)
                .await?;
            println!("{}", profile.id);
        }
    }
    Ok(())
}

async fn projects(app: &App, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::List => {
            print::projects(&app.services.projects.list().await?);
        }
        ProjectCommand::Add {
            name,
            location,
            description,
            actor,
        } => {
            let actor = app.actor(actor).await?;
            let project = app
                .services
                .projects
                .create(&actor, NewProject {
                    name: Some(name),
                    location,
                    description,
                })
                .await?;
            println!("{}", project.id);
        }
        ProjectCommand::Delete { id, actor } => {
            let actor = app.actor(actor).await?;
            app.services.projects.delete(&actor, id).await?;
            println!("Deleted project {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CountFilter;
    use crate::model::{NewProperty, Role};

    #[test]
    fn filter_args_map_onto_criteria() {
        let criteria: PropertyCriteria = PropertyFilterArgs {
            bedrooms: Some(CountFilter::AtLeast(4)),
            max_price: Some(450_000.0),
            search: Some("lake".into()),
            ..Default::default()
        }
        .into();
        assert_eq!(criteria.bedrooms, Some(CountFilter::AtLeast(4)));
        assert_eq!(criteria.max_price, Some(450_000.0));
        assert_eq!(criteria.search.as_deref(), Some("lake"));
        assert_eq!(criteria.status, None);

        let criteria: RequirementCriteria = RequirementFilterArgs {
            unassigned: true,
            ..Default::default()
        }
        .into();
        assert!(criteria.unassigned_only);
    }

    #[tokio::test]
    async fn app_opens_a_fresh_database() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            database_url: crate::store::connection::sqlite_url(&tmp.path().join("desk.db")),
            blob_root: tmp.path().join("blobs"),
            ..AppConfig::default()
        };
        let app = App::open(config).await.unwrap();
        assert!(app.jwt().unwrap().is_none());
        let stats = app.services.stats().await.unwrap();
        assert_eq!(stats.total_properties, 0);
    }

    #[tokio::test]
    async fn share_text_picks_the_template() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            database_url: crate::store::connection::sqlite_url(&tmp.path().join("desk.db")),
            blob_root: tmp.path().join("blobs"),
            ..AppConfig::default()
        };
        let app = App::open(config).await.unwrap();
        let admin = app
            .services
            .profiles
            .create(None, "Root", "root@example.com", Role::Admin)
            .await
            .unwrap();
        let property = app
            .services
            .properties
            .create(&Actor::from_profile(&admin), NewProperty {
                title: Some("Lake House".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let decorated = share_text(&app, property.id, true, false).await.unwrap();
        assert!(decorated.contains("*Property Code:* N/A"));
        let plain = share_text(&app, property.id, false, false).await.unwrap();
        assert!(plain.contains("Property Code: N/A"));
        assert!(!plain.contains('*'));

        assert!(share_text(&app, property.id, false, true).await.is_err());
    }
}
