use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::store::connection::{get_default_db_path, sqlite_url};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24;
pub const DEFAULT_BRAND: &str = "Realty Desk";
pub const DEFAULT_PROPERTY_HASHTAGS: &str = "#PropertyForSale #RealEstate";
pub const DEFAULT_REQUIREMENT_HASHTAGS: &str = "#PropertyRequirement #RealEstate";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub project_root: PathBuf,
    pub database_url: String,
    pub listen: String,
    /// Shared key accepted by the webhook in place of a session token.
    pub api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub session_ttl_secs: u64,
    pub blob_root: PathBuf,
    pub blob_public_url: String,
    pub codegen: CodegenConfig,
    pub suggest: SuggestConfig,
    pub share: ShareConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            database_url: sqlite_url(&get_default_db_path(&project_root)),
            listen: DEFAULT_LISTEN.to_string(),
            api_key: None,
            jwt_secret: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            blob_root: default_blob_root(&project_root),
            blob_public_url: default_blob_public_url(DEFAULT_LISTEN),
            codegen: CodegenConfig::default(),
            suggest: SuggestConfig::default(),
            share: ShareConfig::default(),
            project_root,
        }
    }
}

fn default_blob_root(project_root: &Path) -> PathBuf {
    project_root.join(".rdesk").join("blobs")
}

fn default_blob_public_url(listen: &str) -> String {
    format!("http://{listen}/storage/v1/object/public")
}

/// Which collaborator hands out authoritative property codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityKind {
    /// Counters in the local database.
    #[default]
    Local,
    /// `generate_property_code` RPC on a hosted backend.
    Remote,
    /// Always synthesize codes locally.
    None,
}

impl std::str::FromStr for AuthorityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "none" => Ok(Self::None),
            other => Err(format!("unknown code authority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodegenConfig {
    pub authority: AuthorityKind,
    pub authority_url: Option<String>,
    pub authority_key: Option<String>,
    /// Attempts at an existence check before giving up.
    pub check_retries: usize,
    pub retry_base_ms: u64,
    pub retry_jitter_ms: u64,
    /// Candidates drawn before the generator reports exhaustion.
    pub max_candidates: usize,
    /// Inserts retried after a unique-code conflict.
    pub insert_retries: usize,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            authority: AuthorityKind::Local,
            authority_url: None,
            authority_key: None,
            check_retries: 3,
            retry_base_ms: 100,
            retry_jitter_ms: 50,
            max_candidates: 50,
            insert_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestConfig {
    pub max_results: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self { max_results: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    pub brand: String,
    pub property_hashtags: String,
    pub requirement_hashtags: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.to_string(),
            property_hashtags: DEFAULT_PROPERTY_HASHTAGS.to_string(),
            requirement_hashtags: DEFAULT_REQUIREMENT_HASHTAGS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub listen: Option<String>,
    pub api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub session_ttl_secs: Option<u64>,
    pub blob_root: Option<PathBuf>,
    pub blob_public_url: Option<String>,
    pub codegen: Option<PartialCodegenConfig>,
    pub suggest: Option<PartialSuggestConfig>,
    pub share: Option<PartialShareConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialCodegenConfig {
    pub authority: Option<AuthorityKind>,
    pub authority_url: Option<String>,
    pub authority_key: Option<String>,
    pub check_retries: Option<usize>,
    pub retry_base_ms: Option<u64>,
    pub retry_jitter_ms: Option<u64>,
    pub max_candidates: Option<usize>,
    pub insert_retries: Option<usize>,
}

impl PartialCodegenConfig {
    /// Fields set in `self` win over `other`.
    fn or(self, other: Self) -> Self {
        Self {
            authority: self.authority.or(other.authority),
            authority_url: self.authority_url.or(other.authority_url),
            authority_key: self.authority_key.or(other.authority_key),
            check_retries: self.check_retries.or(other.check_retries),
            retry_base_ms: self.retry_base_ms.or(other.retry_base_ms),
            retry_jitter_ms: self.retry_jitter_ms.or(other.retry_jitter_ms),
            max_candidates: self.max_candidates.or(other.max_candidates),
            insert_retries: self.insert_retries.or(other.insert_retries),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialSuggestConfig {
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialShareConfig {
    pub brand: Option<String>,
    pub property_hashtags: Option<String>,
    pub requirement_hashtags: Option<String>,
}

/// Values taken from command-line flags; they override every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_root: Option<PathBuf>,
    pub database_url: Option<String>,
    pub listen: Option<String>,
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let project_root = match overrides.project_root {
            Some(root) => root,
            None => std::env::current_dir().context("resolve current dir")?,
        };

        let project_cfg = load_project_config(&project_root).unwrap_or_default();
        let file_cfg = load_file_config().unwrap_or_default();

        Ok(Self::merge(
            project_root,
            overrides.database_url,
            overrides.listen,
            project_cfg,
            file_cfg,
        ))
    }

    /// Merges CLI values, environment, project file and global file, in that order.
    pub fn merge(
        project_root: PathBuf,
        cli_database_url: Option<String>,
        cli_listen: Option<String>,
        project_cfg: FileConfig,
        file_cfg: FileConfig,
    ) -> Self {
        let database_url = cli_database_url
            .or_else(|| env_var("RDESK_DATABASE_URL"))
            .or(project_cfg.database_url)
            .or(file_cfg.database_url)
            .unwrap_or_else(|| sqlite_url(&get_default_db_path(&project_root)));

        let listen = cli_listen
            .or_else(|| env_var("RDESK_LISTEN"))
            .or(project_cfg.listen)
            .or(file_cfg.listen)
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

        let api_key = env_var("RDESK_API_KEY")
            .or(project_cfg.api_key)
            .or(file_cfg.api_key);
        let jwt_secret = env_var("RDESK_JWT_SECRET")
            .or(project_cfg.jwt_secret)
            .or(file_cfg.jwt_secret);

        let blob_root = project_cfg
            .blob_root
            .or(file_cfg.blob_root)
            .map(|p| {
                if p.is_absolute() {
                    p
                } else {
                    project_root.join(p)
                }
            })
            .unwrap_or_else(|| default_blob_root(&project_root));
        let blob_public_url = project_cfg
            .blob_public_url
            .or(file_cfg.blob_public_url)
            .unwrap_or_else(|| default_blob_public_url(&listen));

        let codegen = {
            let defaults = CodegenConfig::default();
            let env = PartialCodegenConfig {
                authority_url: env_var("RDESK_CODE_AUTHORITY_URL"),
                authority_key: env_var("RDESK_CODE_AUTHORITY_KEY"),
                ..Default::default()
            };
            let p = env
                .or(project_cfg.codegen.unwrap_or_default())
                .or(file_cfg.codegen.unwrap_or_default());
            // A configured URL implies the remote authority unless stated otherwise.
            let authority = p.authority.unwrap_or(if p.authority_url.is_some() {
                AuthorityKind::Remote
            } else {
                defaults.authority
            });
            CodegenConfig {
                authority,
                authority_url: p.authority_url,
                authority_key: p.authority_key,
                check_retries: p.check_retries.unwrap_or(defaults.check_retries).max(1),
                retry_base_ms: p.retry_base_ms.unwrap_or(defaults.retry_base_ms),
                retry_jitter_ms: p.retry_jitter_ms.unwrap_or(defaults.retry_jitter_ms),
                max_candidates: p.max_candidates.unwrap_or(defaults.max_candidates).max(1),
                insert_retries: p.insert_retries.unwrap_or(defaults.insert_retries),
            }
        };

        let suggest = SuggestConfig {
            max_results: project_cfg
                .suggest
                .and_then(|s| s.max_results)
                .or(file_cfg.suggest.and_then(|s| s.max_results))
                .unwrap_or(SuggestConfig::default().max_results),
        };

        let share = {
            let project = project_cfg.share.unwrap_or_default();
            let file = file_cfg.share.unwrap_or_default();
            let defaults = ShareConfig::default();
            ShareConfig {
                brand: project.brand.or(file.brand).unwrap_or(defaults.brand),
                property_hashtags: project
                    .property_hashtags
                    .or(file.property_hashtags)
                    .unwrap_or(defaults.property_hashtags),
                requirement_hashtags: project
                    .requirement_hashtags
                    .or(file.requirement_hashtags)
                    .unwrap_or(defaults.requirement_hashtags),
            }
        };

        Self {
            database_url,
            listen,
            api_key,
            jwt_secret,
            session_ttl_secs: project_cfg
                .session_ttl_secs
                .or(file_cfg.session_ttl_secs)
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            blob_root,
            blob_public_url,
            codegen,
            suggest,
            share,
            project_root,
        }
    }
}

fn parse_config_file(path: &Path) -> Result<Option<FileConfig>> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("read config file: {}", path.display()))?;
    match toml::from_str::<FileConfig>(&s) {
        Ok(cfg) => {
            info!(path=%path.display(), "loaded config file");
            Ok(Some(cfg))
        }
        Err(e) => {
            warn!(path=%path.display(), error=%e.to_string(), "parse config failed");
            Ok(None)
        }
    }
}

pub fn load_file_config() -> Result<FileConfig> {
    fn candidate_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Some(p) = env_var("RDESK_CONFIG") {
            v.push(PathBuf::from(p));
        }
        if let Some(xdg_home) = env_var("XDG_CONFIG_HOME") {
            v.push(Path::new(&xdg_home).join("realty-desk/config.toml"));
        } else if let Some(config_dir) = dirs::config_dir() {
            v.push(config_dir.join("realty-desk/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            v.push(home.join(".config/realty-desk/config.toml"));
        }
        v
    }

    for p in candidate_paths() {
        if p.exists()
            && let Some(cfg) = parse_config_file(&p)?
        {
            return Ok(cfg);
        }
    }
    Ok(FileConfig::default())
}

/// Load project-specific configuration from .rdesk/config.toml
pub fn load_project_config(project_root: &Path) -> Result<FileConfig> {
    let project_config_path = project_root.join(".rdesk").join("config.toml");

    if project_config_path.exists() {
        Ok(parse_config_file(&project_config_path)?.unwrap_or_default())
    } else {
        Ok(FileConfig::default())
    }
}
