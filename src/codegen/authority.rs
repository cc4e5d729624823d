//! Authoritative property-code generators.
//!
//! An authority hands out sequential codes from a per-prefix counter. It may
//! fail or have nothing to offer, in which case [`super::CodeGenerator`]
//! synthesizes a code locally.
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum AuthorityError {
    #[error("Counter update failed: {0}")]
    Database(#[from] DbErr),

    #[error("Authority request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authority returned status {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait CodeAuthority: Send + Sync {
    /// Returns the next code for `base_type`, or `None` when the type has no counter.
    async fn generate(&self, base_type: &str, is_new: bool)
    -> Result<Option<String>, AuthorityError>;
}

/// Counter prefix for a base type. Only apartments, houses and sites are numbered.
pub fn counter_prefix(base_type: &str, is_new: bool) -> Option<&'static str> {
    match base_type.trim().to_ascii_lowercase().as_str() {
        "apartment" => Some(if is_new { "NA" } else { "OA" }),
        "house" => Some(if is_new { "NH" } else { "OH" }),
        "site" => Some("S"),
        _ => None,
    }
}

/// Counter-backed authority living in the `property_code_counters` table.
#[derive(Clone)]
pub struct SqlCodeAuthority {
    conn: DatabaseConnection,
}

impl SqlCodeAuthority {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CodeAuthority for SqlCodeAuthority {
    async fn generate(
        &self,
        base_type: &str,
        is_new: bool,
    ) -> Result<Option<String>, AuthorityError> {
        let Some(prefix) = counter_prefix(base_type, is_new) else {
            debug!(base_type, "no counter for property type");
            return Ok(None);
        };

        // Single statement so concurrent callers never observe the same value.
        let stmt = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            "INSERT INTO property_code_counters (prefix, last_value) VALUES (?, 1) \
             ON CONFLICT(prefix) DO UPDATE SET last_value = last_value + 1 \
             RETURNING last_value",
            [prefix.into()],
        );
        let row = self
            .conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("counter {prefix}")))?;
        let value: i64 = row.try_get("", "last_value")?;

        let code = format!("{prefix}{value:03}");
        info!(code = %code, "issued counter code");
        Ok(Some(code))
    }
}

#[derive(Serialize)]
struct RpcArgs<'a> {
    property_type: &'a str,
    is_new: bool,
}

/// `generate_property_code` RPC on a hosted backend.
#[derive(Debug, Clone)]
pub struct RemoteCodeAuthority {
    base_url: String,
    api_key: Option<String>,
    inner: reqwest::Client,
}

impl RemoteCodeAuthority {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, AuthorityError> {
        let inner = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            inner,
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/rest/v1/rpc/generate_property_code",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CodeAuthority for RemoteCodeAuthority {
    async fn generate(
        &self,
        base_type: &str,
        is_new: bool,
    ) -> Result<Option<String>, AuthorityError> {
        let mut req = self
            .inner
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .json(&RpcArgs {
                property_type: base_type,
                is_new,
            });
        if let Some(key) = &self.api_key {
            req = req
                .header("apikey", key)
                .header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthorityError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let code: Option<String> = resp.json().await?;
        Ok(code.filter(|c| !c.trim().is_empty()))
    }
}
