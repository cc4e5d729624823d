//! Property code generation.
//!
//! A code is asked from the configured [`CodeAuthority`] first. When that
//! fails, returns nothing, or hands out a code already in use, candidates
//! are synthesized locally as `prefix + last 4 digits of the millisecond
//! clock + 2 random digits` until one is confirmed absent from the store.
//!
//! A failed existence check is retried with backoff and then reported as
//! [`CodeGenError::RegistryUnavailable`]; it is never read as "free".
pub mod authority;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use authority::{AuthorityError, CodeAuthority, RemoteCodeAuthority, SqlCodeAuthority};

use crate::config::CodegenConfig;
use crate::store::{RecordStore, StoreError};

#[derive(Error, Debug)]
pub enum CodeGenError {
    #[error("Property code type is empty")]
    EmptyType,

    #[error("Code registry unavailable after {attempts} attempts: {source}")]
    RegistryUnavailable {
        attempts: usize,
        #[source]
        source: StoreError,
    },

    #[error("No free property code after {0} candidates")]
    Exhausted(usize),
}

/// Splits `"New Apartment"` into `("Apartment", true)`.
pub fn split_code_type(code_type: &str) -> (&str, bool) {
    let code_type = code_type.trim();
    let is_new = code_type.starts_with("New");
    let base = code_type
        .strip_prefix("New ")
        .or_else(|| code_type.strip_prefix("Old "))
        .unwrap_or(code_type)
        .trim_start();
    (base, is_new)
}

/// Prefix for locally synthesized codes. Unknown types fall through to `PR`.
pub fn fallback_prefix(code_type: &str) -> &'static str {
    if code_type.contains("New Apartment") {
        "NA"
    } else if code_type.contains("Old Apartment") {
        "OA"
    } else if code_type.contains("New House") {
        "NH"
    } else if code_type.contains("Old House") {
        "OH"
    } else if code_type.contains("Site") {
        "S"
    } else {
        "PR"
    }
}

pub fn fallback_candidate(prefix: &str, millis: i64, random: u8) -> String {
    format!(
        "{prefix}{:04}{:02}",
        millis.rem_euclid(10_000),
        random % 100
    )
}

/// Source of `(millisecond clock, random 0..100)` pairs for candidates.
pub type Entropy = Arc<dyn Fn() -> (i64, u8) + Send + Sync>;

fn system_entropy() -> Entropy {
    Arc::new(|| {
        (
            chrono::Utc::now().timestamp_millis(),
            rand::random::<u8>() % 100,
        )
    })
}

pub(crate) fn backoff_delay(cfg: &CodegenConfig, attempt: usize) -> Duration {
    let base = cfg.retry_base_ms;
    let exp = base.saturating_mul(1u64 << (attempt.saturating_sub(1).min(16) as u32));
    let jitter = cfg.retry_jitter_ms as i64;
    let half = jitter / 2;
    let rnd = fastrand::i64(-half..=half).max(0) as u64;
    Duration::from_millis(exp.saturating_add(rnd))
}

#[derive(Clone)]
pub struct CodeGenerator {
    store: Arc<dyn RecordStore>,
    authority: Option<Arc<dyn CodeAuthority>>,
    cfg: CodegenConfig,
    entropy: Entropy,
}

impl CodeGenerator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        authority: Option<Arc<dyn CodeAuthority>>,
        mut cfg: CodegenConfig,
    ) -> Self {
        cfg.check_retries = cfg.check_retries.max(1);
        cfg.max_candidates = cfg.max_candidates.max(1);
        Self {
            store,
            authority,
            cfg,
            entropy: system_entropy(),
        }
    }

    pub fn with_entropy(mut self, entropy: Entropy) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn config(&self) -> &CodegenConfig {
        &self.cfg
    }

    /// Proposes a code for `code_type` (e.g. `"Old House"`) that no stored property uses.
    pub async fn generate(&self, code_type: &str) -> Result<String, CodeGenError> {
        let code_type = code_type.trim();
        if code_type.is_empty() {
            return Err(CodeGenError::EmptyType);
        }
        let (base_type, is_new) = split_code_type(code_type);

        if let Some(authority) = &self.authority {
            match authority.generate(base_type, is_new).await {
                Ok(Some(code)) if !code.trim().is_empty() => {
                    let code = code.trim().to_string();
                    if !self.exists(&code).await? {
                        info!(code = %code, "using authoritative property code");
                        return Ok(code);
                    }
                    warn!(code = %code, "authoritative code already in use, synthesizing");
                }
                Ok(_) => debug!(base_type, is_new, "authority returned no code"),
                Err(e) => warn!(error = %e, "code authority failed, synthesizing"),
            }
        }

        let prefix = fallback_prefix(code_type);
        for attempt in 1..=self.cfg.max_candidates {
            let (millis, random) = (self.entropy)();
            let candidate = fallback_candidate(prefix, millis, random);
            if !self.exists(&candidate).await? {
                info!(code = %candidate, attempt, "generated fallback property code");
                return Ok(candidate);
            }
            debug!(code = %candidate, attempt, "fallback code collision");
        }
        Err(CodeGenError::Exhausted(self.cfg.max_candidates))
    }

    async fn exists(&self, code: &str) -> Result<bool, CodeGenError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.find_property_by_code(code).await {
                Ok(found) => return Ok(found.is_some()),
                Err(e) if attempt < self.cfg.check_retries => {
                    let wait = backoff_delay(&self.cfg, attempt);
                    warn!(code, attempt, error = %e, "code lookup failed; retrying in {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    return Err(CodeGenError::RegistryUnavailable {
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}
