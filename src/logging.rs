use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub const LOG_ENV: &str = "RDESK_LOG";
pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub level: Option<String>,
    /// Write to this file instead of stderr.
    pub file: Option<PathBuf>,
    pub json: bool,
}

/// `--log-level`, then `RDESK_LOG`, then `info`.
pub fn resolve_level(cli: Option<&str>, env: Option<String>) -> String {
    cli.map(str::to_string)
        .or(env)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

pub fn init_logging(opts: &LogOptions) -> Result<()> {
    let level = resolve_level(opts.level.as_deref(), std::env::var(LOG_ENV).ok());
    let builder = FmtSubscriber::builder().with_env_filter(build_filter(&level));

    match &opts.file {
        Some(path) => {
            let log_file = Arc::new(
                std::fs::File::create(path)
                    .with_context(|| format!("create log file {}", path.display()))?,
            );
            let builder = builder
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_writer(log_file);
            if opts.json {
                tracing::subscriber::set_global_default(builder.json().finish())?;
            } else {
                tracing::subscriber::set_global_default(builder.finish())?;
            }
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            if opts.json {
                tracing::subscriber::set_global_default(builder.json().finish())?;
            } else {
                tracing::subscriber::set_global_default(builder.finish())?;
            }
        }
    }

    info!(level = %level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_precedence() {
        assert_eq!(resolve_level(Some("debug"), Some("warn".into())), "debug");
        assert_eq!(resolve_level(None, Some("warn".into())), "warn");
        assert_eq!(resolve_level(None, Some("  ".into())), "info");
        assert_eq!(resolve_level(None, None), "info");
    }
}
