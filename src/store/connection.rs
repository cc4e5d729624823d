use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use tracing::info;

/// Connects to the database behind `url` (`sqlite://path?mode=rwc`).
pub async fn connect_database(url: &str) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database at: {}", url);

    let mut opt = ConnectOptions::new(url.to_string());
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    Database::connect(opt).await
}

/// SQLite URL for a database file, created on first use.
pub fn sqlite_url(path: &std::path::Path) -> String {
    format!("sqlite://{}?mode=rwc", path.to_string_lossy())
}

/// Creates the directory holding a file-backed SQLite database.
pub fn ensure_sqlite_dir(url: &str) -> std::io::Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    match std::path::Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Default database location inside the project directory.
pub fn get_default_db_path(project_root: &std::path::Path) -> std::path::PathBuf {
    project_root.join(".rdesk").join("realty.sqlite")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn default_url_points_into_project_dir() {
        let path = get_default_db_path(Path::new("/srv/desk"));
        assert_eq!(
            sqlite_url(&path),
            "sqlite:///srv/desk/.rdesk/realty.sqlite?mode=rwc"
        );
    }

    #[test]
    fn creates_missing_database_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("desk.sqlite");
        ensure_sqlite_dir(&sqlite_url(&path)).unwrap();
        assert!(tmp.path().join("nested").is_dir());
        ensure_sqlite_dir("sqlite::memory:").unwrap();
    }
}
