//! Configuration for Archive services.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`ARCHIVE__` prefix, `__` separator)
//! 2. Config file (`archive.toml`)
//! 3. Defaults

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub databases: DatabaseSettings,
}

impl ArchiveConfig {
    /// Load from `<file_prefix>.toml` (optional) overlaid with `ARCHIVE__*`
    /// environment variables.
    pub fn load(file_prefix: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("ARCHIVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Bolt transport settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Rows fetched per round trip.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            fetch_size: default_fetch_size(),
        }
    }
}

/// Logical database partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Accounts and credentials.
    Users,
    /// Archive resources: persons, locations, and their relationships.
    Archive,
}

/// Physical database names for each partition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_users_db")]
    pub users: String,

    #[serde(default = "default_archive_db")]
    pub archive: String,

    /// Deployment environment appended to every database name
    /// (e.g. `archive` + `test` = `archivetest`).
    #[serde(default)]
    pub environment: Option<String>,
}

impl DatabaseSettings {
    /// Resolve a partition to the database name sessions are bound to.
    pub fn name(&self, partition: Partition) -> String {
        let base = match partition {
            Partition::Users => &self.users,
            Partition::Archive => &self.archive,
        };
        match self.environment.as_deref() {
            Some(env) if !env.is_empty() => format!("{base}{env}"),
            _ => base.clone(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            users: default_users_db(),
            archive: default_archive_db(),
            environment: None,
        }
    }
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "archive-dev".to_string()
}

fn default_fetch_size() -> usize {
    256
}

fn default_users_db() -> String {
    "users".to_string()
}

fn default_archive_db() -> String {
    "archive".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArchiveConfig::default();
        assert_eq!(config.neo4j.uri, "bolt://localhost:7687");
        assert_eq!(config.neo4j.fetch_size, 256);
        assert_eq!(config.databases.name(Partition::Users), "users");
        assert_eq!(config.databases.name(Partition::Archive), "archive");
    }

    #[test]
    fn test_environment_suffix() {
        let databases = DatabaseSettings {
            environment: Some("test".to_string()),
            ..Default::default()
        };
        assert_eq!(databases.name(Partition::Archive), "archivetest");
        assert_eq!(databases.name(Partition::Users), "userstest");

        let empty = DatabaseSettings {
            environment: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.name(Partition::Archive), "archive");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("archive.toml"),
            r#"
[neo4j]
uri = "bolt://graph.internal:7687"
password = "s3cret"

[databases]
archive = "pelago"
environment = "staging"
"#,
        )
        .unwrap();

        let prefix = dir.path().join("archive");
        let config = ArchiveConfig::load(prefix.to_str().unwrap()).unwrap();

        assert_eq!(config.neo4j.uri, "bolt://graph.internal:7687");
        assert_eq!(config.neo4j.user, "neo4j");
        assert_eq!(config.neo4j.password, "s3cret");
        assert_eq!(config.databases.name(Partition::Archive), "pelagostaging");
        assert_eq!(config.databases.name(Partition::Users), "usersstaging");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let config = ArchiveConfig::load(prefix.to_str().unwrap()).unwrap();
        assert_eq!(config.databases.archive, "archive");
    }
}
