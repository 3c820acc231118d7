use std::env;

/// Environment variable holding the PostgreSQL connection URL.
pub const DATABASE_URL_ENV: &str = "SKYPLAN_DATABASE_URL";

/// Where the plan store lives.
///
/// Reads `SKYPLAN_DATABASE_URL`, falling back to
/// `postgresql://localhost:5432/skyplan` when unset.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL.
    pub database_url: String,
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/skyplan";

    /// Build a config from the environment, or the default URL.
    pub fn from_env() -> Self {
        let database_url =
            env::var(DATABASE_URL_ENV).unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self { database_url }
    }

    /// Build a config from an explicit URL (CLI flag, config file, tests).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// The database name: the last path segment, without any query string.
    pub fn database_name(&self) -> Option<&str> {
        self.database_url
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty())
    }

    /// The same server URL pointed at another database.
    pub fn for_database(&self, name: &str) -> String {
        match self.database_url.rfind('/') {
            Some(pos) => format!("{}/{name}", &self.database_url[..pos]),
            None => self.database_url.clone(),
        }
    }

    /// URL of the `postgres` maintenance database on the same server, used
    /// to issue `CREATE DATABASE` before the store exists.
    pub fn maintenance_url(&self) -> String {
        self.for_database("postgres")
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
