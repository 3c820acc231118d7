//! Configuration file management for skyplan.
//!
//! Provides a TOML-based config file at `~/.config/skyplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use skyplan_core::Role;
use skyplan_core::role::parse_claim;
use skyplan_db::config::{DATABASE_URL_ENV, DbConfig};

/// Environment variable holding the caller's role claim.
pub const ROLE_ENV: &str = "SKYPLAN_ROLE";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default)]
    pub identity: IdentitySection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IdentitySection {
    /// Default role claim, e.g. `Astronomer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the skyplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/skyplan` or `~/.config/skyplan`,
/// never the platform-specific `dirs::config_dir()`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("skyplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("skyplan")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct SkyplanConfig {
    pub db_config: DbConfig,
    /// `None` when no valid role was claimed anywhere in the chain.
    pub role: Option<Role>,
}

impl SkyplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `SKYPLAN_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Role: `cli_role` > `SKYPLAN_ROLE` > `identity.role` > none
    ///
    /// The first role source that is set wins even if it does not name a
    /// role; an unrecognised claim is treated as no claim.
    pub fn resolve(cli_db_url: Option<&str>, cli_role: Option<&str>) -> Self {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let raw_role = if let Some(role) = cli_role {
            Some(role.to_string())
        } else if let Ok(role) = std::env::var(ROLE_ENV) {
            Some(role)
        } else {
            file_config.and_then(|cfg| cfg.identity.role)
        };
        let role = parse_claim(raw_role.as_deref());
        if role.is_none() {
            if let Some(raw) = raw_role.as_deref() {
                warn!(claim = raw, "ignoring unrecognised role claim");
            }
        }

        Self {
            db_config: DbConfig::new(db_url),
            role,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
