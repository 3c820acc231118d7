//! Reading plan and program payloads from TOML files.
//!
//! A payload file is a flat table of field names to string or number
//! values:
//!
//! ```toml
//! creator = "V. Rubin"
//! star_system = "Andromeda"
//! schedule_start = "2026-11-02T20:00"
//! exposure = 30
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

pub fn load_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse payload file: {}", path.display()))
}
