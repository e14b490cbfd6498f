use crate::error::AppError;
use crate::model::{Owner, Registry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "registry.json";
const STORE_ENV_VAR: &str = "PAWPAL_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredRegistry {
    schema_version: u32,
    #[serde(flatten)]
    registry: Registry,
}

#[derive(Debug, Serialize)]
struct StoredRegistryRef<'a> {
    schema_version: u32,
    owners: &'a [Owner],
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("pawpal").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("pawpal")
            .join(STORE_FILE_NAME))
    }
}

/// Loads the registry snapshot; a missing file is an empty registry.
pub fn load_registry(path: &Path) -> Result<Registry, AppError> {
    if !path.exists() {
        debug!(path = %path.display(), "no registry snapshot, starting empty");
        return Ok(Registry::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredRegistry =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let mut registry = stored.registry;
    registry.validate()?;
    debug!(
        path = %path.display(),
        owners = registry.owners().len(),
        "loaded registry snapshot"
    );

    Ok(registry)
}

pub fn save_registry(path: &Path, registry: &Registry) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredRegistryRef {
        schema_version: SCHEMA_VERSION,
        owners: registry.owners(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    debug!(path = %path.display(), "saved registry snapshot");
    Ok(())
}
