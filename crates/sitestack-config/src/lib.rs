pub mod error;
pub mod site;

pub use error::*;
pub use site::{SiteConfig, SiteSettings};

use std::path::{Path, PathBuf};

/// Environment variable that points directly at a config file
pub const CONFIG_PATH_ENV: &str = "SITESTACK_CONFIG";

const CANDIDATES: [&str; 2] = ["sitestack.yaml", ".sitestack.yaml"];

/// Directory holding the global sitestack config (`~/.config/sitestack`)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("sitestack"))
}

/// Find the sitestack config file for the current directory
///
/// Search order:
/// 1. `SITESTACK_CONFIG` (direct path; must exist)
/// 2. current directory: `sitestack.yaml`, `.sitestack.yaml`
/// 3. `~/.config/sitestack/sitestack.yaml`
///
/// Returns `Ok(None)` when no file exists; the settings may still come
/// entirely from the environment or flags.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    let explicit = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let current_dir = std::env::current_dir()?;
    let global_dir = get_config_dir().ok();
    find_config_file_in(explicit, &current_dir, global_dir.as_deref())
}

/// [`find_config_file`] with every location passed in
pub fn find_config_file_in(
    explicit: Option<PathBuf>,
    dir: &Path,
    global_dir: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
    }

    for filename in &CANDIDATES {
        let path = dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(global_dir) = global_dir {
        let global_config = global_dir.join(CANDIDATES[0]);
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Parse one YAML settings file
pub fn load_file(path: &Path) -> Result<SiteSettings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(SiteSettings::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Resolve the site configuration: file < environment < `overrides`
pub fn load(overrides: SiteSettings) -> Result<SiteConfig> {
    load_with(None, overrides)
}

/// [`load`], reading `config_path` instead of searching when it is given
pub fn load_with(config_path: Option<&Path>, overrides: SiteSettings) -> Result<SiteConfig> {
    let found = match config_path {
        Some(path) => {
            find_config_file_in(Some(path.to_path_buf()), &std::env::current_dir()?, None)?
        }
        None => find_config_file()?,
    };

    let file = match found {
        Some(path) => {
            tracing::debug!("Loading config file: {}", path.display());
            load_file(&path)?
        }
        None => {
            tracing::debug!("No config file found, using environment and flags only");
            SiteSettings::default()
        }
    };

    file.merge(SiteSettings::from_env())
        .merge(overrides)
        .resolve()
}
