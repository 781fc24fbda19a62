// Configuration loading and parsing (dashboard.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Earliest season any stats provider publishes leaderboards for.
const FIRST_SEASON: i32 = 1871;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: i32,
    pub cache_ttl_secs: u64,
    pub sources: SourcesConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// dashboard.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire dashboard.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DashboardFile {
    dashboard: DashboardSection,
    sources: SourcesConfig,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DashboardSection {
    season: i32,
    #[serde(default = "default_cache_ttl_secs")]
    cache_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    1800
}

/// Remote endpoints the dashboard pulls from.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// Published spreadsheet holding the player identifier map.
    pub id_map_url: String,
    /// Leaderboard endpoint for full-season batting and pitching stats.
    pub stats_base_url: String,
    /// Prefix for synthesized player profile links.
    pub profile_base_url: String,
}

/// Locally maintained CSV files.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub batters: String,
    pub pitchers: String,
    pub defense: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/dashboard.toml` relative to
/// the given `base_dir`.
///
/// Does not copy defaults; `load_config()` handles that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("dashboard.toml");
    let text = read_file(&path)?;
    let file: DashboardFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        season: file.dashboard.season,
        cache_ttl_secs: file.dashboard.cache_ttl_secs,
        sources: file.sources,
        data_paths: file.data_paths,
    };

    validate(&config)?;
    Ok(config)
}

/// Seed `config/` from `defaults/`, copying only files that are not there
/// yet (`.example` files are never copied). Returns the copied paths in
/// name order.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    match (defaults_dir.is_dir(), config_dir.is_dir()) {
        (false, true) => return Ok(Vec::new()),
        (false, false) => {
            return Err(copy_error(format!(
                "no defaults/ or config/ directory under {}",
                base_dir.display()
            )))
        }
        (true, _) => {}
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::new();
    for source in seed_files(&defaults_dir)? {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if copy_if_missing(&source, &target)? {
            copied.push(target);
        }
    }
    Ok(copied)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Regular files in `dir` that are not `.example` templates, sorted.
fn seed_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let listing =
        std::fs::read_dir(dir).map_err(|e| copy_error(format!("cannot list {}: {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in listing {
        let path = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", dir.display())))?
            .path();
        let template = path.extension().is_some_and(|ext| ext == "example");
        if path.is_file() && !template {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy `source` to `target` unless `target` already exists. The target is
/// opened with `create_new`, so an existing file is never truncated.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::{ErrorKind, Write};

    let mut out = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let bytes = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    out.write_all(&bytes)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.season < FIRST_SEASON {
        return Err(ConfigError::ValidationError {
            field: "dashboard.season".into(),
            message: format!("must be {FIRST_SEASON} or later, got {}", config.season),
        });
    }

    if config.cache_ttl_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "dashboard.cache_ttl_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let urls: &[(&str, &str)] = &[
        ("sources.id_map_url", config.sources.id_map_url.as_str()),
        ("sources.stats_base_url", config.sources.stats_base_url.as_str()),
        ("sources.profile_base_url", config.sources.profile_base_url.as_str()),
    ];
    for (name, url) in urls {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be an http(s) URL, got {url:?}"),
            });
        }
    }

    let paths: &[(&str, &str)] = &[
        ("data_paths.batters", config.data_paths.batters.as_str()),
        ("data_paths.pitchers", config.data_paths.pitchers.as_str()),
        ("data_paths.defense", config.data_paths.defense.as_str()),
    ];
    for (name, path) in paths {
        if path.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
