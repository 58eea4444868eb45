use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gleaner::config::load_config;
///
/// let config = load_config(Path::new("gleaner.toml")).unwrap();
/// println!("Discover depth: {}", config.crawler.discover_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    // Missing keys fall back per field, so a partial file is as valid
    // as a complete one
    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Loads a configuration file if it exists, falling back to defaults
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file, which may not exist
///
/// # Returns
///
/// * `Ok(Config)` - The loaded configuration, or the defaults if no file exists
/// * `Err(ConfigError)` - The file exists but failed to load or validate
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file found, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }
    load_config(path)
}

/// Computes a SHA-256 digest of the effective configuration
///
/// The digest is stored on the run row so a corpus records which settings
/// produced it. It is computed after CLI overrides are applied, so two runs
/// with the same file but different flags get different digests.
///
/// # Arguments
///
/// * `config` - The effective configuration
///
/// # Returns
///
/// * `String` - Hex-encoded SHA-256 hash of the serialized configuration
pub fn config_digest(config: &Config) -> String {
    let serialized = toml::to_string(config).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}
