use crate::config::types::{Config, CONFIG_ENV_VAR};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

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
/// use sitemap_checker::config::load_config;
///
/// let config = load_config(Path::new("checker.toml")).unwrap();
/// println!("Concurrent fetches: {}", config.crawl.max_concurrent_fetches);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration named by `SITEMAP_CHECKER_CONFIG`
///
/// The command line takes only the website URL, so the configuration file is
/// located through the environment. When the variable is unset or empty the
/// built-in defaults are used.
///
/// # Returns
///
/// * `Ok((Config, Option<PathBuf>))` - The configuration and the file it came from
/// * `Err(ConfigError)` - The named file could not be loaded
pub fn load_config_from_env() -> Result<(Config, Option<PathBuf>), ConfigError> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(value) if !value.is_empty() => {
            let path = PathBuf::from(value);
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        _ => {
            let config = Config::default();
            validate(&config)?;
            Ok((config, None))
        }
    }
}
