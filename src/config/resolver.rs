//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`BAMBOO_COMPANY_DOMAIN`, `BAMBOO_API_KEY`, `BAMBOO_BASE_URL`)
//! 3. roster.kdl
//! 4. Built-in defaults
//!
//! ## Config file location
//!
//! `--config` / `ROSTER_CONFIG` if given, else `./roster.kdl` when present,
//! else `~/.config/roster/config.kdl` when present.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::schema::RosterConfig;
use crate::bamboo::{BambooClient, DEFAULT_BASE_URL};
use crate::{Error, Result};

/// Environment variable holding the BambooHR company subdomain.
pub const COMPANY_DOMAIN_ENV: &str = "BAMBOO_COMPANY_DOMAIN";

/// Environment variable holding the BambooHR API key.
pub const API_KEY_ENV: &str = "BAMBOO_API_KEY";

/// Environment variable overriding the API gateway root.
pub const BASE_URL_ENV: &str = "BAMBOO_BASE_URL";

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "roster.kdl";

/// Default output directory for written files.
pub const DEFAULT_OUTPUT_DIR: &str = "./finalData";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from a config file
    ConfigFile(PathBuf),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile(path) => write!(f, "file:{}", path.display()),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file path
    pub config_path: Option<PathBuf>,
    /// Company domain override
    pub company_domain: Option<String>,
    /// API key override
    pub api_key: Option<String>,
    /// Output directory override
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Config file that was read, if any
    pub config_file: Option<PathBuf>,
    /// BambooHR company subdomain
    pub company_domain: Option<Resolved<String>>,
    /// BambooHR API key
    pub api_key: Option<Resolved<String>>,
    /// API gateway root
    pub base_url: Resolved<String>,
    /// Output directory
    pub output_dir: Resolved<PathBuf>,
    /// Per-request timeout in seconds
    pub timeout_secs: Resolved<u64>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            company_domain: None,
            api_key: None,
            base_url: Resolved::new(DEFAULT_BASE_URL.to_string(), ValueSource::Default),
            output_dir: Resolved::new(PathBuf::from(DEFAULT_OUTPUT_DIR), ValueSource::Default),
            timeout_secs: Resolved::new(DEFAULT_TIMEOUT_SECS, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Get the company domain, if set.
    pub fn company_domain(&self) -> Option<&str> {
        self.company_domain.as_ref().map(|r| r.value.as_str())
    }

    /// Get the API key, if set.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|r| r.value.as_str())
    }

    /// Get the API key masked for display purposes.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key().map(|key| {
            if key.len() <= 12 {
                format!("{}...", &key[..4.min(key.len())])
            } else {
                format!("{}...{}", &key[..4], &key[key.len() - 4..])
            }
        })
    }

    /// Get the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir.value
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.value)
    }

    /// Names of the required settings that are missing.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.company_domain().is_none_or(str::is_empty) {
            missing.push(COMPANY_DOMAIN_ENV.to_string());
        }
        if self.api_key().is_none_or(str::is_empty) {
            missing.push(API_KEY_ENV.to_string());
        }
        missing
    }

    /// Build an API client, failing if credentials are missing.
    pub fn client(&self) -> Result<BambooClient> {
        match (self.company_domain(), self.api_key()) {
            (Some(domain), Some(key)) if self.missing().is_empty() => Ok(BambooClient::new(
                &self.base_url.value,
                domain,
                key,
                self.timeout(),
            )),
            _ => Err(Error::MissingConfig(self.missing())),
        }
    }
}

/// Locate the config file to read.
///
/// An explicit path must exist; implicit locations are optional.
pub fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("roster").join("config.kdl"))
        .filter(|path| path.exists()))
}

/// Resolve configuration from CLI overrides, the process environment and
/// the config file.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let config_file = locate_config_file(overrides.config_path.as_deref())?;
    let file_config = match config_file {
        Some(ref path) => RosterConfig::load(path)?,
        None => RosterConfig::default(),
    };

    Ok(resolve_with(
        overrides,
        config_file,
        &file_config,
        |name| std::env::var(name).ok(),
    ))
}

/// Resolve configuration from explicit inputs.
///
/// `env` looks up an environment variable; empty values count as unset.
pub fn resolve_with(
    overrides: &ConfigOverrides,
    config_file: Option<PathBuf>,
    file_config: &RosterConfig,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let lookup = |name: &str| env(name).filter(|v| !v.is_empty());
    let file_source = || {
        ValueSource::ConfigFile(
            config_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE)),
        )
    };

    let mut result = ResolvedConfig {
        config_file: config_file.clone(),
        ..Default::default()
    };

    // Resolve company_domain
    if let Some(ref domain) = overrides.company_domain {
        result.company_domain = Some(Resolved::new(domain.clone(), ValueSource::CliFlag));
    } else if let Some(domain) = lookup(COMPANY_DOMAIN_ENV) {
        result.company_domain = Some(Resolved::new(
            domain,
            ValueSource::EnvVar(COMPANY_DOMAIN_ENV.to_string()),
        ));
    } else if let Some(ref domain) = file_config.company_domain {
        result.company_domain = Some(Resolved::new(domain.clone(), file_source()));
    }

    // Resolve api_key
    if let Some(ref key) = overrides.api_key {
        result.api_key = Some(Resolved::new(key.clone(), ValueSource::CliFlag));
    } else if let Some(key) = lookup(API_KEY_ENV) {
        result.api_key = Some(Resolved::new(
            key,
            ValueSource::EnvVar(API_KEY_ENV.to_string()),
        ));
    } else if let Some(ref key) = file_config.api_key {
        result.api_key = Some(Resolved::new(key.clone(), file_source()));
    }

    // Resolve base_url (no CLI flag)
    if let Some(url) = lookup(BASE_URL_ENV) {
        result.base_url = Resolved::new(url, ValueSource::EnvVar(BASE_URL_ENV.to_string()));
    } else if let Some(ref url) = file_config.base_url {
        result.base_url = Resolved::new(url.clone(), file_source());
    }

    // Resolve output_dir (no env var)
    if let Some(ref dir) = overrides.output_dir {
        result.output_dir = Resolved::new(dir.clone(), ValueSource::CliFlag);
    } else if let Some(ref dir) = file_config.output_dir {
        result.output_dir = Resolved::new(dir.clone(), file_source());
    }

    // Resolve timeout_secs (file only)
    if let Some(timeout) = file_config.timeout_secs {
        result.timeout_secs = Resolved::new(timeout, file_source());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    fn file_config() -> RosterConfig {
        RosterConfig {
            company_domain: Some("file-co".to_string()),
            api_key: Some("file-key".to_string()),
            base_url: Some("http://file.example".to_string()),
            output_dir: Some(PathBuf::from("file-out")),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let resolved = resolve_with(
            &ConfigOverrides::default(),
            None,
            &RosterConfig::default(),
            env_of(&[]),
        );

        assert!(resolved.company_domain.is_none());
        assert!(resolved.api_key.is_none());
        assert_eq!(resolved.base_url.value, DEFAULT_BASE_URL);
        assert_eq!(resolved.base_url.source, ValueSource::Default);
        assert_eq!(resolved.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert_eq!(resolved.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(resolved.missing(), vec![COMPANY_DOMAIN_ENV, API_KEY_ENV]);
    }

    #[test]
    fn test_file_values_used_without_env_or_flags() {
        let path = PathBuf::from("/tmp/roster.kdl");
        let resolved = resolve_with(
            &ConfigOverrides::default(),
            Some(path.clone()),
            &file_config(),
            env_of(&[]),
        );

        assert_eq!(resolved.company_domain(), Some("file-co"));
        assert_eq!(
            resolved.company_domain.as_ref().unwrap().source,
            ValueSource::ConfigFile(path)
        );
        assert_eq!(resolved.timeout_secs.value, 5);
        assert_eq!(resolved.output_dir(), Path::new("file-out"));
    }

    #[test]
    fn test_env_beats_file() {
        let resolved = resolve_with(
            &ConfigOverrides::default(),
            None,
            &file_config(),
            env_of(&[
                (COMPANY_DOMAIN_ENV, "env-co"),
                (API_KEY_ENV, "env-key"),
                (BASE_URL_ENV, "http://env.example"),
            ]),
        );

        assert_eq!(resolved.company_domain(), Some("env-co"));
        assert_eq!(resolved.api_key(), Some("env-key"));
        assert_eq!(resolved.base_url.value, "http://env.example");
        assert_eq!(
            resolved.api_key.as_ref().unwrap().source,
            ValueSource::EnvVar(API_KEY_ENV.to_string())
        );
    }

    #[test]
    fn test_cli_beats_env() {
        let overrides = ConfigOverrides {
            company_domain: Some("cli-co".to_string()),
            api_key: Some("cli-key".to_string()),
            output_dir: Some(PathBuf::from("cli-out")),
            ..Default::default()
        };
        let resolved = resolve_with(
            &overrides,
            None,
            &file_config(),
            env_of(&[(COMPANY_DOMAIN_ENV, "env-co"), (API_KEY_ENV, "env-key")]),
        );

        assert_eq!(resolved.company_domain(), Some("cli-co"));
        assert_eq!(resolved.api_key(), Some("cli-key"));
        assert_eq!(resolved.output_dir(), Path::new("cli-out"));
        assert_eq!(resolved.output_dir.source, ValueSource::CliFlag);
    }

    #[test]
    fn test_empty_env_counts_as_unset() {
        let resolved = resolve_with(
            &ConfigOverrides::default(),
            None,
            &RosterConfig::default(),
            env_of(&[(API_KEY_ENV, "")]),
        );

        assert!(resolved.api_key.is_none());
    }

    #[test]
    fn test_client_requires_credentials() {
        let resolved = resolve_with(
            &ConfigOverrides {
                company_domain: Some("acme".to_string()),
                ..Default::default()
            },
            None,
            &RosterConfig::default(),
            env_of(&[]),
        );

        match resolved.client() {
            Err(Error::MissingConfig(missing)) => assert_eq!(missing, vec![API_KEY_ENV]),
            other => panic!("Expected MissingConfig, got: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_client_built_from_resolved_values() {
        let resolved = resolve_with(
            &ConfigOverrides::default(),
            None,
            &file_config(),
            env_of(&[]),
        );

        let client = resolved.client().unwrap();
        assert_eq!(client.company_url(), "http://file.example/file-co/");
    }

    #[test]
    fn test_masked_api_key() {
        let mut resolved = ResolvedConfig::default();
        resolved.api_key = Some(Resolved::new(
            "abcdefghijklmnopqrstuvwxyz".to_string(),
            ValueSource::CliFlag,
        ));
        assert_eq!(resolved.masked_api_key().as_deref(), Some("abcd...wxyz"));

        resolved.api_key = Some(Resolved::new("short".to_string(), ValueSource::CliFlag));
        assert_eq!(resolved.masked_api_key().as_deref(), Some("shor..."));
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let result = locate_config_file(Some(Path::new("/definitely/not/here.kdl")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::CliFlag.to_string(), "cli");
        assert_eq!(
            ValueSource::EnvVar(API_KEY_ENV.to_string()).to_string(),
            "env:BAMBOO_API_KEY"
        );
        assert_eq!(ValueSource::Default.to_string(), "default");
    }
}
