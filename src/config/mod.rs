//! Configuration for Roster.
//!
//! ## roster.kdl
//!
//! Located at (first match wins):
//! - `--config <path>` or `ROSTER_CONFIG`
//! - `./roster.kdl`
//! - `~/.config/roster/config.kdl`
//!
//! Contains:
//! - `company-domain` - BambooHR company subdomain
//! - `api-key` - BambooHR API key
//! - `base-url` - API gateway root (for proxies and testing)
//! - `output-dir` - Where `roster sync` writes its files
//! - `timeout-secs` - Per-request timeout
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config file > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    API_KEY_ENV, BASE_URL_ENV, COMPANY_DOMAIN_ENV, ConfigOverrides, Resolved, ResolvedConfig,
    ValueSource, resolve_config, resolve_with,
};
pub use schema::RosterConfig;
