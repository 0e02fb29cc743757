//! KDL schema definition for roster.kdl.
//!
//! This module provides:
//! - A Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation

use std::fs;
use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};

use crate::{Error, Result};

/// Settings stored in roster.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// company-domain "acme"
/// api-key "0123456789abcdef"
/// base-url "https://api.bamboohr.com/api/gateway.php"
/// output-dir "./finalData"
/// timeout-secs 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterConfig {
    /// BambooHR company subdomain
    pub company_domain: Option<String>,

    /// BambooHR API key
    pub api_key: Option<String>,

    /// API gateway root (the company domain is appended)
    pub base_url: Option<String>,

    /// Directory the sync command writes into
    pub output_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl RosterConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(timeout) = self.timeout_secs {
            if timeout == 0 {
                return Err("timeout-secs must be greater than 0".to_string());
            }
        }
        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("base-url must be an http(s) URL, got {}", url));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            company_domain: string_value(doc, "company-domain"),
            api_key: string_value(doc, "api-key"),
            base_url: string_value(doc, "base-url"),
            output_dir: string_value(doc, "output-dir").map(PathBuf::from),
            timeout_secs: first_value(doc, "timeout-secs")
                .and_then(KdlValue::as_integer)
                .and_then(|i| u64::try_from(i).ok()),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        let strings = [
            ("company-domain", self.company_domain.clone()),
            ("api-key", self.api_key.clone()),
            ("base-url", self.base_url.clone()),
            (
                "output-dir",
                self.output_dir.as_ref().map(|p| p.display().to_string()),
            ),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                let mut node = KdlNode::new(name);
                node.push(KdlEntry::new(KdlValue::String(value)));
                doc.nodes_mut().push(node);
            }
        }

        if let Some(timeout) = self.timeout_secs {
            let mut node = KdlNode::new("timeout-secs");
            node.push(KdlEntry::new(KdlValue::Integer(timeout as i128)));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Parse and validate a config from KDL text.
    pub fn parse(text: &str) -> Result<Self> {
        let doc: KdlDocument = text
            .parse()
            .map_err(|e| Error::Config(format!("invalid KDL: {}", e)))?;
        let config = Self::from_kdl(&doc);
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(KdlEntry::value)
}

fn string_value(doc: &KdlDocument, name: &str) -> Option<String> {
    first_value(doc, name)
        .and_then(KdlValue::as_string)
        .map(str::to_string)
}
