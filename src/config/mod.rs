//! Setup for talking to a Primo installation.
//!
//! A [`Setup`] names the Primo base URL, the institution, the view id and an
//! optional display map for library and status codes. It can be assembled in
//! code with [`Setup::builder`] or loaded from a file and the environment:
//!
//! ```toml
//! base_url = "http://bobcat.library.nyu.edu"
//! institution = "NYU"
//! vid = "NYU"
//!
//! [config.libraries]
//! BOBST = "NYU Bobst"
//!
//! [config.statuses]
//! check_holdings = "Check Availability"
//! ```
//!
//! Environment variables prefixed with `PRIMO_` (`PRIMO_BASE_URL`,
//! `PRIMO_INSTITUTION`, `PRIMO_VID`) override file values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// View id used when none is given
pub const DEFAULT_VID: &str = "DEFAULT";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PRIMO";

/// Display names for codes found in PNX records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimoConfig {
    /// Library code → display name
    #[serde(default)]
    pub libraries: HashMap<String, String>,

    /// Status code → display name
    #[serde(default)]
    pub statuses: HashMap<String, String>,
}

impl PrimoConfig {
    /// Display name for a library code
    pub fn library_display(&self, code: &str) -> Option<&str> {
        lookup(&self.libraries, code)
    }

    /// Display name for a status code
    pub fn status_display(&self, code: &str) -> Option<&str> {
        lookup(&self.statuses, code)
    }
}

// Config sources may lowercase keys, so fall back to a case-insensitive match.
fn lookup<'a>(map: &'a HashMap<String, String>, code: &str) -> Option<&'a str> {
    map.get(code)
        .or_else(|| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(code))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

/// Validated connection setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setup {
    pub base_url: String,
    pub institution: String,
    pub vid: String,
    pub config: PrimoConfig,
}

impl Setup {
    /// Start building a setup
    pub fn builder() -> SetupBuilder {
        SetupBuilder::default()
    }
}

/// Builder for [`Setup`]; `build` enforces the required parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupBuilder {
    #[serde(default)]
    base_url: Option<String>,

    #[serde(default)]
    institution: Option<String>,

    #[serde(default)]
    vid: Option<String>,

    #[serde(default)]
    config: Option<PrimoConfig>,
}

impl SetupBuilder {
    /// Set the Primo base URL (required)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the institution code (required)
    pub fn institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    /// Set the view id (defaults to `DEFAULT`)
    pub fn vid(mut self, vid: impl Into<String>) -> Self {
        self.vid = Some(vid.into());
        self
    }

    /// Set the code display map (defaults to empty)
    pub fn config(mut self, config: PrimoConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<Setup, SetupError> {
        let base_url = required(self.base_url, "base_url")?;
        url::Url::parse(&base_url).map_err(|e| SetupError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let institution = required(self.institution, "institution")?;
        let vid = match self.vid {
            Some(vid) => required(Some(vid), "vid")?,
            None => DEFAULT_VID.to_string(),
        };

        Ok(Setup {
            base_url,
            institution,
            vid,
            config: self.config.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, SetupError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(SetupError::MissingParameter(name)),
    }
}

/// Load a setup from a file (TOML, YAML or JSON), with `PRIMO_*`
/// environment variables layered on top
pub fn load_setup(path: &Path) -> Result<Setup, SetupError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    let builder: SetupBuilder = settings.try_deserialize()?;
    builder.build()
}

/// Load a setup from `PRIMO_*` environment variables only
pub fn setup_from_env() -> Result<Setup, SetupError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    let builder: SetupBuilder = settings.try_deserialize()?;
    builder.build()
}

/// Configuration errors, raised before any request is made
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Missing required setup parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to load setup: {0}")]
    Load(#[from] config::ConfigError),
}
