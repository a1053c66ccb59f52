//! Configuration for sift.
//!
//! Values are merged from, in increasing order of precedence:
//!
//! 1. built-in defaults,
//! 2. a configuration file (an explicit path, otherwise `config.toml` in the
//!    platform's configuration directory if it exists),
//! 3. `SIFT_*` environment variables, with `__` separating nested keys
//!    (`SIFT_ARCHIVE__API_KEY`).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use sift_extract::{DEFAULT_TIMEZONE, ReportingZone};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "SIFT_";
const ENV_SEPARATOR: &str = "__";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveConfig,
    /// Reporting timezone (IANA name) for file timestamps that don't carry
    /// their own offset, and for sessions without a timezone.
    pub timezone: String,
    pub concurrency: ConcurrencyConfig,
    /// Maximum number of "did you mean" subjects per unmatched file.
    pub suggestions: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            archive: ArchiveConfig::default(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            concurrency: ConcurrencyConfig::default(),
            suggestions: 3,
        }
    }
}

/// Where the archive is, and which project to look in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Host with an optional port, no scheme (`archive.example.org:443`).
    pub instance: Option<String>,
    pub api_key: Option<String>,
    pub group: String,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Files processed at once.
    pub files: usize,
    /// Requests to the archive in flight at once.
    pub network: usize,
}
impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self { files: 4, network: 2 }
    }
}

impl Config {
    /// Load configuration from defaults, a file and the environment.
    ///
    /// # Errors
    /// - [`NotFound`](ErrorKind::NotFound) if `path` is given but doesn't exist.
    /// - [`UnsupportedFormat`](ErrorKind::UnsupportedFormat) for an unknown
    ///   file extension.
    /// - [`Load`](ErrorKind::Load) if the merged values don't make a `Config`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path)?
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
            .extract()
            .or_raise(|| ErrorKind::Load)
    }

    /// Defaults and the configuration file, without the environment.
    fn figment(path: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let path = match path {
            Some(path) if !path.exists() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => match default_path().filter(|path| path.exists()) {
                Some(path) => path,
                None => return Ok(figment),
            },
        };
        tracing::debug!(path = %path.display(), "loading configuration file");
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file(&path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(&path)),
            Some("json") => figment.merge(Json::file(&path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path)),
        })
    }

    /// Check everything needed to talk to the archive, and
    /// [the rest](Self::validate_settings).
    pub fn validate(&self) -> Result<()> {
        self.archive.validate()?;
        self.validate_settings()
    }

    /// Check everything except the archive connection (for offline runs).
    pub fn validate_settings(&self) -> Result<()> {
        self.zone()?;
        if self.concurrency.files == 0 {
            exn::bail!(ErrorKind::InvalidValue {
                key: "concurrency.files",
                value: "0".to_string(),
            });
        }
        if self.concurrency.network == 0 {
            exn::bail!(ErrorKind::InvalidValue {
                key: "concurrency.network",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// The configured reporting timezone.
    pub fn zone(&self) -> Result<ReportingZone> {
        self.timezone.parse::<ReportingZone>().or_raise(|| ErrorKind::InvalidValue {
            key: "timezone",
            value: self.timezone.clone(),
        })
    }
}

impl ArchiveConfig {
    pub fn validate(&self) -> Result<()> {
        if self.instance.as_deref().is_none_or(str::is_empty) {
            exn::bail!(ErrorKind::MissingValue("archive.instance"));
        }
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            exn::bail!(ErrorKind::MissingValue("archive.api_key"));
        }
        Ok(())
    }
}

/// `config.toml` in the platform's configuration directory.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sift").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
