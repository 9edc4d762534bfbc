//! Run configuration.
//!
//! Values are layered with the `config` crate, lowest priority first:
//!
//! 1. an optional config file (TOML, YAML or JSON, picked by extension)
//! 2. `MONITOR_TRANSFER_*` environment variables
//! 3. command-line overrides
//!
//! The result is an immutable [`RunConfig`] handed to the
//! [`Orchestrator`](crate::Orchestrator).
//!
//! ```toml
//! tenant = "onboarding"
//! origin_datasource = "5d862786-4998-4091-baf9-c44a4383e48d"
//! destination_datasource = "79a5e543-40b3-4651-b4e3-6eff5c38a447"
//! origin_dir = "yaml_origin"
//! destination_dir = "yaml_destination"
//! prefix = "Source XYZ"
//! filter_tag = "07247885-7728-4bbd-976d-c6510f95369c"
//! transferred_tag = "4badc485-4436-48c2-88d5-5ac869af8611"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Prefix of the environment variables read into the configuration.
pub const ENV_PREFIX: &str = "MONITOR_TRANSFER";

const DEFAULT_INVENTORY_NAME: &str = "origin_monitors";
const DEFAULT_PAGE_SIZE: u32 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    #[error("either `tenant` or `base_url` must be set")]
    NoEndpoint,

    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
}

/// When an origin monitor is tagged as transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagAfter {
    /// Once its retargeted document has been written to the destination.
    #[default]
    Copy,
    /// Right after its converted document is saved on the origin side.
    Convert,
}

/// Immutable settings for one transfer run.
#[derive(Clone, Deserialize)]
pub struct RunConfig {
    /// API bearer token.
    pub token: String,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub platform_domain: Option<String>,
    /// Overrides the URL derived from `tenant`.
    #[serde(default)]
    pub base_url: Option<String>,
    pub origin_datasource: String,
    pub destination_datasource: String,
    pub origin_dir: PathBuf,
    pub destination_dir: PathBuf,
    /// Prepended to the name of every transferred monitor.
    pub prefix: String,
    #[serde(default = "default_inventory_name")]
    pub inventory_name: String,
    /// Only transfer monitors carrying this tag.
    #[serde(default)]
    pub filter_tag: Option<String>,
    /// Tag put on origin monitors once transferred.
    #[serde(default)]
    pub transferred_tag: Option<String>,
    #[serde(default)]
    pub tag_after: TagAfter,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_inventory_name() -> String {
    DEFAULT_INVENTORY_NAME.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl RunConfig {
    /// Load from an optional file, the process environment and `overrides`.
    ///
    /// `None` overrides are ignored, so unset CLI flags fall through to the
    /// lower layers.
    pub fn load(
        file: Option<&Path>,
        overrides: &[(&str, Option<String>)],
    ) -> Result<Self, ConfigError> {
        Self::load_from(file, None, overrides)
    }

    /// Like [`RunConfig::load`], reading environment variables from `env`
    /// instead of the process when given.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
        overrides: &[(&str, Option<String>)],
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).source(env));
        for (key, value) in overrides {
            builder = builder.set_override_option(*key, value.clone())?;
        }

        let config: RunConfig = builder.build()?.try_deserialize()?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        for (key, value) in [
            ("token", &self.token),
            ("origin_datasource", &self.origin_datasource),
            ("destination_datasource", &self.destination_datasource),
            ("prefix", &self.prefix),
            ("inventory_name", &self.inventory_name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(key));
            }
        }
        if self.origin_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("origin_dir"));
        }
        if self.destination_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("destination_dir"));
        }

        self.tenant = non_empty(self.tenant);
        self.platform_domain = non_empty(self.platform_domain);
        self.base_url = non_empty(self.base_url);
        self.filter_tag = non_empty(self.filter_tag);
        self.transferred_tag = non_empty(self.transferred_tag);

        if self.tenant.is_none() && self.base_url.is_none() {
            return Err(ConfigError::NoEndpoint);
        }
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Zero("timeout_secs"));
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Path of the inventory CSV inside the origin directory.
    pub fn inventory_path(&self) -> PathBuf {
        self.origin_dir.join(format!("{}.csv", self.inventory_name))
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("token", &"<redacted>")
            .field("tenant", &self.tenant)
            .field("platform_domain", &self.platform_domain)
            .field("base_url", &self.base_url)
            .field("origin_datasource", &self.origin_datasource)
            .field("destination_datasource", &self.destination_datasource)
            .field("origin_dir", &self.origin_dir)
            .field("destination_dir", &self.destination_dir)
            .field("prefix", &self.prefix)
            .field("inventory_name", &self.inventory_name)
            .field("filter_tag", &self.filter_tag)
            .field("transferred_tag", &self.transferred_tag)
            .field("tag_after", &self.tag_after)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn required_env() -> Vec<(&'static str, &'static str)> {
        vec![
            ("MONITOR_TRANSFER_TOKEN", "secret-token"),
            ("MONITOR_TRANSFER_TENANT", "onboarding"),
            ("MONITOR_TRANSFER_ORIGIN_DATASOURCE", "origin-ds"),
            ("MONITOR_TRANSFER_DESTINATION_DATASOURCE", "dest-ds"),
            ("MONITOR_TRANSFER_ORIGIN_DIR", "yaml_origin"),
            ("MONITOR_TRANSFER_DESTINATION_DIR", "yaml_destination"),
            ("MONITOR_TRANSFER_PREFIX", "Source XYZ"),
        ]
    }

    #[test]
    fn test_env_only_with_defaults() {
        let config = RunConfig::load_from(None, env(&required_env()), &[]).unwrap();

        assert_eq!(config.tenant.as_deref(), Some("onboarding"));
        assert_eq!(config.origin_dir, PathBuf::from("yaml_origin"));
        assert_eq!(config.inventory_name, "origin_monitors");
        assert_eq!(config.inventory_path(), PathBuf::from("yaml_origin/origin_monitors.csv"));
        assert_eq!(config.page_size, 500);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.tag_after, TagAfter::Copy);
        assert_eq!(config.filter_tag, None);
    }

    #[test]
    fn test_file_then_env_then_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
token = "file-token"
tenant = "from-file"
origin_datasource = "origin-ds"
destination_datasource = "dest-ds"
origin_dir = "o"
destination_dir = "d"
prefix = "File prefix"
page_size = 50
tag_after = "convert"
"#
        )
        .unwrap();

        let config = RunConfig::load_from(
            Some(file.path()),
            env(&[("MONITOR_TRANSFER_TENANT", "from-env"), ("MONITOR_TRANSFER_PAGE_SIZE", "75")]),
            &[("prefix", Some("CLI prefix".to_string())), ("filter_tag", None)],
        )
        .unwrap();

        assert_eq!(config.token, "file-token");
        assert_eq!(config.tenant.as_deref(), Some("from-env"));
        assert_eq!(config.page_size, 75);
        assert_eq!(config.prefix, "CLI prefix");
        assert_eq!(config.tag_after, TagAfter::Convert);
    }

    #[test]
    fn test_empty_tags_are_unset() {
        let mut vars = required_env();
        vars.push(("MONITOR_TRANSFER_FILTER_TAG", ""));
        vars.push(("MONITOR_TRANSFER_TRANSFERRED_TAG", "  "));

        let config = RunConfig::load_from(None, env(&vars), &[]).unwrap();
        assert_eq!(config.filter_tag, None);
        assert_eq!(config.transferred_tag, None);
    }

    #[test]
    fn test_missing_required_field() {
        let vars: Vec<_> = required_env()
            .into_iter()
            .filter(|(k, _)| *k != "MONITOR_TRANSFER_PREFIX")
            .collect();

        let err = RunConfig::load_from(None, env(&vars), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err.to_string().contains("prefix"));
    }

    #[test]
    fn test_validation_errors() {
        let err = RunConfig::load_from(
            None,
            env(&required_env()),
            &[("token", Some(String::new()))],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Empty("token")));

        let vars: Vec<_> = required_env()
            .into_iter()
            .filter(|(k, _)| *k != "MONITOR_TRANSFER_TENANT")
            .collect();
        let err = RunConfig::load_from(None, env(&vars), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::NoEndpoint));

        let err = RunConfig::load_from(
            None,
            env(&required_env()),
            &[("page_size", Some("0".to_string()))],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Zero("page_size")));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = RunConfig::load_from(None, env(&required_env()), &[]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_unknown_tag_after_rejected() {
        let err = RunConfig::load_from(
            None,
            env(&required_env()),
            &[("tag_after", Some("later".to_string()))],
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
