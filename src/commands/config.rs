use crate::Result;
use crate::graph::RequestComposer;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File name looked up in the current directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "page-insights.toml";

#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL of the Graph API server
    #[serde(default = "default_api_server")]
    pub api_server: String,

    /// API version path prefix, e.g. `v10.0`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Upper bound on the duration of each request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Page used when a command is not given a page id
    #[serde(default)]
    pub default_page_id: Option<String>,
}

fn default_api_server() -> String {
    crate::insights::DEFAULT_API_SERVER.to_owned()
}

fn default_api_version() -> String {
    crate::insights::DEFAULT_API_VERSION.to_owned()
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `page-insights.toml` in the current directory is
    /// used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading page-insights configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = Utf8PathBuf::from(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading page-insights configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let _ = RequestComposer::new(&self.api_server, &self.api_version)
            .into_app_err_with(|| format!("invalid api_server '{}' or api_version '{}'", self.api_server, self.api_version))?;

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        if self.default_page_id.as_deref().is_some_and(str::is_empty) {
            return Err(app_err!("default_page_id must not be empty when set"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_server, "https://graph.facebook.com");
        assert_eq!(config.api_version, "v10.0");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.default_page_id, None);
        config.validate().unwrap();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_explicit_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("custom.toml")).unwrap();
        fs::write(
            &path,
            "api_server = \"http://127.0.0.1:9000\"\napi_version = \"v11.0\"\nrequest_timeout = \"2m\"\ndefault_page_id = \"42\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.api_server, "http://127.0.0.1:9000");
        assert_eq!(config.api_version, "v11.0");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.default_page_id.as_deref(), Some("42"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("partial.toml")).unwrap();
        fs::write(&path, "default_page_id = \"7\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.api_version, "v10.0");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("bad.toml")).unwrap();
        fs::write(&path, "app_secret = \"do-not-store-me\"\n").unwrap();

        let _ = Config::load(Some(&path)).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_values_are_rejected() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("zero.toml")).unwrap();

        fs::write(&path, "request_timeout = \"0s\"\n").unwrap();
        let _ = Config::load(Some(&path)).unwrap_err();

        fs::write(&path, "api_version = \"\"\n").unwrap();
        let _ = Config::load(Some(&path)).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("absent.toml")).unwrap();
        let _ = Config::load(Some(&path)).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_save_default_round_trips() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();

        Config::save_default(&path).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.api_server, Config::default().api_server);
    }
}
