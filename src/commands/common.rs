//! Arguments and setup shared by the commands that talk to the provider.

use super::Host;
use super::config::Config;
use crate::Result;
use crate::credentials::{AppCredentials, FileCredentialStore, TokenSources};
use crate::graph::HttpTransport;
use crate::insights::{ClientOptions, InsightsClient};
use crate::reports::{Tabular, generate_csv, generate_json};
use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use directories::BaseDirs;
use ohno::IntoAppError;
use serde::Serialize;
use std::fs;
use std::io::Write;

const LOG_TARGET: &str = "    common";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Common arguments shared between the page, posts and token commands
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// User access token that can list the pages it manages
    #[arg(long, value_name = "TOKEN", env = "FB_USER_ACCESS_TOKEN", hide_env_values = true)]
    pub user_token: Option<String>,

    /// Page access token for the default page
    #[arg(long, value_name = "TOKEN", env = "FB_DEFAULT_PAGE_ACCESS_TOKEN", hide_env_values = true)]
    pub page_token: Option<String>,

    /// Application id used to exchange expiring tokens
    #[arg(long, value_name = "ID", env = "FB_APP_ID")]
    pub app_id: Option<String>,

    /// Application secret used to exchange expiring tokens
    #[arg(long, value_name = "SECRET", env = "FB_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    /// Page queried when no page id is given
    #[arg(long, value_name = "ID", env = "FB_DEFAULT_PAGE_ID")]
    pub default_page_id: Option<String>,

    /// Path to configuration file (default is `page-insights.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory where resolved page tokens are cached
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", global = true)]
    pub log_level: LogLevel,

    /// Output rows to a CSV file
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub csv: Option<Utf8PathBuf>,

    /// Output results to a JSON file instead of to the terminal
    #[arg(long, value_name = "PATH", help_heading = "Report Output")]
    pub json: Option<Utf8PathBuf>,
}

pub struct Common<'a, H: Host> {
    pub client: InsightsClient<HttpTransport, FileCredentialStore>,
    host: &'a mut H,
    csv: Option<Utf8PathBuf>,
    json: Option<Utf8PathBuf>,
}

impl<'a, H: Host> Common<'a, H> {
    /// Create a new Common processor with logger, config and client
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the client cannot be built
    pub fn new(host: &'a mut H, args: &CommonArgs) -> Result<Self> {
        Self::init_logging(args.log_level);

        let config = Config::load(args.config.as_ref())?;

        // Determine cache directory: use provided path or default cache directory for the platform
        let cache_dir = if let Some(cache_path) = &args.cache_dir {
            cache_path.as_std_path().to_path_buf()
        } else {
            BaseDirs::new()
                .into_app_err("could not determine cache directory")?
                .cache_dir()
                .join("page-insights")
        };
        log::debug!(target: LOG_TARGET, "Caching page tokens in '{}'", cache_dir.display());

        let app = match (&args.app_id, &args.app_secret) {
            (Some(id), Some(secret)) => Some(AppCredentials::new(id.as_str(), secret.as_str())),
            _ => None,
        };

        let options = ClientOptions {
            api_server: config.api_server,
            api_version: config.api_version,
            default_page_id: args.default_page_id.clone().or(config.default_page_id),
            app,
            sources: TokenSources {
                user_token: args.user_token.clone(),
                default_page_token: args.page_token.clone(),
            },
        };

        let transport = HttpTransport::new(config.request_timeout)?;
        let client = InsightsClient::new(transport, FileCredentialStore::new(cache_dir), options)?;

        Ok(Self {
            client,
            host,
            csv: args.csv.clone(),
            json: args.json.clone(),
        })
    }

    /// Initialize logger based on log level
    fn init_logging(log_level: LogLevel) {
        let level = match log_level {
            LogLevel::None => return,
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        let env = env_logger::Env::default().filter_or("RUST_LOG", level);

        // a logger may already be installed when commands run more than once in a process
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
            .try_init();
    }

    pub fn host(&mut self) -> &mut H {
        self.host
    }

    /// Write `rows` and `document` to the requested report files.
    ///
    /// Without `--csv` or `--json`, the document is printed as JSON instead.
    pub fn report<R: Tabular, D: Serialize + ?Sized>(&mut self, rows: &[R], document: &D) -> Result<()> {
        if let Some(filename) = &self.csv {
            let mut csv_output = String::new();
            generate_csv(rows, &mut csv_output)?;
            fs::write(filename, csv_output).into_app_err_with(|| format!("writing CSV report to {filename}"))?;
            log::info!(target: LOG_TARGET, "Wrote {} row(s) to '{filename}'", rows.len());
        }

        if let Some(filename) = &self.json {
            let mut json_output = String::new();
            generate_json(document, &mut json_output)?;
            fs::write(filename, json_output).into_app_err_with(|| format!("writing JSON report to {filename}"))?;
            log::info!(target: LOG_TARGET, "Wrote JSON report to '{filename}'");
        }

        if self.csv.is_none() && self.json.is_none() {
            let mut json_output = String::new();
            generate_json(document, &mut json_output)?;
            let _ = write!(self.host.output(), "{json_output}");
        }

        Ok(())
    }
}
