use crate::error::ImportError;
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

const USERS_PATH: &str = "/users";
const DEFAULT_DATABASE: &str = "provisioned_users.db";
const DEFAULT_TOKEN_POINTER: &str = "/access_token";

/// Import user records from a CSV file, provisioning each one remotely.
#[derive(Debug, Parser)]
#[command(name = "provision-import", version, about)]
pub struct Args {
    /// CSV file of user records
    pub input: PathBuf,

    /// TOML file providing any of the settings below
    #[arg(short, long, env = "PROVISION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the provisioning service
    #[arg(long, env = "PROVISION_BASE_URL")]
    pub base_url: Option<String>,

    /// Integration client id
    #[arg(long, env = "PROVISION_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Integration client secret
    #[arg(long, env = "PROVISION_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// SQLite database receiving provisioned users
    #[arg(long, env = "PROVISION_DATABASE")]
    pub database: Option<PathBuf>,

    /// JSON pointer of the token in the provisioning response
    #[arg(long, env = "PROVISION_TOKEN_POINTER")]
    pub token_pointer: Option<String>,

    /// Log request and response bodies without masking credentials
    #[arg(long, env = "PROVISION_LOG_PAYLOADS")]
    pub log_payloads: bool,
}

/// Settings read from the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    base_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    database: Option<PathBuf>,
    token_pointer: Option<String>,
    log_payloads: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let text = fs::read_to_string(path).map_err(|err| {
            ImportError::ConfigError(format!("cannot read {}: {err}", path.display()))
        })?;

        toml::from_str(&text).map_err(|err| {
            ImportError::ConfigError(format!("invalid config file {}: {err}", path.display()))
        })
    }
}

/// Validated settings for one run.
pub struct Config {
    pub input: PathBuf,
    pub endpoint: Url,
    pub client_id: String,
    pub client_secret: String,
    pub database: PathBuf,
    pub token_pointer: String,
    pub log_payloads: bool,
}

impl Config {
    /// Read the optional config file named by `args` and resolve the settings.
    pub fn load(args: Args) -> Result<Self, ImportError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        Config::resolve(args, file)
    }

    /// Merge command line and file settings, the command line winning,
    /// and validate the result.
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self, ImportError> {
        let base_url = required(args.base_url.or(file.base_url), "base_url")?;
        let endpoint = users_endpoint(&base_url)?;
        let client_id = required(args.client_id.or(file.client_id), "client_id")?;
        let client_secret = required(args.client_secret.or(file.client_secret), "client_secret")?;

        let token_pointer = args
            .token_pointer
            .or(file.token_pointer)
            .unwrap_or_else(|| DEFAULT_TOKEN_POINTER.to_owned());
        if !token_pointer.is_empty() && !token_pointer.starts_with('/') {
            return Err(ImportError::ConfigError(format!(
                "token_pointer {token_pointer:?} must start with '/'"
            )));
        }

        Ok(Config {
            input: args.input,
            endpoint,
            client_id,
            client_secret,
            database: args
                .database
                .or(file.database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            token_pointer,
            log_payloads: args.log_payloads || file.log_payloads.unwrap_or(false),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("input", &self.input)
            .field("endpoint", &self.endpoint.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"********")
            .field("database", &self.database)
            .field("token_pointer", &self.token_pointer)
            .field("log_payloads", &self.log_payloads)
            .finish()
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, ImportError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ImportError::ConfigError(format!("{name} is required")))
}

fn users_endpoint(base_url: &str) -> Result<Url, ImportError> {
    let invalid = |reason: String| {
        ImportError::ConfigError(format!("invalid base_url {base_url:?}: {reason}"))
    };

    let base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", base.scheme())));
    }

    let endpoint = format!("{}{USERS_PATH}", base.as_str().trim_end_matches('/'));
    Url::parse(&endpoint).map_err(|err| invalid(err.to_string()))
}
