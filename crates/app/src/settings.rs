//! Application settings.
//!
//! Values come from an optional TOML file (`settings.toml` unless `--config`
//! names another) overlaid with `FINLIT__*` environment variables, e.g.
//! `FINLIT__SERVER__PORT=8080` or `FINLIT__PLAID__SECRET=...`.
//!
//! Secrets (`plaid.secret`, `security.token_key`) are best passed through
//! the environment.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use plaid::PlaidEnvironment;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Plaid {
    #[serde(default)]
    pub environment: PlaidEnvironment,
    pub client_id: String,
    pub secret: String,
    /// Per-call timeout, also used as the engine's provider deadline.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name Link shows to the user.
    pub client_name: Option<String>,
    pub products: Option<Vec<String>>,
    pub country_codes: Option<Vec<String>>,
    pub redirect_uri: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    /// OAuth2 access tokens checked against Google's tokeninfo endpoint.
    #[default]
    Google,
    /// The bearer token is taken as the user id. Development only.
    Passthrough,
}

#[derive(Debug, Default, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub provider: IdentityProvider,
    /// Overrides the tokeninfo endpoint of the `google` provider.
    pub tokeninfo_url: Option<String>,
    /// OAuth2 client id tokens must have been issued to.
    pub audience: Option<String>,
    /// Must be set for the `passthrough` provider to start.
    #[serde(default)]
    pub allow_insecure_passthrough: bool,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Security {
    /// Base64 of the 32-byte key sealing provider access tokens at rest.
    pub token_key: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub server: Option<Server>,
    pub plaid: Option<Plaid>,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub security: Security,
}

#[derive(Debug, Parser)]
#[command(name = "finlit", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML, extension may be omitted).
    #[arg(long)]
    config: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("FINLIT").separator("__"))
            .build()?
            .try_deserialize()
    }
}
