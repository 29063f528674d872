use crate::types::marketplace::Marketplace;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Default lifetime of an issued bearer token, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub api: ApiConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    pub max_connections: u32,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:data.sqlite".to_string(),
            loglevel: "info".to_string(),
            max_connections: 5,
        }
    }
}

/// Knobs for the HTTP surface: token lifetime, page sizing and upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub token_ttl_secs: i64,
    pub default_page_size: u32,
    pub inventory_page_size: u32,
    pub max_page_size: u32,
    pub upload_limit_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            default_page_size: 50,
            inventory_page_size: 100,
            max_page_size: 100,
            upload_limit_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Users and credentials applied idempotently at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SeedConfig {
    pub credentials: Vec<SeedCredential>,
}

/// One seeded credential. Missing client id/secret are generated on first
/// insert and kept afterwards; a fixed `access_token` is re-armed on each boot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedCredential {
    pub username: String,
    pub marketplace: Marketplace,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Config {
    /// Layered load: built-in defaults, then `config.toml`, then `MARKET_*` env
    /// (nested keys separated by `__`, e.g. `MARKET_BASIC__DATABASE_URL`).
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("MARKET_").split("__"))
    }
}
