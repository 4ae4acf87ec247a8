use crate::constants::{IDENTITY_COOKIE, IDENTITY_MAX_AGE_SECS};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level service configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub removal: RemovalConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
    /// Base URL used to build public object locators.
    pub public_url: String,
    pub max_body_bytes: usize,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Object store root.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Background-removal service.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RemovalConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Anonymous identity cookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub cookie_name: String,
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level or a full filter directive (`info`, `cutout=debug,tower_http=info`).
    pub level: String,
    pub json: bool,
    pub dir: Option<PathBuf>,
}

impl fmt::Debug for RemovalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("RemovalConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &api_key)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 4583,
            ssl: None,
            public_url: "http://localhost:4583".to_owned(),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("data") }
    }
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.remove.bg/v1.0/removebg".to_owned(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { cookie_name: IDENTITY_COOKIE.to_owned(), max_age_secs: IDENTITY_MAX_AGE_SECS }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, dir: None }
    }
}
