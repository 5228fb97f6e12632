use serde::Deserialize;
use tsgate_core::error::{Result, TsGateError};
use tsgate_core::TimestampPolicy;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub datastore: DatastoreSection,

    #[serde(default)]
    pub ingest: IngestSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            datastore: DatastoreSection::default(),
            ingest: IngestSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TsGateError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.datastore.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen
            .parse::<std::net::SocketAddr>()
            .map_err(|e| TsGateError::Config(format!("server.listen must be a socket address: {e}")))?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8000".into()
}

/// Which datastore implementation backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Hosted PostgREST endpoint (credentials from the environment).
    #[default]
    Postgrest,
    /// Process-local tables, lost on restart.
    Memory,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatastoreSection {
    #[serde(default)]
    pub backend: Backend,

    /// Environment variable holding the endpoint URL.
    #[serde(default = "default_url_env")]
    pub url_env: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after a connection failure.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for DatastoreSection {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            url_env: default_url_env(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }
}

impl DatastoreSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.timeout_ms) {
            return Err(TsGateError::Config(
                "datastore.timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.retries > 5 {
            return Err(TsGateError::Config(
                "datastore.retries must be at most 5".into(),
            ));
        }
        if self.url_env.trim().is_empty() || self.api_key_env.trim().is_empty() {
            return Err(TsGateError::Config(
                "datastore.url_env and datastore.api_key_env must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_url_env() -> String {
    "SUPABASE_URL".into()
}
fn default_api_key_env() -> String {
    "SUPABASE_API".into()
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_retries() -> u32 {
    1
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct IngestSection {
    #[serde(default)]
    pub timestamp_policy: TimestampPolicy,
}

/// Endpoint credentials, resolved from the environment at startup.
#[derive(Clone)]
pub struct Credentials {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials through `lookup` (normally `std::env::var`).
    pub fn resolve<F>(section: &DatastoreSection, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TsGateError::Config(format!("environment variable {name} is not set")))
        };
        Ok(Self {
            url: fetch(&section.url_env)?,
            api_key: fetch(&section.api_key_env)?,
        })
    }

    pub fn from_env(section: &DatastoreSection) -> Result<Self> {
        Self::resolve(section, |name| std::env::var(name).ok())
    }
}
