use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const MIN_POLL_INTERVAL_MINUTES: u64 = 1;
pub const MAX_POLL_INTERVAL_MINUTES: u64 = 1440;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OCM cluster whose service logs are forwarded. Required.
    #[serde(default)]
    pub cluster_id: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub poller: PollerConfig,
    /// Secret holding the OCM refresh credential, keyed by cluster id
    #[serde(default = "default_ocm_secret")]
    pub secret: SecretRef,
    #[serde(default)]
    pub secret_store: SecretStoreConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster_id: String::new(),
            debug: false,
            poller: PollerConfig::default(),
            secret: default_ocm_secret(),
            secret_store: SecretStoreConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

fn default_ocm_secret() -> SecretRef {
    SecretRef {
        name: "ocm-token".to_string(),
        namespace: "ocm-log-forwarder".to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            page_size: default_page_size(),
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_minutes * 60)
    }
}

fn default_interval_minutes() -> u64 {
    5
}

fn default_page_size() -> usize {
    1000
}

/// Name and namespace of a secret in the secret store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretStoreConfig {
    #[serde(default = "default_secret_store_path")]
    pub path: PathBuf,
}

impl Default for SecretStoreConfig {
    fn default() -> Self {
        Self {
            path: default_secret_store_path(),
        }
    }
}

fn default_secret_store_path() -> PathBuf {
    PathBuf::from("/var/run/secrets/ocm-log-forwarder")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    #[default]
    Elasticsearch,
    Stdout,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Elasticsearch => "elasticsearch",
            BackendType::Stdout => "stdout",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "elasticsearch" => Ok(BackendType::Elasticsearch),
            "stdout" => Ok(BackendType::Stdout),
            other => Err(format!(
                "unknown backend type '{}' (expected 'elasticsearch' or 'stdout')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(rename = "type", default)]
    pub backend_type: BackendType,
    #[serde(default)]
    pub elasticsearch: ElasticSearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticSearchConfig {
    #[serde(default = "default_es_url")]
    pub url: String,
    #[serde(default = "default_es_index")]
    pub index: String,
    /// Checked when the backend initializes, not at load time
    #[serde(default = "default_es_auth_type")]
    pub auth_type: String,
    /// Secret holding exactly one username/password pair
    #[serde(default = "default_es_secret")]
    pub secret: SecretRef,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ElasticSearchConfig {
    fn default() -> Self {
        Self {
            url: default_es_url(),
            index: default_es_index(),
            auth_type: default_es_auth_type(),
            secret: default_es_secret(),
            tls: TlsConfig::default(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_es_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_es_index() -> String {
    "ocm_service_logs".to_string()
}

fn default_es_auth_type() -> String {
    "basic".to_string()
}

fn default_es_secret() -> SecretRef {
    SecretRef {
        name: "elastic-auth".to_string(),
        namespace: "ocm-log-forwarder".to_string(),
    }
}

fn default_batch_size() -> usize {
    crate::backend::DEFAULT_BATCH_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default = "default_tls_cert")]
    pub cert: PathBuf,
    #[serde(default = "default_tls_key")]
    pub key: PathBuf,
    /// When false, server certificates are not verified and no client
    /// certificate is loaded
    #[serde(default = "default_tls_verify")]
    pub verify: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert: default_tls_cert(),
            key: default_tls_key(),
            verify: default_tls_verify(),
        }
    }
}

fn default_tls_cert() -> PathBuf {
    PathBuf::from("/etc/pki/tls.crt")
}

fn default_tls_key() -> PathBuf {
    PathBuf::from("/etc/pki/tls.key")
}

fn default_tls_verify() -> bool {
    true
}
