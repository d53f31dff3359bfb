//! Named secret lookup.
//!
//! A secret is a key/value map of opaque byte values addressed by name and
//! namespace. The token manager reads the OCM refresh credential through this
//! interface and the Elasticsearch backend reads its basic-auth pair.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

pub type SecretData = HashMap<String, Vec<u8>>;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret [{namespace}/{name}] not found")]
    NotFound { name: String, namespace: String },

    #[error("unable to read secret [{namespace}/{name}]: {source}")]
    Io {
        name: String,
        namespace: String,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str, namespace: &str) -> Result<SecretData, SecretError>;
}

/// Reads secrets laid out as `<root>/<namespace>/<name>/<key>`, one file per
/// key. This is the shape of a mounted Kubernetes secret volume; the
/// `..data` style bookkeeping entries kubelet adds are skipped.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn secret_dir(&self, name: &str, namespace: &str) -> PathBuf {
        self.root.join(namespace).join(name)
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret(&self, name: &str, namespace: &str) -> Result<SecretData, SecretError> {
        let dir = self.secret_dir(name, namespace);
        let io_err = |source: std::io::Error| SecretError::Io {
            name: name.to_string(),
            namespace: namespace.to_string(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SecretError::NotFound {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                });
            }
            Err(e) => return Err(io_err(e)),
        };

        let mut data = SecretData::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let key = entry.file_name().to_string_lossy().into_owned();
            if key.starts_with('.') {
                continue;
            }

            // follows symlinks, which is how mounted secret keys are exposed
            let metadata = tokio::fs::metadata(entry.path()).await.map_err(io_err)?;
            if !metadata.is_file() {
                continue;
            }

            let value = tokio::fs::read(entry.path()).await.map_err(io_err)?;
            data.insert(key, value);
        }

        tracing::debug!(
            secret = %format!("{}/{}", namespace, name),
            keys = data.len(),
            "Read secret from file store"
        );

        Ok(data)
    }
}

/// Secrets held in memory, keyed by (namespace, name).
#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<(String, String), SecretData>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(
        mut self,
        name: &str,
        namespace: &str,
        data: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> Self {
        self.insert(name, namespace, data);
        self
    }

    pub fn insert(
        &mut self,
        name: &str,
        namespace: &str,
        data: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) {
        self.secrets.insert(
            (namespace.to_string(), name.to_string()),
            data.into_iter().collect(),
        );
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(&self, name: &str, namespace: &str) -> Result<SecretData, SecretError> {
        self.secrets
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_reads_keys() {
        let dir = TempDir::new().unwrap();
        let secret_dir = dir.path().join("ocm-log-forwarder").join("elastic-auth");
        std::fs::create_dir_all(&secret_dir).unwrap();
        std::fs::write(secret_dir.join("elastic"), b"changeme").unwrap();
        std::fs::write(secret_dir.join("..data"), b"ignored").unwrap();

        let store = FileSecretStore::new(dir.path());
        let data = store
            .get_secret("elastic-auth", "ocm-log-forwarder")
            .await
            .unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(data.get("elastic").unwrap(), b"changeme");
    }

    #[tokio::test]
    async fn test_file_store_missing_secret() {
        let dir = TempDir::new().unwrap();
        let store = FileSecretStore::new(dir.path());

        let err = store.get_secret("ocm-token", "default").await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_static_store() {
        let store = StaticSecretStore::new().with_secret(
            "ocm-token",
            "ns",
            [("cluster-a".to_string(), b"{}".to_vec())],
        );

        assert!(store.get_secret("ocm-token", "ns").await.is_ok());
        assert!(store.get_secret("ocm-token", "other").await.is_err());
    }
}
