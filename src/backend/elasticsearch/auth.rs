use crate::backend::BackendError;
use crate::config::{SecretRef, TlsConfig};
use crate::secrets::SecretStore;
use std::path::Path;
use tracing::warn;

pub const AUTH_TYPE_BASIC: &str = "basic";

/// Username and password used for every bulk request.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Reads the basic-auth secret, which must hold exactly one entry: the key is
/// the username and the value is the password.
pub async fn basic_credentials(
    secrets: &dyn SecretStore,
    secret: &SecretRef,
) -> Result<BasicCredentials, BackendError> {
    let data = secrets.get_secret(&secret.name, &secret.namespace).await?;

    if data.len() != 1 {
        return Err(BackendError::AuthSecret(format!(
            "expect exactly one key value pair in auth data secret [{}]; found [{}]",
            secret,
            data.len()
        )));
    }

    let Some((username, password)) = data.into_iter().next() else {
        return Err(BackendError::AuthSecret(format!(
            "secret [{}] has no entries",
            secret
        )));
    };

    if username.is_empty() {
        return Err(BackendError::AuthSecret(format!(
            "unable to find username in secret [{}]",
            secret
        )));
    }

    if password.is_empty() {
        return Err(BackendError::AuthSecret(format!(
            "unable to find password in secret [{}]",
            secret
        )));
    }

    let password = String::from_utf8(password).map_err(|_| {
        BackendError::AuthSecret(format!("password in secret [{}] is not UTF-8", secret))
    })?;

    Ok(BasicCredentials { username, password })
}

/// Builds the HTTP client used for bulk requests.
///
/// With `verify` off, server certificates are accepted without checks.
/// Otherwise the client certificate and key are loaded and presented.
pub async fn build_client(tls: &TlsConfig) -> Result<reqwest::Client, BackendError> {
    let identity = if tls.verify {
        Some(load_identity(&tls.cert, &tls.key).await?)
    } else {
        None
    };

    let builder = reqwest::Client::builder().use_rustls_tls();
    let builder = if let Some(identity) = identity {
        builder.identity(identity)
    } else {
        warn!("TLS verification disabled for elasticsearch backend");
        builder.danger_accept_invalid_certs(true)
    };

    Ok(builder.build()?)
}

async fn load_identity(cert: &Path, key: &Path) -> Result<reqwest::Identity, BackendError> {
    let load_err = |e: &dyn std::fmt::Display| {
        BackendError::Tls(format!(
            "unable to load key pair: cert={}, key={}: {}",
            cert.display(),
            key.display(),
            e
        ))
    };

    let mut pem = tokio::fs::read(key).await.map_err(|e| load_err(&e))?;
    pem.push(b'\n');
    pem.extend(tokio::fs::read(cert).await.map_err(|e| load_err(&e))?);

    reqwest::Identity::from_pem(&pem).map_err(|e| load_err(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::StaticSecretStore;
    use std::path::PathBuf;

    fn secret_ref() -> SecretRef {
        SecretRef {
            name: "elastic-auth".to_string(),
            namespace: "ocm-log-forwarder".to_string(),
        }
    }

    fn store(entries: &[(&str, &str)]) -> StaticSecretStore {
        StaticSecretStore::new().with_secret(
            "elastic-auth",
            "ocm-log-forwarder",
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec())),
        )
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("certs")
            .join(name)
    }

    #[tokio::test]
    async fn test_single_pair_is_credentials() {
        let creds = basic_credentials(&store(&[("elastic", "changeme")]), &secret_ref())
            .await
            .unwrap();
        assert_eq!(creds.username, "elastic");
        assert_eq!(creds.password, "changeme");
        assert!(!format!("{:?}", creds).contains("changeme"));
    }

    #[tokio::test]
    async fn test_wrong_pair_count() {
        let two = store(&[("a", "1"), ("b", "2")]);
        assert!(matches!(
            basic_credentials(&two, &secret_ref()).await,
            Err(BackendError::AuthSecret(_))
        ));

        let none = store(&[]);
        assert!(matches!(
            basic_credentials(&none, &secret_ref()).await,
            Err(BackendError::AuthSecret(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_password() {
        let result = basic_credentials(&store(&[("elastic", "")]), &secret_ref()).await;
        assert!(matches!(result, Err(BackendError::AuthSecret(_))));
    }

    #[tokio::test]
    async fn test_missing_secret() {
        let result = basic_credentials(&StaticSecretStore::new(), &secret_ref()).await;
        assert!(matches!(result, Err(BackendError::Secret(_))));
    }

    #[tokio::test]
    async fn test_verify_false_skips_cert_loading() {
        let tls = TlsConfig {
            cert: PathBuf::from("/nonexistent/tls.crt"),
            key: PathBuf::from("/nonexistent/tls.key"),
            verify: false,
        };
        assert!(build_client(&tls).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_cert_files() {
        let tls = TlsConfig {
            cert: PathBuf::from("/nonexistent/tls.crt"),
            key: PathBuf::from("/nonexistent/tls.key"),
            verify: true,
        };
        assert!(matches!(build_client(&tls).await, Err(BackendError::Tls(_))));
    }

    #[tokio::test]
    async fn test_valid_cert_pair() {
        let tls = TlsConfig {
            cert: fixture("fake-tls.crt"),
            key: fixture("fake-tls.key"),
            verify: true,
        };
        assert!(build_client(&tls).await.is_ok());
    }
}
