pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# OCM LOG FORWARDER CONFIGURATION
# =============================================================================
# Polls OpenShift Cluster Manager for the service logs of one cluster and
# forwards every log not yet sent during this process's lifetime to a backend.
#
# Every setting below may also be supplied through the environment; an
# environment variable always wins over the value in this file. Values may
# reference the environment as $env{...} around a variable name.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/ocm-log-forwarder/config.yml
#   3. /etc/ocm-log-forwarder/config.yml

# OCM cluster id whose service logs are forwarded (env: OCM_CLUSTER_ID)
cluster_id: $env{OCM_CLUSTER_ID}

# Enable debug logging (env: DEBUG)
debug: false

poller:
  # Minutes between polls, 1 to 1440 (env: OCM_POLL_INTERVAL_MINUTES)
  interval_minutes: 5
  # Service logs requested per page (env: OCM_PAGE_SIZE)
  page_size: 1000

# Secret holding the OCM refresh credential. The key inside the secret is the
# cluster id; the value is a JSON document with refresh_token, url,
# token_url, client_id and access_token.
# (env: OCM_SECRET_NAME, OCM_SECRET_NAMESPACE)
secret:
  name: ocm-token
  namespace: ocm-log-forwarder

# Secrets are read from <path>/<namespace>/<name>/<key>, one file per key,
# which is the layout of a mounted Kubernetes secret volume.
# (env: SECRET_STORE_PATH)
secret_store:
  path: /var/run/secrets/ocm-log-forwarder

backend:
  # 'elasticsearch' or 'stdout' (env: BACKEND_TYPE)
  type: elasticsearch

  elasticsearch:
    url: http://localhost:9200         # env: BACKEND_ES_URL
    index: ocm_service_logs            # env: BACKEND_ES_INDEX
    # Only 'basic' is supported (env: BACKEND_ES_AUTH_TYPE)
    auth_type: basic
    # Secret with exactly one key/value pair: username -> password
    # (env: BACKEND_ES_SECRET_NAME, BACKEND_ES_SECRET_NAMESPACE)
    secret:
      name: elastic-auth
      namespace: ocm-log-forwarder
    tls:
      cert: /etc/pki/tls.crt           # env: BACKEND_ES_CERT
      key: /etc/pki/tls.key            # env: BACKEND_ES_KEY
      verify: true                     # env: BACKEND_ES_TLS_VERIFY
    # Documents per bulk request (env: BACKEND_ES_BATCH_SIZE)
    batch_size: 100
"#
    .to_string()
}
