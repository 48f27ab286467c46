use anyhow::{anyhow, bail, Context};
use ledger_network::DialTarget;
use ledger_security::{ClientIdentityConfig, TrustAnchorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub node: NodeConfig,
    pub tls: TlsConfig,
    pub keystore: KeystoreConfig,
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    pub enabled: bool,
    pub ca_cert_path: Option<String>,
    pub client_auth_enabled: bool,
    pub client_cert_path: Option<String>,
    pub client_key_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    pub root_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub bootstrap_peers: Vec<PeerConfig>,
    pub connect_timeout_secs: u64,
    pub keep_alive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub address: String,
    pub server_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            name: "node0".to_string(),
        }
    }
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        KeystoreConfig {
            root_dir: "keystore".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bootstrap_peers: vec![],
            connect_timeout_secs: 10,
            keep_alive: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then the config file (if present), then environment overrides.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let mut app_config = if Path::new(path).exists() {
            Self::from_file(Path::new(path))?
        } else {
            AppConfig::default()
        };

        Self::override_from_env(&mut app_config)?;

        Ok(app_config)
    }

    /// Parse a TOML config file; sections and fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("Failed to load config file {}", path.display()))?;

        settings
            .try_deserialize::<AppConfig>()
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn override_from_env(config: &mut AppConfig) -> anyhow::Result<()> {
        if let Ok(name) = std::env::var("NODE_NAME") {
            config.node.name = name;
        }

        if let Ok(enabled) = std::env::var("TLS_ENABLED") {
            config.tls.enabled = parse_bool("TLS_ENABLED", &enabled)?;
        }

        if let Ok(ca_cert_path) = std::env::var("TLS_CA_CERT_PATH") {
            config.tls.ca_cert_path = Some(ca_cert_path);
        }

        if let Ok(enabled) = std::env::var("TLS_CLIENT_AUTH_ENABLED") {
            config.tls.client_auth_enabled = parse_bool("TLS_CLIENT_AUTH_ENABLED", &enabled)?;
        }

        if let Ok(cert_path) = std::env::var("TLS_CLIENT_CERT_PATH") {
            config.tls.client_cert_path = Some(cert_path);
        }

        if let Ok(key_path) = std::env::var("TLS_CLIENT_KEY_PATH") {
            config.tls.client_key_path = Some(key_path);
        }

        if let Ok(root_dir) = std::env::var("KEYSTORE_DIR") {
            config.keystore.root_dir = root_dir;
        }

        if let Ok(timeout) = std::env::var("CONNECT_TIMEOUT_SECS") {
            config.network.connect_timeout_secs = timeout
                .parse()
                .map_err(|e| anyhow!("Invalid CONNECT_TIMEOUT_SECS: {}", e))?;
        }

        if let Ok(bootstrap_peers) = std::env::var("BOOTSTRAP_PEERS") {
            if !bootstrap_peers.is_empty() {
                config.network.bootstrap_peers = parse_peer_list(&bootstrap_peers)?;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.trust_anchor().validate()?;

        if self.keystore.root_dir.trim().is_empty() {
            bail!("keystore root_dir cannot be empty");
        }

        if self.network.connect_timeout_secs == 0 {
            bail!("connect_timeout_secs must be greater than 0");
        }

        for peer in &self.network.bootstrap_peers {
            if peer.address.trim().is_empty() {
                bail!("bootstrap peer address cannot be empty");
            }
        }

        Ok(())
    }

    /// Transport security settings derived from the `[tls]` section.
    pub fn trust_anchor(&self) -> TrustAnchorConfig {
        let client_identity = match (&self.tls.client_cert_path, &self.tls.client_key_path) {
            (Some(cert_path), Some(key_path)) => Some(ClientIdentityConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => None,
        };

        TrustAnchorConfig {
            secure_transport_required: self.tls.enabled,
            trust_bundle_path: self.tls.ca_cert_path.clone(),
            mutual_auth_required: self.tls.client_auth_enabled,
            client_identity,
        }
    }

    pub fn bootstrap_targets(&self) -> Vec<DialTarget> {
        self.network
            .bootstrap_peers
            .iter()
            .map(|peer| DialTarget::new(peer.address.clone(), peer.server_name.clone()))
            .collect()
    }
}

fn parse_bool(var: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("Invalid {}: {}", var, other)),
    }
}

/// Parse `name@host:port` entries separated by commas.
///
/// Without a `name@` prefix the host part doubles as the expected server name.
pub fn parse_peer_list(value: &str) -> anyhow::Result<Vec<PeerConfig>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (server_name, address) = match entry.split_once('@') {
                Some((name, address)) => (name.to_string(), address.to_string()),
                None => {
                    let (host, _port) = entry
                        .rsplit_once(':')
                        .ok_or_else(|| anyhow!("Invalid bootstrap peer {}: missing port", entry))?;
                    (host.trim_matches(&['[', ']'][..]).to_string(), entry.to_string())
                }
            };
            Ok(PeerConfig {
                address,
                server_name,
            })
        })
        .collect()
}
