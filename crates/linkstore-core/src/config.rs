//! Gateway configuration: defaults, optional TOML file, then environment.
//!
//! | Key | Default | Env |
//! |-----|---------|-----|
//! | `app_name` | linkstore | LINKSTORE_APP_NAME |
//! | `host` / `port` | 127.0.0.1 / 5000 | LINKSTORE_HOST, LINKSTORE_PORT (legacy FLASK_PORT) |
//! | `store.backend` | etcd | LINKSTORE_STORE__BACKEND (`etcd` \| `sled`) |
//! | `store.etcd_host` / `store.etcd_port` | localhost / 2379 | ETCD_HOST, ETCD_PORT |
//! | `store.sled_path` | ./data/linkstore | LINKSTORE_STORE__SLED_PATH |
//! | `network.skill_lookup` | scan | LINKSTORE_NETWORK__SKILL_LOOKUP (`scan` \| `index`) |
//! | `network.prune_skill_index_on_delete` | true | LINKSTORE_NETWORK__PRUNE_SKILL_INDEX_ON_DELETE |

use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "config/linkstore";

/// Which key-value backend the adapter talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendKind {
    /// Remote etcd v3 cluster via its JSON gateway.
    #[default]
    Etcd,
    /// Embedded sled database (local development, tests).
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackendKind,
    #[serde(default = "default_etcd_host")]
    pub etcd_host: String,
    #[serde(default = "default_etcd_port")]
    pub etcd_port: u16,
    #[serde(default = "default_sled_path")]
    pub sled_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::default(),
            etcd_host: default_etcd_host(),
            etcd_port: default_etcd_port(),
            sled_path: default_sled_path(),
        }
    }
}

impl StoreConfig {
    /// Base URL of the etcd JSON gateway, e.g. `http://localhost:2379`.
    pub fn etcd_endpoint(&self) -> String {
        format!("http://{}:{}", self.etcd_host, self.etcd_port)
    }
}

/// How skill search and recommendations find candidate profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLookup {
    /// Enumerate every profile and its skill-set on each request. The reverse index is written but never read.
    #[default]
    Scan,
    /// Read candidates from `/indices/habilidade/{skill}/`.
    Index,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub skill_lookup: SkillLookup,
    /// When false, deleting a profile leaves its reverse-index entries behind.
    #[serde(default = "default_true")]
    pub prune_skill_index_on_delete: bool,
    #[serde(default = "default_top_n")]
    pub recommendation_limit: usize,
    #[serde(default = "default_top_n")]
    pub popular_skills_limit: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            skill_lookup: SkillLookup::default(),
            prune_skill_index_on_delete: true,
            recommendation_limit: default_top_n(),
            popular_skills_limit: default_top_n(),
        }
    }
}

/// Top-level configuration for the gateway process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkstoreConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Default for LinkstoreConfig {
    fn default() -> Self {
        Self {
            app_name: "linkstore".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            store: StoreConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl LinkstoreConfig {
    /// Load config from file and environment. Precedence: `ETCD_*` / `FLASK_PORT` > `LINKSTORE_*` env >
    /// file at `LINKSTORE_CONFIG` (or `config/linkstore.toml`) > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("LINKSTORE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let builder = config::Config::builder()
            .set_default("app_name", "linkstore")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 5000_i64)?
            .set_default("store.backend", "etcd")?
            .set_default("store.etcd_host", default_etcd_host())?
            .set_default("store.etcd_port", i64::from(default_etcd_port()))?
            .set_default("store.sled_path", default_sled_path())?
            .set_default("network.skill_lookup", "scan")?
            .set_default("network.prune_skill_index_on_delete", true)?
            .set_default("network.recommendation_limit", default_top_n() as i64)?
            .set_default("network.popular_skills_limit", default_top_n() as i64)?;

        let builder = builder.add_source(config::File::with_name(&config_path).required(false));

        let built = builder
            .add_source(
                config::Environment::with_prefix("LINKSTORE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("store.etcd_host", env_opt_string("ETCD_HOST"))?
            .set_override_option("store.etcd_port", env_opt_string("ETCD_PORT"))?
            .set_override_option("port", env_opt_string("FLASK_PORT"))?
            .build()?;

        built.try_deserialize()
    }
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    5
}

fn default_etcd_host() -> String {
    "localhost".to_string()
}

fn default_etcd_port() -> u16 {
    2379
}

fn default_sled_path() -> String {
    "./data/linkstore".to_string()
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
