//! Key-space convention and record types.
//!
//! | Entity | Key |
//! |--------|-----|
//! | User | `/users/{id}` |
//! | Profile | `/perfis/{id}` |
//! | Skill-set | `/habilidades/{profile_id}` |
//! | Skill index | `/indices/habilidade/{skill}/{profile_id}` (value = profile id) |
//! | Connection | `/conexoes/{id}` |
//! | Config entry | `/config/app/{key}` |
//! | Service instance | `/services/{name}/{instance_id}` |
//! | Lock | `/locks/{resource}` |

use serde::{Deserialize, Serialize};

pub const USERS_PREFIX: &str = "/users/";
pub const PROFILES_PREFIX: &str = "/perfis/";
pub const SKILLS_PREFIX: &str = "/habilidades/";
pub const SKILL_INDEX_PREFIX: &str = "/indices/habilidade/";
pub const CONNECTIONS_PREFIX: &str = "/conexoes/";
pub const CONFIG_PREFIX: &str = "/config/app/";
pub const SERVICES_PREFIX: &str = "/services/";
pub const LOCKS_PREFIX: &str = "/locks/";

pub fn user_key(id: &str) -> String {
    format!("{}{}", USERS_PREFIX, id)
}

pub fn profile_key(id: &str) -> String {
    format!("{}{}", PROFILES_PREFIX, id)
}

pub fn skills_key(profile_id: &str) -> String {
    format!("{}{}", SKILLS_PREFIX, profile_id)
}

/// Prefix of every index entry for one skill.
pub fn skill_index_prefix(skill: &str) -> String {
    format!("{}{}/", SKILL_INDEX_PREFIX, skill)
}

pub fn skill_index_key(skill: &str, profile_id: &str) -> String {
    format!("{}{}", skill_index_prefix(skill), profile_id)
}

pub fn connection_key(id: &str) -> String {
    format!("{}{}", CONNECTIONS_PREFIX, id)
}

pub fn config_key(key: &str) -> String {
    format!("{}{}", CONFIG_PREFIX, key)
}

pub fn service_prefix(name: &str) -> String {
    format!("{}{}/", SERVICES_PREFIX, name)
}

pub fn service_key(name: &str, instance_id: &str) -> String {
    format!("{}{}", service_prefix(name), instance_id)
}

pub fn lock_key(resource: &str) -> String {
    format!("{}{}", LOCKS_PREFIX, resource)
}

/// Last path segment of a key (`/perfis/abc` → `abc`).
pub fn id_from_key<'a>(key: &'a str, prefix: &str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key)
}

/// Generates a fresh globally unique id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// RFC 3339 UTC timestamp for `created_at` / `updated_at`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Unix seconds with sub-second precision, as used by service and lock records.
pub fn now_unix_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

// -----------------------------------------------------------------------------
// Professional network records
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub summary: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Short form returned by search and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub company: String,
    pub location: String,
}

impl From<&Profile> for ProfileSummary {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            role: p.role.clone(),
            company: p.company.clone(),
            location: p.location.clone(),
        }
    }
}

/// Whitelisted, lowercased skills of one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub const ALL: [ConnectionStatus; 3] = [Self::Pending, Self::Accepted, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub profile_id_1: String,
    pub profile_id_2: String,
    pub status: ConnectionStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Connection {
    pub fn involves(&self, profile_id: &str) -> bool {
        self.profile_id_1 == profile_id || self.profile_id_2 == profile_id
    }
}

// -----------------------------------------------------------------------------
// Coordination records
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub endpoint: String,
    pub timestamp: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockRecord {
    pub holder: String,
    pub timestamp: f64,
}
