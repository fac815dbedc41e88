//! Linkstore core: key-prefix data access over a distributed key-value store, and the
//! user, platform and professional-network services built on it.
//!
//! Every service holds a [`KvAdapter`] and nothing else that is shared; state lives only
//! in the store. The gateway crate wires these services behind HTTP routes.

pub mod config;
pub mod connections;
pub mod discovery;
pub mod error;
pub mod insights;
pub mod locks;
pub mod profiles;
pub mod schema;
pub mod settings;
pub mod skills;
pub mod store;
pub mod users;

pub use config::{LinkstoreConfig, NetworkConfig, SkillLookup, StoreBackendKind, StoreConfig};
pub use connections::{ConnectionRequest, ConnectionService};
pub use discovery::ServiceRegistry;
pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use insights::{Dashboard, NetworkInsights, Recommendation, RecommendationReport, SkillCount, SkillSearch};
pub use locks::LockManager;
pub use profiles::{ProfileDraft, ProfilePatch, ProfileService, ProfileView};
pub use settings::ConfigEntries;
pub use skills::{normalize_skills, SkillIndex, SKILL_WHITELIST};
pub use store::{open_backend, EtcdBackend, KvAdapter, KvBackend, SledBackend, StoredValue};
pub use users::{CreatedUser, UserDirectory};
