//! Professional profiles under `/perfis/` with their skill-sets.

use crate::config::NetworkConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::schema::{new_id, now_rfc3339, profile_key, Profile, PROFILES_PREFIX};
use crate::skills::{normalize_skills, SkillIndex};
use crate::store::KvAdapter;
use serde::{Deserialize, Serialize};

/// Body of a create request. Only `name` is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Body of an update request. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

/// A profile together with its recorded skills.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub skills: Vec<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    kv: KvAdapter,
    skills: SkillIndex,
    prune_index_on_delete: bool,
}

impl ProfileService {
    pub fn new(kv: KvAdapter, network: &NetworkConfig) -> Self {
        Self {
            skills: SkillIndex::new(kv.clone()),
            kv,
            prune_index_on_delete: network.prune_skill_index_on_delete,
        }
    }

    /// Writes the profile, then its skill-set, then one index entry per skill.
    pub async fn create(&self, draft: ProfileDraft) -> ServiceResult<ProfileView> {
        let name = draft
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServiceError::validation("name is required"))?
            .to_string();

        let profile = Profile {
            id: new_id(),
            name,
            role: draft.role.unwrap_or_default(),
            company: draft.company.unwrap_or_default(),
            location: draft.location.unwrap_or_default(),
            summary: draft.summary.unwrap_or_default(),
            created_at: now_rfc3339(),
            updated_at: None,
        };
        self.kv.put_record(&profile_key(&profile.id), &profile).await?;

        let skills = normalize_skills(&draft.skills);
        let dropped = draft.skills.len().saturating_sub(skills.len());
        self.skills.record(&profile.id, &skills).await?;

        tracing::info!(
            target: "linkstore::network",
            id = %profile.id,
            skills = skills.len(),
            dropped,
            "profile created"
        );
        Ok(ProfileView { profile, skills })
    }

    pub async fn list(&self) -> ServiceResult<Vec<Profile>> {
        let records = self.kv.list_records::<Profile>(PROFILES_PREFIX).await?;
        Ok(records.into_iter().map(|(_, p)| p).collect())
    }

    pub async fn find(&self, id: &str) -> ServiceResult<Option<Profile>> {
        Ok(self.kv.get_record(&profile_key(id)).await?)
    }

    pub async fn require(&self, id: &str) -> ServiceResult<Profile> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("profile not found"))
    }

    pub async fn get(&self, id: &str) -> ServiceResult<ProfileView> {
        let profile = self.require(id).await?;
        let skills = self
            .skills
            .skill_set(id)
            .await?
            .map(|s| s.skills)
            .unwrap_or_default();
        Ok(ProfileView { profile, skills })
    }

    /// Merges supplied fields over the stored profile and stamps `updated_at`.
    /// Supplying `skills` rewrites the skill-set and its index entries.
    pub async fn update(&self, id: &str, patch: ProfilePatch) -> ServiceResult<ProfileView> {
        let mut profile = self.require(id).await?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::validation("name cannot be empty"));
            }
            profile.name = name.to_string();
        }
        if let Some(role) = patch.role {
            profile.role = role;
        }
        if let Some(company) = patch.company {
            profile.company = company;
        }
        if let Some(location) = patch.location {
            profile.location = location;
        }
        if let Some(summary) = patch.summary {
            profile.summary = summary;
        }
        profile.updated_at = Some(now_rfc3339());
        self.kv.put_record(&profile_key(id), &profile).await?;

        let skills = match patch.skills {
            Some(raw) => {
                let skills = normalize_skills(&raw);
                self.skills.replace(id, &skills).await?;
                skills
            }
            None => self
                .skills
                .skill_set(id)
                .await?
                .map(|s| s.skills)
                .unwrap_or_default(),
        };

        tracing::info!(target: "linkstore::network", id = id, "profile updated");
        Ok(ProfileView { profile, skills })
    }

    /// Removes the profile and its skill-set (and index entries when pruning is enabled).
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let key = profile_key(id);
        if !self.kv.exists(&key).await? {
            return Err(ServiceError::not_found("profile not found"));
        }
        self.kv.delete(&key).await?;
        self.skills.remove(id, self.prune_index_on_delete).await?;
        tracing::info!(target: "linkstore::network", id = id, "profile deleted");
        Ok(())
    }
}
