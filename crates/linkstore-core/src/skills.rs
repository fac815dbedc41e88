//! Skill whitelist, normalization and the skill → profile reverse index.

use crate::error::StoreResult;
use crate::schema::{id_from_key, skill_index_key, skill_index_prefix, skills_key, SkillSet};
use crate::store::{KvAdapter, StoredValue};
use serde_json::Value;

/// Recognized skill tags. Anything else is dropped at write time.
pub const SKILL_WHITELIST: &[&str] = &[
    "python",
    "java",
    "javascript",
    "typescript",
    "rust",
    "go",
    "c++",
    "c#",
    "sql",
    "nosql",
    "docker",
    "kubernetes",
    "aws",
    "azure",
    "gcp",
    "linux",
    "git",
    "react",
    "node.js",
    "django",
    "flask",
    "machine learning",
    "data science",
    "devops",
];

/// Lowercased, trimmed form if the tag is whitelisted.
pub fn recognize(skill: &str) -> Option<String> {
    let normalized = skill.trim().to_lowercase();
    SKILL_WHITELIST
        .contains(&normalized.as_str())
        .then_some(normalized)
}

/// Keeps whitelisted skills (case-insensitive), lowercased, first occurrence order, no duplicates.
pub fn normalize_skills<I, S>(input: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for skill in input {
        if let Some(s) = recognize(skill.as_ref()) {
            if !out.contains(&s) {
                out.push(s);
            }
        }
    }
    out
}

/// Reads and writes skill-sets and their reverse-index entries.
#[derive(Clone)]
pub struct SkillIndex {
    kv: KvAdapter,
}

impl SkillIndex {
    pub fn new(kv: KvAdapter) -> Self {
        Self { kv }
    }

    /// Skill-set of a profile, `None` when never recorded.
    pub async fn skill_set(&self, profile_id: &str) -> StoreResult<Option<SkillSet>> {
        self.kv.get_record(&skills_key(profile_id)).await
    }

    /// Writes the skill-set, then one index entry per skill. Not transactional.
    pub async fn record(&self, profile_id: &str, skills: &[String]) -> StoreResult<()> {
        let set = SkillSet {
            skills: skills.to_vec(),
        };
        self.kv.put_record(&skills_key(profile_id), &set).await?;
        for skill in skills {
            self.kv
                .put(
                    &skill_index_key(skill, profile_id),
                    &Value::String(profile_id.to_string()),
                )
                .await?;
        }
        tracing::info!(
            target: "linkstore::network",
            profile_id = profile_id,
            skills = skills.len(),
            "skill-set recorded"
        );
        Ok(())
    }

    /// Replaces a skill-set and drops index entries for skills no longer present.
    pub async fn replace(&self, profile_id: &str, skills: &[String]) -> StoreResult<()> {
        if let Some(previous) = self.skill_set(profile_id).await? {
            let stale: Vec<String> = previous
                .skills
                .into_iter()
                .filter(|s| !skills.contains(s))
                .collect();
            self.remove_index_entries(profile_id, &stale).await?;
        }
        self.record(profile_id, skills).await
    }

    /// Removes the skill-set. Index entries are removed too when `prune_index` is set.
    pub async fn remove(&self, profile_id: &str, prune_index: bool) -> StoreResult<()> {
        let previous = self.skill_set(profile_id).await?;
        self.kv.delete(&skills_key(profile_id)).await?;
        match previous {
            Some(set) if prune_index => self.remove_index_entries(profile_id, &set.skills).await,
            Some(set) => {
                tracing::warn!(
                    target: "linkstore::network",
                    profile_id = profile_id,
                    orphaned = set.skills.len(),
                    "skill index entries left in place"
                );
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn remove_index_entries(&self, profile_id: &str, skills: &[String]) -> StoreResult<()> {
        for skill in skills {
            self.kv.delete(&skill_index_key(skill, profile_id)).await?;
        }
        Ok(())
    }

    /// Profile ids indexed under `skill`.
    pub async fn profiles_with(&self, skill: &str) -> StoreResult<Vec<String>> {
        let prefix = skill_index_prefix(skill);
        let entries = self.kv.list_by_prefix(&prefix).await?;
        Ok(entries
            .into_iter()
            .map(|(key, value)| match value {
                StoredValue::Text(id) => id,
                _ => id_from_key(&key, &prefix).to_string(),
            })
            .collect())
    }
}
