//! Read-side views over the professional network: recommendations, skill search and the dashboard.
//!
//! Every view is computed per request from prefix scans; nothing is cached. With
//! `SkillLookup::Scan` all profiles and skill-sets are enumerated (the reverse index is
//! only written). With `SkillLookup::Index` candidates come from `/indices/habilidade/`,
//! and each candidate's skill-set is still read back so a stale index cannot add matches.

use crate::config::{NetworkConfig, SkillLookup};
use crate::error::{ServiceError, ServiceResult, StoreResult};
use crate::schema::{
    id_from_key, profile_key, Connection, ConnectionStatus, Profile, ProfileSummary, SkillSet,
    CONNECTIONS_PREFIX, PROFILES_PREFIX, SKILLS_PREFIX,
};
use crate::skills::{recognize, SkillIndex};
use crate::store::KvAdapter;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub profile: ProfileSummary,
    pub shared_skills: Vec<String>,
    pub compatibility: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub profile_id: String,
    pub skills: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillSearch {
    pub skill: String,
    pub total: usize,
    pub profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_profiles: usize,
    pub total_connections: usize,
    pub connections_by_status: BTreeMap<&'static str, usize>,
    pub top_skills: Vec<SkillCount>,
}

/// Share of the requester's skills found in the candidate, one decimal place: `"50.0%"`.
pub fn compatibility(shared: usize, requester_total: usize) -> String {
    if requester_total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", shared as f64 / requester_total as f64 * 100.0)
}

/// Skills of `mine` also present in `theirs`, in `mine` order.
pub fn shared_skills(mine: &[String], theirs: &[String]) -> Vec<String> {
    mine.iter().filter(|s| theirs.contains(s)).cloned().collect()
}

/// Counts, per skill, how many skill-sets contain it. Highest first, ties by name.
pub fn tally_skills<'a, I>(sets: I, limit: usize) -> Vec<SkillCount>
where
    I: IntoIterator<Item = &'a SkillSet>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for set in sets {
        let unique: BTreeSet<&str> = set.skills.iter().map(String::as_str).collect();
        for skill in unique {
            *counts.entry(skill).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<SkillCount> = counts
        .into_iter()
        .map(|(skill, count)| SkillCount {
            skill: skill.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    ranked.truncate(limit);
    ranked
}

#[derive(Clone)]
pub struct NetworkInsights {
    kv: KvAdapter,
    skills: SkillIndex,
    lookup: SkillLookup,
    recommendation_limit: usize,
    popular_skills_limit: usize,
}

impl NetworkInsights {
    pub fn new(kv: KvAdapter, network: &NetworkConfig) -> Self {
        Self {
            skills: SkillIndex::new(kv.clone()),
            kv,
            lookup: network.skill_lookup,
            recommendation_limit: network.recommendation_limit,
            popular_skills_limit: network.popular_skills_limit,
        }
    }

    /// All skill-sets keyed by profile id.
    async fn skill_sets(&self) -> StoreResult<HashMap<String, SkillSet>> {
        let records = self.kv.list_records::<SkillSet>(SKILLS_PREFIX).await?;
        Ok(records
            .into_iter()
            .map(|(key, set)| (id_from_key(&key, SKILLS_PREFIX).to_string(), set))
            .collect())
    }

    /// Profiles paired with their skills, in profile-id order.
    async fn scan_candidates(&self) -> StoreResult<Vec<(Profile, Vec<String>)>> {
        let profiles = self.kv.list_records::<Profile>(PROFILES_PREFIX).await?;
        let mut sets = self.skill_sets().await?;
        Ok(profiles
            .into_iter()
            .map(|(_, p)| {
                let skills = sets.remove(&p.id).map(|s| s.skills).unwrap_or_default();
                (p, skills)
            })
            .collect())
    }

    /// Profiles indexed under any of `skills`, in profile-id order. Ids whose profile is gone are skipped.
    async fn indexed_candidates(&self, skills: &[String]) -> StoreResult<Vec<(Profile, Vec<String>)>> {
        let mut ids = BTreeSet::new();
        for skill in skills {
            ids.extend(self.skills.profiles_with(skill).await?);
        }
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(profile) = self.kv.get_record::<Profile>(&profile_key(&id)).await? else {
                tracing::debug!(target: "linkstore::network", profile_id = %id, "stale index entry");
                continue;
            };
            let skills = self
                .skills
                .skill_set(&id)
                .await?
                .map(|s| s.skills)
                .unwrap_or_default();
            out.push((profile, skills));
        }
        Ok(out)
    }

    async fn candidates(&self, skills: &[String]) -> StoreResult<Vec<(Profile, Vec<String>)>> {
        match self.lookup {
            SkillLookup::Scan => self.scan_candidates().await,
            SkillLookup::Index => self.indexed_candidates(skills).await,
        }
    }

    /// Top matches by shared-skill count. The requester is never included.
    pub async fn recommend(&self, profile_id: &str) -> ServiceResult<RecommendationReport> {
        let mine = self
            .skills
            .skill_set(profile_id)
            .await?
            .map(|s| s.skills)
            .unwrap_or_default();
        if mine.is_empty() {
            return Err(ServiceError::validation("profile has no recorded skills"));
        }

        let mut ranked: Vec<Recommendation> = self
            .candidates(&mine)
            .await?
            .into_iter()
            .filter(|(p, _)| p.id != profile_id)
            .filter_map(|(p, theirs)| {
                let shared = shared_skills(&mine, &theirs);
                (!shared.is_empty()).then(|| Recommendation {
                    profile: ProfileSummary::from(&p),
                    compatibility: compatibility(shared.len(), mine.len()),
                    shared_skills: shared,
                })
            })
            .collect();
        // Stable: equal counts keep candidate order.
        ranked.sort_by(|a, b| b.shared_skills.len().cmp(&a.shared_skills.len()));
        ranked.truncate(self.recommendation_limit);

        tracing::info!(
            target: "linkstore::network",
            profile_id = profile_id,
            lookup = ?self.lookup,
            matches = ranked.len(),
            "recommendations computed"
        );
        Ok(RecommendationReport {
            profile_id: profile_id.to_string(),
            skills: mine,
            recommendations: ranked,
        })
    }

    /// Profiles whose skill-set contains `skill` (must be whitelisted).
    pub async fn search_by_skill(&self, skill: &str) -> ServiceResult<SkillSearch> {
        let skill = recognize(skill).ok_or_else(|| ServiceError::validation("invalid skill"))?;
        let profiles: Vec<ProfileSummary> = self
            .candidates(std::slice::from_ref(&skill))
            .await?
            .into_iter()
            .filter(|(_, skills)| skills.contains(&skill))
            .map(|(p, _)| ProfileSummary::from(&p))
            .collect();
        Ok(SkillSearch {
            total: profiles.len(),
            skill,
            profiles,
        })
    }

    pub async fn dashboard(&self) -> ServiceResult<Dashboard> {
        let total_profiles = self.kv.list_by_prefix(PROFILES_PREFIX).await?.len();

        let connections = self.kv.list_records::<Connection>(CONNECTIONS_PREFIX).await?;
        let mut connections_by_status: BTreeMap<&'static str, usize> = ConnectionStatus::ALL
            .iter()
            .map(|s| (s.as_str(), 0))
            .collect();
        for (_, c) in &connections {
            *connections_by_status.entry(c.status.as_str()).or_insert(0) += 1;
        }

        let sets = self.skill_sets().await?;
        let top_skills = tally_skills(sets.values(), self.popular_skills_limit);

        Ok(Dashboard {
            total_profiles,
            total_connections: connections.len(),
            connections_by_status,
            top_skills,
        })
    }
}
