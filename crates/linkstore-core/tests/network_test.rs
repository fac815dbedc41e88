//! Integration test: profiles, skill index, recommendations, connections and the dashboard.
//!
//! Every scenario runs against a sled directory; lookup-mode tests build the same
//! network twice and compare results.

use linkstore_core::schema::{skill_index_key, skill_index_prefix};
use linkstore_core::{
    ConnectionRequest, ConnectionService, KvAdapter, NetworkConfig, NetworkInsights, ProfileDraft,
    ProfilePatch, ProfileService, ServiceError, SkillLookup, SledBackend,
};
use std::sync::Arc;

struct Network {
    kv: KvAdapter,
    profiles: ProfileService,
    connections: ConnectionService,
    insights: NetworkInsights,
}

fn network(dir: &tempfile::TempDir, config: NetworkConfig) -> Network {
    let kv = KvAdapter::new(Arc::new(SledBackend::open(dir.path()).unwrap()));
    Network {
        profiles: ProfileService::new(kv.clone(), &config),
        connections: ConnectionService::new(kv.clone()),
        insights: NetworkInsights::new(kv.clone(), &config),
        kv,
    }
}

fn draft(name: &str, skills: &[&str]) -> ProfileDraft {
    ProfileDraft {
        name: Some(name.to_string()),
        role: Some("Engineer".to_string()),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

async fn add(net: &Network, name: &str, skills: &[&str]) -> String {
    net.profiles.create(draft(name, skills)).await.unwrap().profile.id
}

#[tokio::test]
async fn unrecognized_skills_are_dropped_and_case_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());

    let view = net
        .profiles
        .create(draft("Ana", &["Python", "cobol", "DOCKER"]))
        .await
        .unwrap();
    assert_eq!(view.skills, vec!["python", "docker"]);

    let stored = net.profiles.get(&view.profile.id).await.unwrap();
    assert_eq!(stored.skills, vec!["python", "docker"]);
    assert!(net.kv.exists(&skill_index_key("python", &view.profile.id)).await.unwrap());
    assert!(net.kv.exists(&skill_index_key("docker", &view.profile.id)).await.unwrap());
}

#[tokio::test]
async fn profile_requires_name() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());

    let err = net.profiles.create(ProfileDraft::default()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(net.profiles.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_preserves_unsupplied_fields() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let id = add(&net, "Ana", &["rust", "go"]).await;

    let patch = ProfilePatch {
        company: Some("Acme".to_string()),
        ..Default::default()
    };
    let updated = net.profiles.update(&id, patch).await.unwrap();
    assert_eq!(updated.profile.name, "Ana");
    assert_eq!(updated.profile.role, "Engineer");
    assert_eq!(updated.profile.company, "Acme");
    assert!(updated.profile.updated_at.is_some());
    assert_eq!(updated.skills, vec!["rust", "go"]);

    let patch = ProfilePatch {
        skills: Some(vec!["Go".to_string(), "AWS".to_string()]),
        ..Default::default()
    };
    let updated = net.profiles.update(&id, patch).await.unwrap();
    assert_eq!(updated.skills, vec!["go", "aws"]);
    assert_eq!(updated.profile.company, "Acme");
    assert!(!net.kv.exists(&skill_index_key("rust", &id)).await.unwrap());
    assert!(net.kv.exists(&skill_index_key("aws", &id)).await.unwrap());

    let err = net.profiles.update("missing", ProfilePatch::default()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn delete_prunes_index_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let id = add(&net, "Ana", &["python", "sql"]).await;

    net.profiles.delete(&id).await.unwrap();

    assert!(matches!(net.profiles.get(&id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(net.profiles.delete(&id).await, Err(ServiceError::NotFound(_))));
    assert!(net.kv.list_by_prefix(&skill_index_prefix("python")).await.unwrap().is_empty());
    assert!(net.kv.list_by_prefix(&skill_index_prefix("sql")).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_without_pruning_leaves_index_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = NetworkConfig {
        prune_skill_index_on_delete: false,
        ..Default::default()
    };
    let net = network(&dir, config);
    let id = add(&net, "Ana", &["python"]).await;

    net.profiles.delete(&id).await.unwrap();
    assert!(net.kv.exists(&skill_index_key("python", &id)).await.unwrap());
}

#[tokio::test]
async fn half_overlap_recommendation_is_fifty_percent() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let me = add(&net, "Ana", &["python", "docker"]).await;
    let other = add(&net, "Bruno", &["python", "aws"]).await;
    add(&net, "Carla", &["java"]).await;

    let report = net.insights.recommend(&me).await.unwrap();
    assert_eq!(report.skills, vec!["python", "docker"]);
    assert_eq!(report.recommendations.len(), 1);
    let rec = &report.recommendations[0];
    assert_eq!(rec.profile.id, other);
    assert_eq!(rec.shared_skills, vec!["python"]);
    assert_eq!(rec.compatibility, "50.0%");
}

#[tokio::test]
async fn recommendations_exclude_self_and_are_capped_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let me = add(&net, "Ana", &["python", "docker", "aws", "sql"]).await;
    add(&net, "Twin", &["python", "docker", "aws", "sql"]).await;
    for i in 0..4 {
        add(&net, &format!("One {}", i), &["sql"]).await;
    }
    add(&net, "Two", &["python", "aws"]).await;
    add(&net, "Three", &["docker", "aws", "sql"]).await;

    let report = net.insights.recommend(&me).await.unwrap();
    let recs = &report.recommendations;
    assert_eq!(recs.len(), 5);
    assert!(recs.iter().all(|r| r.profile.id != me));
    let counts: Vec<usize> = recs.iter().map(|r| r.shared_skills.len()).collect();
    assert_eq!(&counts[..3], &[4, 3, 2]);
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(recs[0].compatibility, "100.0%");
    assert_eq!(recs[1].compatibility, "75.0%");
}

#[tokio::test]
async fn recommending_without_skills_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let id = add(&net, "Ana", &["cobol"]).await;

    assert!(matches!(net.insights.recommend(&id).await, Err(ServiceError::Validation(_))));
    assert!(matches!(
        net.insights.recommend("missing").await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn search_rejects_unknown_skill() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let err = net.insights.search_by_skill("cobol").await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

async fn populate(net: &Network) -> Vec<String> {
    vec![
        add(net, "Ana", &["python", "docker"]).await,
        add(net, "Bruno", &["Python", "aws"]).await,
        add(net, "Carla", &["java", "docker"]).await,
        add(net, "Davi", &["rust"]).await,
    ]
}

#[tokio::test]
async fn index_and_scan_lookups_agree() {
    let scan_dir = tempfile::tempdir().unwrap();
    let index_dir = tempfile::tempdir().unwrap();
    let scan = network(&scan_dir, NetworkConfig::default());
    let index = network(
        &index_dir,
        NetworkConfig {
            skill_lookup: SkillLookup::Index,
            ..Default::default()
        },
    );
    let scan_ids = populate(&scan).await;
    let index_ids = populate(&index).await;

    for skill in ["python", "DOCKER", "rust", "go"] {
        let a = scan.insights.search_by_skill(skill).await.unwrap();
        let b = index.insights.search_by_skill(skill).await.unwrap();
        let names = |s: &linkstore_core::SkillSearch| {
            let mut n: Vec<String> = s.profiles.iter().map(|p| p.name.clone()).collect();
            n.sort();
            n
        };
        assert_eq!(a.skill, b.skill);
        assert_eq!(a.total, b.total);
        assert_eq!(names(&a), names(&b));
    }

    let a = scan.insights.recommend(&scan_ids[0]).await.unwrap();
    let b = index.insights.recommend(&index_ids[0]).await.unwrap();
    let summary = |r: &linkstore_core::RecommendationReport| {
        let mut v: Vec<(String, String)> = r
            .recommendations
            .iter()
            .map(|x| (x.profile.name.clone(), x.compatibility.clone()))
            .collect();
        v.sort();
        v
    };
    assert_eq!(summary(&a), summary(&b));
    assert_eq!(summary(&a).len(), 2);
}

#[tokio::test]
async fn index_lookup_ignores_entries_of_deleted_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(
        &dir,
        NetworkConfig {
            skill_lookup: SkillLookup::Index,
            prune_skill_index_on_delete: false,
            ..Default::default()
        },
    );
    let gone = add(&net, "Gone", &["python"]).await;
    add(&net, "Here", &["python"]).await;
    net.profiles.delete(&gone).await.unwrap();

    let found = net.insights.search_by_skill("python").await.unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.profiles[0].name, "Here");
}

#[tokio::test]
async fn connections_validate_both_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let a = add(&net, "Ana", &[]).await;
    let b = add(&net, "Bruno", &[]).await;

    let req = |p1: Option<&str>, p2: Option<&str>| ConnectionRequest {
        profile_id_1: p1.map(str::to_string),
        profile_id_2: p2.map(str::to_string),
        status: None,
    };

    let missing_field = net.connections.create(req(Some(&a), None)).await.unwrap_err();
    assert!(matches!(missing_field, ServiceError::Validation(_)));
    let same = net.connections.create(req(Some(&a), Some(&a))).await.unwrap_err();
    assert!(matches!(same, ServiceError::Validation(_)));
    let unknown = net.connections.create(req(Some(&a), Some("nobody"))).await.unwrap_err();
    assert!(matches!(unknown, ServiceError::NotFound(_)));

    let created = net.connections.create(req(Some(&a), Some(&b))).await.unwrap();
    assert_eq!(created.status.as_str(), "pending");
    assert_eq!(net.connections.for_profile(&b).await.unwrap().len(), 1);

    let updated = net
        .connections
        .update_status(&created.id, Some("accepted"))
        .await
        .unwrap();
    assert_eq!(updated.status.as_str(), "accepted");
    let bad = net.connections.update_status(&created.id, Some("maybe")).await.unwrap_err();
    assert!(matches!(bad, ServiceError::Validation(_)));

    net.connections.delete(&created.id).await.unwrap();
    assert!(matches!(net.connections.get(&created.id).await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn dashboard_counts_profiles_connections_and_skills() {
    let dir = tempfile::tempdir().unwrap();
    let net = network(&dir, NetworkConfig::default());
    let ids = populate(&net).await;

    let conn = |p1: &str, p2: &str, status: Option<&str>| ConnectionRequest {
        profile_id_1: Some(p1.to_string()),
        profile_id_2: Some(p2.to_string()),
        status: status.map(str::to_string),
    };
    net.connections.create(conn(&ids[0], &ids[1], None)).await.unwrap();
    net.connections.create(conn(&ids[1], &ids[2], Some("accepted"))).await.unwrap();
    net.connections.create(conn(&ids[0], &ids[1], Some("accepted"))).await.unwrap();

    let dash = net.insights.dashboard().await.unwrap();
    assert_eq!(dash.total_profiles, 4);
    assert_eq!(dash.total_connections, 3);
    assert_eq!(dash.connections_by_status["pending"], 1);
    assert_eq!(dash.connections_by_status["accepted"], 2);
    assert_eq!(dash.connections_by_status["rejected"], 0);

    let top: Vec<(&str, usize)> = dash
        .top_skills
        .iter()
        .map(|s| (s.skill.as_str(), s.count))
        .collect();
    assert_eq!(
        top,
        vec![("docker", 2), ("python", 2), ("aws", 1), ("java", 1), ("rust", 1)]
    );
}
