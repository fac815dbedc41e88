//! Integration test: locks, service registry and configuration entries.

use linkstore_core::{ConfigEntries, KvAdapter, LockManager, ServiceError, ServiceRegistry, SledBackend};
use serde_json::json;
use std::sync::Arc;

fn open(dir: &tempfile::TempDir) -> KvAdapter {
    KvAdapter::new(Arc::new(SledBackend::open(dir.path()).unwrap()))
}

#[tokio::test]
async fn held_lock_conflicts_without_overwriting_holder() {
    let dir = tempfile::tempdir().unwrap();
    let locks = LockManager::new(open(&dir));

    let acquired = locks.acquire("nightly-report", Some("worker-1")).await.unwrap();
    assert_eq!(acquired.holder, "worker-1");

    match locks.acquire("nightly-report", Some("worker-2")).await {
        Err(ServiceError::Conflict { holder, .. }) => assert_eq!(holder.as_deref(), Some("worker-1")),
        other => panic!("expected conflict, got {:?}", other.map(|r| r.holder)),
    }

    let current = locks.inspect("nightly-report").await.unwrap();
    assert_eq!(current.as_object().unwrap()["holder"], json!("worker-1"));
}

#[tokio::test]
async fn release_always_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let locks = LockManager::new(open(&dir));

    locks.release("never-taken").await.unwrap();

    locks.acquire("job", None).await.unwrap();
    locks.release("job").await.unwrap();
    locks.release("job").await.unwrap();
    assert!(matches!(locks.inspect("job").await, Err(ServiceError::NotFound(_))));

    let again = locks.acquire("job", Some("worker-3")).await.unwrap();
    assert_eq!(again.holder, "worker-3");
}

#[tokio::test]
async fn anonymous_holder_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let locks = LockManager::new(open(&dir));
    assert_eq!(locks.acquire("r", Some("   ")).await.unwrap().holder, "unknown");
}

#[tokio::test]
async fn registered_instances_are_listed_by_service_name() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ServiceRegistry::new(open(&dir));

    let k1 = registry.register(Some("billing"), Some("http://10.0.0.1:8080")).await.unwrap();
    registry.register(Some("billing"), Some("http://10.0.0.2:8080")).await.unwrap();
    registry.register(Some("billing-v2"), Some("http://10.0.0.3:8080")).await.unwrap();
    assert!(k1.starts_with("/services/billing/"));

    let instances = registry.list("billing").await.unwrap();
    assert_eq!(instances.len(), 2);
    assert!(instances.iter().all(|i| i["status"] == json!("active")));

    let instance_id = k1.rsplit('/').next().unwrap();
    registry.deregister("billing", instance_id).await.unwrap();
    assert_eq!(registry.list("billing").await.unwrap().len(), 1);
    assert!(matches!(
        registry.deregister("billing", instance_id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn registration_requires_name_and_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ServiceRegistry::new(open(&dir));

    for (name, endpoint) in [(None, Some("http://x")), (Some("svc"), None), (Some(""), Some("http://x"))] {
        let err = registry.register(name, endpoint).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
    assert!(registry.list("svc").await.unwrap().is_empty());
}

#[tokio::test]
async fn registrar_is_not_a_usable_service_name() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ServiceRegistry::new(open(&dir));

    let err = registry.register(Some("registrar"), Some("http://x")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(registry.list("registrar").await.unwrap().is_empty());
}

#[tokio::test]
async fn config_values_round_trip_as_text_or_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigEntries::new(open(&dir));

    assert!(matches!(config.get("theme").await, Err(ServiceError::NotFound(_))));

    config.set("theme", Some(json!("dark"))).await.unwrap();
    config.set("limits", Some(json!({"max": 10}))).await.unwrap();
    config.set("empty", None).await.unwrap();

    assert_eq!(config.get("theme").await.unwrap().into_json(), json!("dark"));
    assert_eq!(config.get("limits").await.unwrap().into_json(), json!({"max": 10}));
    assert_eq!(config.get("empty").await.unwrap().into_json(), json!(""));
}
