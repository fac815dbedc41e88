//! Integration test: `LinkstoreConfig::load` layering from the process environment.
//!
//! Kept as the only test in this binary because it mutates process-wide env vars.

use linkstore_core::{LinkstoreConfig, SkillLookup, StoreBackendKind};

const VARS: [(&str, &str); 6] = [
    ("LINKSTORE_CONFIG", "does/not/exist/linkstore"),
    ("LINKSTORE_STORE__BACKEND", "sled"),
    ("LINKSTORE_NETWORK__SKILL_LOOKUP", "index"),
    ("ETCD_HOST", "etcd.internal"),
    ("ETCD_PORT", "23790"),
    ("FLASK_PORT", "9000"),
];

#[test]
fn legacy_and_nested_env_vars_override_defaults() {
    std::env::remove_var("LINKSTORE_PORT");
    for (k, v) in VARS {
        std::env::set_var(k, v);
    }

    let cfg = LinkstoreConfig::load();

    for (k, _) in VARS {
        std::env::remove_var(k);
    }
    let cfg = cfg.unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store.etcd_host, "etcd.internal");
    assert_eq!(cfg.store.etcd_port, 23790);
    assert_eq!(cfg.store.etcd_endpoint(), "http://etcd.internal:23790");
    assert_eq!(cfg.store.backend, StoreBackendKind::Sled);
    assert_eq!(cfg.network.skill_lookup, SkillLookup::Index);
    assert_eq!(cfg.app_name, "linkstore");
    assert!(cfg.network.prune_skill_index_on_delete);
}
