#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::path::PathBuf;

use artiprobe_core::{ArtiprobeError, ErrorKind};
use artiprobe_exporter::config::ClusterMode;
use artiprobe_exporter::context::cluster::{self, ClusterIdentity};

fn sa_dir(name: &str, token: Option<&str>, namespace: Option<&str>) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("artiprobe-sa-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    if let Some(t) = token {
        std::fs::write(dir.join("token"), t).unwrap();
    }
    if let Some(ns) = namespace {
        std::fs::write(dir.join("namespace"), ns).unwrap();
    }
    dir
}

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

const IN_CLUSTER: &[(&str, &str)] = &[
    ("KUBERNETES_SERVICE_HOST", "10.0.0.1"),
    ("KUBERNETES_SERVICE_PORT", "443"),
];

#[test]
fn loads_identity_and_redacts_token() {
    let dir = sa_dir("ok", Some("s3cret-token\n"), Some("probes\n"));
    let id = ClusterIdentity::load_from(env(IN_CLUSTER), &dir).expect("identity");
    assert_eq!(id.api_host, "10.0.0.1");
    assert_eq!(id.api_port, "443");
    assert_eq!(id.namespace.as_deref(), Some("probes"));
    assert!(id.has_token());
    assert!(!format!("{id:?}").contains("s3cret"));
}

#[test]
fn missing_env_is_a_cluster_error() {
    let dir = sa_dir("noenv", Some("t"), None);
    let err = ClusterIdentity::load_from(env(&[]), &dir).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Cluster);
}

#[test]
fn missing_or_empty_token_is_a_cluster_error() {
    let dir = sa_dir("notoken", None, None);
    let err = ClusterIdentity::load_from(env(IN_CLUSTER), &dir).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Cluster);

    let dir = sa_dir("emptytoken", Some("  \n"), None);
    let err = ClusterIdentity::load_from(env(IN_CLUSTER), &dir).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Cluster);
}

#[test]
fn bootstrap_modes() {
    let fail = || Err(ArtiprobeError::Cluster("not in a cluster".into()));

    let skipped = cluster::bootstrap(ClusterMode::Disabled, || panic!("must not load")).unwrap();
    assert!(skipped.is_none());
    assert!(cluster::bootstrap(ClusterMode::Optional, fail).unwrap().is_none());

    let err = cluster::bootstrap(ClusterMode::Required, fail).expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Cluster);

    let dir = sa_dir("boot", Some("t"), None);
    let id = cluster::bootstrap(ClusterMode::Required, || {
        ClusterIdentity::load_from(env(IN_CLUSTER), &dir)
    })
    .unwrap()
    .expect("identity");
    assert!(id.namespace.is_none());
}
