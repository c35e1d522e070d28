//! End-to-end tests running the handler against JSON sources on disk.

use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flatdir_core::{DirectoryConfig, Error, ResultCode};
use flatdir_server::DirectoryService;
use flatdir_store::hash_password_ssha;

const BASE: &str = "dc=example,dc=com";
const PEOPLE: &str = "ou=people,dc=example,dc=com";
const GROUPS: &str = "ou=groups,dc=example,dc=com";

fn write_json(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

fn directory_data() -> serde_json::Value {
    json!({
        "users": [
            {
                "name": "u1",
                "attr": {"mail": ["u1@example.com"], "objectClass": ["posixAccount"]},
                "password": "{SSHA}uJDd0BIdJ9Z7yDCZNWdgYeb33+cBAgME"
            },
            {"name": "u2", "password": hash_password_ssha("hunter2", b"salt")},
            {"name": "u3"}
        ],
        "groups": [
            {"name": "g1", "member": ["u1", "u2"]},
            {"name": "g2", "member": ["u1"]}
        ]
    })
}

async fn open_service(dir: &tempfile::TempDir) -> (DirectoryService, PathBuf) {
    let path = write_json(dir.path(), "directory.json", &directory_data());
    let config = DirectoryConfig::new(BASE, [path.clone()]).unwrap();
    (DirectoryService::open(&config).await.unwrap(), path)
}

fn dns(entries: &[flatdir_server::Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.dn.as_str()).collect()
}

#[tokio::test]
async fn bind_and_search_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let (service, _) = open_service(&dir).await;
    let handler = service.handler();

    let bind = handler
        .bind("cn=u1,ou=people,dc=example,dc=com", "secret")
        .await;
    assert_eq!(bind.code, ResultCode::Success);

    let people = handler.search(PEOPLE, "(memberOf=g1)").await;
    assert_eq!(people.code, ResultCode::Success);
    assert_eq!(
        dns(&people.entries),
        vec![
            "cn=u1,ou=people,dc=example,dc=com",
            "cn=u2,ou=people,dc=example,dc=com"
        ]
    );

    let u1 = &people.entries[0];
    assert_eq!(u1.first("mail"), Some("u1@example.com"));
    assert_eq!(
        u1.values("objectClass").unwrap(),
        &["posixAccount", "inetOrgPerson"]
    );
    assert_eq!(
        u1.values("memberOf").unwrap(),
        &[
            "cn=g1,ou=groups,dc=example,dc=com",
            "cn=g2,ou=groups,dc=example,dc=com"
        ]
    );
    assert!(u1.values("password").is_none());

    let groups = handler.search(GROUPS, "(member=u2)").await;
    assert_eq!(groups.code, ResultCode::Success);
    assert_eq!(dns(&groups.entries), vec!["cn=g1,ou=groups,dc=example,dc=com"]);

    let foreign = handler.search("dc=other,dc=org", "(cn=u1)").await;
    assert_eq!(foreign.code, ResultCode::InsufficientAccessRights);
    assert!(foreign.entries.is_empty());
    assert!(foreign.error.is_none());
}

#[tokio::test]
async fn bind_failures() {
    let dir = tempfile::tempdir().unwrap();
    let (service, _) = open_service(&dir).await;
    let handler = service.handler();

    for (dn, password) in [
        ("cn=u1,ou=people,dc=example,dc=com", "wrong"),
        ("cn=u3,ou=people,dc=example,dc=com", ""),
        ("cn=ghost,ou=people,dc=example,dc=com", "secret"),
        ("cn=u1,dc=other,dc=org", "secret"),
        ("", ""),
    ] {
        let response = handler.bind(dn, password).await;
        assert_eq!(response.code, ResultCode::InvalidCredentials, "bind as {dn:?}");
        assert!(response.error.is_none());
    }

    let response = handler
        .bind("cn=u2,ou=people,dc=example,dc=com", "hunter2")
        .await;
    assert_eq!(response.code, ResultCode::Success);
}

#[tokio::test]
async fn anonymous_bind_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(dir.path(), "directory.json", &directory_data());
    let config = DirectoryConfig::new(BASE, [path])
        .unwrap()
        .with_anonymous_bind(true);
    let service = DirectoryService::open(&config).await.unwrap();

    assert_eq!(service.handler().bind("", "").await.code, ResultCode::Success);
}

#[tokio::test]
async fn corrupt_credential_is_operations_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(
        dir.path(),
        "directory.json",
        &json!({"users": [{"name": "u1", "password": "{SSHA}********************************"}]}),
    );
    let config = DirectoryConfig::new(BASE, [path]).unwrap();
    let service = DirectoryService::open(&config).await.unwrap();

    let response = service
        .handler()
        .bind("cn=u1,ou=people,dc=example,dc=com", "secret")
        .await;
    assert_eq!(response.code, ResultCode::OperationsError);
    assert!(matches!(
        response.error,
        Some(Error::CredentialDecode { ref user }) if user == "u1"
    ));
}

#[tokio::test]
async fn search_filters() {
    let dir = tempfile::tempdir().unwrap();
    let (service, _) = open_service(&dir).await;
    let handler = service.handler();

    let all = handler.search(PEOPLE, "(objectClass=*)").await;
    assert_eq!(all.entries.len(), 3);

    let by_cn = handler.search(PEOPLE, "(cn=u3)").await;
    assert_eq!(dns(&by_cn.entries), vec!["cn=u3,ou=people,dc=example,dc=com"]);

    let missing = handler.search(PEOPLE, "(cn=nobody)").await;
    assert_eq!(missing.code, ResultCode::Success);
    assert!(missing.entries.is_empty());

    let by_mail = handler.search(PEOPLE, "(mail=u1@example.com)").await;
    assert_eq!(dns(&by_mail.entries), vec!["cn=u1,ou=people,dc=example,dc=com"]);

    let groups_by_cn = handler.search(GROUPS, "(cn=g1)").await;
    assert_eq!(groups_by_cn.code, ResultCode::Success);
    assert!(groups_by_cn.entries.is_empty());

    let all_groups = handler.search(GROUPS, "(objectClass=*)").await;
    assert_eq!(all_groups.entries.len(), 2);

    let unsupported = handler.search(PEOPLE, "(a=b=c)").await;
    assert_eq!(unsupported.code, ResultCode::OperationsError);
    assert!(matches!(unsupported.error, Some(Error::UnsupportedFilter(_))));
}

#[tokio::test]
async fn reload_picks_up_changes_and_survives_bad_data() {
    let dir = tempfile::tempdir().unwrap();
    let (service, path) = open_service(&dir).await;
    let handler = service.handler();

    write_json(
        dir.path(),
        "directory.json",
        &json!({"users": [{"name": "u9"}], "groups": [{"name": "g9", "member": ["u9"]}]}),
    );
    service.reload().await.unwrap();

    let people = handler.search(PEOPLE, "(objectClass=*)").await;
    assert_eq!(dns(&people.entries), vec!["cn=u9,ou=people,dc=example,dc=com"]);
    assert_eq!(
        people.entries[0].first("memberOf"),
        Some("cn=g9,ou=groups,dc=example,dc=com")
    );

    std::fs::write(&path, b"{ not json").unwrap();
    let err = service.reload().await.unwrap_err();
    assert!(err.is_source_error());

    let people = handler.search(PEOPLE, "(objectClass=*)").await;
    assert_eq!(dns(&people.entries), vec!["cn=u9,ou=people,dc=example,dc=com"]);
}

#[tokio::test]
async fn later_sources_override_earlier_ones() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_json(dir.path(), "base.json", &directory_data());
    let overlay = write_json(
        dir.path(),
        "overlay.json",
        &json!({"users": [{"name": "u2", "attr": {"mail": ["new@example.com"]}}]}),
    );
    let config = DirectoryConfig::new(BASE, [base, overlay]).unwrap();
    let service = DirectoryService::open(&config).await.unwrap();
    let handler = service.handler();

    let response = handler.search(PEOPLE, "(mail=new@example.com)").await;
    assert_eq!(dns(&response.entries), vec!["cn=u2,ou=people,dc=example,dc=com"]);

    let bind = handler
        .bind("cn=u2,ou=people,dc=example,dc=com", "hunter2")
        .await;
    assert_eq!(bind.code, ResultCode::InvalidCredentials);
}

#[tokio::test]
async fn open_fails_without_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = DirectoryConfig::new(BASE, [dir.path().join("missing.json")]).unwrap();

    let err = DirectoryService::open(&config).await.unwrap_err();
    assert_eq!(err.error_code(), "SOURCE_READ");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_searches_during_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (service, _) = open_service(&dir).await;
    let service = Arc::new(service);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handler = service.handler();
        tasks.push(tokio::spawn(async move {
            for _ in 0..50 {
                let response = handler.search(PEOPLE, "(memberOf=g1)").await;
                assert_eq!(response.code, ResultCode::Success);
                assert_eq!(response.entries.len(), 2);
            }
        }));
    }
    for _ in 0..10 {
        service.reload().await.unwrap();
    }
    for task in tasks {
        task.await.unwrap();
    }
}
