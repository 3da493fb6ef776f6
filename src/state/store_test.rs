use super::*;

fn alice() -> Session {
    Session { credential: Credential::encode("alice", "pw1"), user: SessionUser::resolved("alice", false) }
}

fn admin() -> Session {
    let mut user = SessionUser::resolved("root", true);
    user.email = Some("root@example.test".to_owned());
    Session { credential: Credential::encode("root", "toor"), user }
}

// =============================================================================
// FileSessionStore
// =============================================================================

#[test]
fn file_load_returns_none_when_nothing_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    assert!(store.load().is_none());
}

#[test]
fn file_save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("nested"));
    store.save(&admin()).unwrap();
    assert_eq!(store.load(), Some(admin()));
}

#[test]
fn file_save_overwrites_previous_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&alice()).unwrap();
    store.save(&admin()).unwrap();
    assert_eq!(store.load(), Some(admin()));
    assert!(!dir.path().join("session.json.tmp").exists());
}

#[test]
fn file_document_uses_fixed_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&alice()).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["authToken"], "YWxpY2U6cHcx");
    assert_eq!(value["user"]["userName"], "alice");
    assert_eq!(value["user"]["roles"], serde_json::json!(["USER"]));
}

#[test]
fn file_clear_removes_session_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&alice()).unwrap();
    store.clear().unwrap();
    assert!(store.load().is_none());
    store.clear().unwrap();
    assert!(store.load().is_none());
}

#[test]
fn file_corrupt_document_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load().is_none());
}

#[cfg(unix)]
#[test]
fn file_is_private_to_owner() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&alice()).unwrap();
    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn file_save_reports_failing_operation_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    let store = FileSessionStore::new(&blocker);

    let err = store.save(&alice()).unwrap_err();
    assert!(matches!(&err, StoreError::Io { op: "create", path, .. } if *path == blocker));
    assert!(store.load().is_none());
}

#[test]
fn empty_document_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    fs::write(store.path(), EMPTY_DOCUMENT).unwrap();
    assert!(store.load().is_none());
}

#[cfg(unix)]
#[test]
fn file_clear_in_read_only_dir_still_forgets_session() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());
    store.save(&alice()).unwrap();

    fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o500)).unwrap();
    let cleared = store.clear();
    let reloaded = store.load();
    fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o700)).unwrap();

    cleared.unwrap();
    assert!(reloaded.is_none());
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[test]
fn memory_round_trip_and_clear() {
    let store = MemorySessionStore::new();
    assert!(store.load().is_none());
    store.save(&alice()).unwrap();
    assert_eq!(store.load(), Some(alice()));
    store.clear().unwrap();
    assert!(store.load().is_none());
    assert!(store.is_empty());
}

#[test]
fn memory_missing_user_key_loads_as_none() {
    let store = MemorySessionStore::with_raw(r#"{ "authToken": "YWxpY2U6cHcx" }"#);
    assert!(store.load().is_none());
}

#[test]
fn memory_missing_token_key_loads_as_none() {
    let store = MemorySessionStore::with_raw(r#"{ "user": { "userName": "alice", "roles": ["USER"] } }"#);
    assert!(store.load().is_none());
}

#[test]
fn memory_wrong_shape_loads_as_none() {
    let store = MemorySessionStore::with_raw(r#"{ "authToken": 7, "user": "alice" }"#);
    assert!(store.load().is_none());
}
