use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use stremio_metafetcher::domain::{FetchedMeta, ImdbId};
use stremio_metafetcher::error::MetaError;
use stremio_metafetcher::store::{MetaStore, resolve_missing};

fn temp_store() -> (tempfile::TempDir, MetaStore) {
    let temp = tempfile::tempdir().unwrap();
    let cache_dir = Utf8PathBuf::from_path_buf(temp.path().join("metas")).unwrap();
    let store = MetaStore::new_with_paths(cache_dir, "json");
    store.ensure_cache_dir().unwrap();
    (temp, store)
}

fn meta(id: &str, raw: &str) -> FetchedMeta {
    FetchedMeta {
        id: id.parse().unwrap(),
        raw: raw.to_string(),
    }
}

#[test]
fn inventory_strips_extension() {
    let (_temp, store) = temp_store();
    let dir = store.cache_dir().as_std_path();
    fs::write(dir.join("tt001.json"), "{}").unwrap();
    fs::write(dir.join("tt002.json"), "{}").unwrap();
    fs::write(dir.join("README"), "").unwrap();

    let names = store.inventory().unwrap();

    assert_eq!(names.len(), 3);
    assert!(names.contains("tt001"));
    assert!(names.contains("tt002"));
    assert!(names.contains("README"));
}

#[test]
fn csv_against_cache_scenario() {
    let (_temp, store) = temp_store();
    fs::write(store.cache_dir().as_std_path().join("tt001.json"), "{}").unwrap();
    let ids: Vec<ImdbId> = vec!["tt001".parse().unwrap(), "tt002".parse().unwrap()];

    let missing = resolve_missing(&ids, &store.inventory().unwrap());

    assert_eq!(missing, vec!["tt002".parse::<ImdbId>().unwrap()]);
}

#[test]
fn inventory_of_missing_dir_fails() {
    let temp = tempfile::tempdir().unwrap();
    let cache_dir = Utf8PathBuf::from_path_buf(temp.path().join("nope")).unwrap();
    let store = MetaStore::new_with_paths(cache_dir, "json");

    assert_matches!(store.inventory(), Err(MetaError::CacheRead { .. }));
}

#[test]
fn writes_payload_verbatim() {
    let (_temp, store) = temp_store();

    let path = store
        .write_meta(&meta("tt002", r#"{"id":"tt002","name":"B"}"#))
        .unwrap();

    assert!(path.ends_with("metas/tt002.json"));
    let content = fs::read_to_string(path.as_std_path()).unwrap();
    assert_eq!(content, r#"{"id":"tt002","name":"B"}"#);
    let leftovers = fs::read_dir(store.cache_dir().as_std_path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[cfg(unix)]
#[test]
fn written_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_temp, store) = temp_store();
    let path = store.write_meta(&meta("tt001", "{}")).unwrap();

    let mode = fs::metadata(path.as_std_path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn rewrite_replaces_existing_file() {
    let (_temp, store) = temp_store();
    store.write_meta(&meta("tt001", r#"{"v":1}"#)).unwrap();
    let path = store.write_meta(&meta("tt001", r#"{"v":2}"#)).unwrap();

    assert_eq!(fs::read_to_string(path.as_std_path()).unwrap(), r#"{"v":2}"#);
}

#[test]
fn write_into_missing_dir_fails() {
    let temp = tempfile::tempdir().unwrap();
    let cache_dir = Utf8PathBuf::from_path_buf(temp.path().join("gone")).unwrap();
    let store = MetaStore::new_with_paths(cache_dir, "json");

    let err = store
        .write_metas(&[meta("tt001", "{}"), meta("tt002", "{}")])
        .unwrap_err();

    assert_matches!(err, MetaError::CacheWrite { path, .. } if path.ends_with("tt001.json"));
}

#[test]
fn cache_dir_creation_failure_is_a_write_error() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("blocker"), "").unwrap();
    let cache_dir = Utf8PathBuf::from_path_buf(temp.path().join("blocker/metas")).unwrap();
    let store = MetaStore::new_with_paths(cache_dir, "json");

    assert_matches!(store.ensure_cache_dir(), Err(MetaError::CacheWrite { .. }));
}
