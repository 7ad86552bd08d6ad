use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use stremio_metafetcher::catalog::{discover_csv_files, extract_ids, read_rows};
use stremio_metafetcher::error::MetaError;

#[test]
fn reads_quoted_csv_export() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("watchlist.csv")).unwrap();
    fs::write(
        path.as_std_path(),
        "Position,\"Title, Original\",IMDb ID\n1,\"Léon, the Professional\",tt0110413\n2,Heat,tt0113277\n",
    )
    .unwrap();

    let rows = read_rows(&path).unwrap();
    let ids = extract_ids(&rows, "IMDb ID").unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][1], "Léon, the Professional");
    assert_eq!(ids[0].as_str(), "tt0110413");
    assert_eq!(ids[1].as_str(), "tt0113277");
}

#[test]
fn short_row_in_file_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("broken.csv")).unwrap();
    fs::write(path.as_std_path(), "Title,IMDb ID\nA,tt001\nB\n").unwrap();

    let rows = read_rows(&path).unwrap();

    assert_matches!(
        extract_ids(&rows, "IMDb ID"),
        Err(MetaError::ShortRow { row: 3, .. })
    );
}

#[test]
fn empty_file_has_no_header() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("empty.csv")).unwrap();
    fs::write(path.as_std_path(), "").unwrap();

    let rows = read_rows(&path).unwrap();

    assert_matches!(extract_ids(&rows, "IMDb ID"), Err(MetaError::EmptyCsv));
}

#[test]
fn unreadable_csv_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("absent.csv")).unwrap();

    assert_matches!(read_rows(&path), Err(MetaError::CsvRead { .. }));
}

#[test]
fn discovery_is_flat_and_sorted() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    fs::write(dir.join("b.csv").as_std_path(), "").unwrap();
    fs::write(dir.join("a.csv").as_std_path(), "").unwrap();
    fs::write(dir.join("c.csv.bak").as_std_path(), "").unwrap();
    fs::create_dir_all(dir.join("nested.csv").as_std_path()).unwrap();
    fs::create_dir_all(dir.join("sub").as_std_path()).unwrap();
    fs::write(dir.join("sub/d.csv").as_std_path(), "").unwrap();

    let files = discover_csv_files(&dir).unwrap();

    let names: Vec<&str> = files.iter().filter_map(|path| path.file_name()).collect();
    assert_eq!(names, vec!["a.csv", "b.csv"]);
}
