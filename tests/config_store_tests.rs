// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed config store tests.

use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;
use tesla_session::store::{keys, ConfigStore, FileConfigStore, MemoryConfigStore, StoreError};

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = FileConfigStore::open(dir.path().join("tesla.properties"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_get_reads_values() {
    let file = config_file(
        "# Tesla account\n\
         ACCESS_TOKEN=abc.def\n\
         REFRESH_TOKEN = r1 \n\
         VIN=\n\
         HOME_LATITUDE=37.4\n",
    );
    let store = FileConfigStore::open(file.path()).unwrap();

    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("abc.def"));
    assert_eq!(store.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("r1"));
    assert_eq!(store.get(keys::VIN).unwrap(), None, "empty value reads as absent");
    assert_eq!(store.get(keys::ID_S).unwrap(), None);
    assert_eq!(store.get_f64(keys::HOME_LATITUDE).unwrap(), Some(37.4));
}

#[test]
fn test_update_replaces_in_place_and_keeps_other_lines() {
    let file = config_file(
        "# Tesla account\n\
         ACCESS_TOKEN=old-access\n\
         \n\
         ! legacy comment\n\
         REFRESH_TOKEN=old-refresh\n\
         VIN=5YJ3E1EA7KF000001\n",
    );
    let store = FileConfigStore::open(file.path()).unwrap();

    store
        .update(&[
            (keys::REFRESH_TOKEN, "new-refresh".to_string()),
            (keys::ACCESS_TOKEN, "new-access".to_string()),
        ])
        .unwrap();

    let contents = fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        contents,
        "# Tesla account\n\
         ACCESS_TOKEN=new-access\n\
         \n\
         ! legacy comment\n\
         REFRESH_TOKEN=new-refresh\n\
         VIN=5YJ3E1EA7KF000001\n"
    );
}

#[test]
fn test_update_appends_missing_keys() {
    let file = config_file("ACCESS_TOKEN=a\nREFRESH_TOKEN=r\n");
    let store = FileConfigStore::open(file.path()).unwrap();

    store
        .update(&[
            (keys::HOME_LATITUDE, "52.52".to_string()),
            (keys::HOME_LONGITUDE, "13.405".to_string()),
        ])
        .unwrap();

    let contents = fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        contents,
        "ACCESS_TOKEN=a\nREFRESH_TOKEN=r\nHOME_LATITUDE=52.52\nHOME_LONGITUDE=13.405\n"
    );
    assert_eq!(store.get_f64(keys::HOME_LONGITUDE).unwrap(), Some(13.405));
}

#[test]
fn test_update_keeps_crlf_line_endings() {
    let file = config_file("# Tesla\r\nACCESS_TOKEN=old\r\nVIN=5YJ3\r\n");
    let store = FileConfigStore::open(file.path()).unwrap();

    store
        .update(&[
            (keys::ACCESS_TOKEN, "new".to_string()),
            (keys::ID_S, "42".to_string()),
        ])
        .unwrap();

    let contents = fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        contents,
        "# Tesla\r\nACCESS_TOKEN=new\r\nVIN=5YJ3\r\nID_S=42\r\n"
    );
    assert_eq!(store.get(keys::VIN).unwrap().as_deref(), Some("5YJ3"));
}

#[test]
fn test_update_without_trailing_newline() {
    let file = config_file("VIN=5YJ3\nACCESS_TOKEN=old");
    let store = FileConfigStore::open(file.path()).unwrap();

    store.update(&[(keys::ACCESS_TOKEN, "new".to_string())]).unwrap();
    assert_eq!(
        fs::read_to_string(file.path()).unwrap(),
        "VIN=5YJ3\nACCESS_TOKEN=new"
    );

    store.update(&[(keys::ID_S, "42".to_string())]).unwrap();
    assert_eq!(
        fs::read_to_string(file.path()).unwrap(),
        "VIN=5YJ3\nACCESS_TOKEN=new\nID_S=42\n"
    );
}

#[test]
fn test_update_ignores_commented_key() {
    let file = config_file("# VIN=old\n");
    let store = FileConfigStore::open(file.path()).unwrap();

    store.update(&[(keys::VIN, "new".to_string())]).unwrap();

    let contents = fs::read_to_string(file.path()).unwrap();
    assert_eq!(contents, "# VIN=old\nVIN=new\n");
}

#[test]
fn test_external_edits_are_picked_up() {
    let file = config_file("ID_S=1\n");
    let store = FileConfigStore::open(file.path()).unwrap();
    assert_eq!(store.get(keys::ID_S).unwrap().as_deref(), Some("1"));

    fs::write(file.path(), "ID_S=2\n").unwrap();
    assert_eq!(store.get(keys::ID_S).unwrap().as_deref(), Some("2"));
}

#[test]
fn test_memory_store_round_trip() {
    let store = MemoryConfigStore::new();
    assert_eq!(store.get(keys::VIN).unwrap(), None);

    store.update(&[(keys::VIN, "5YJ3".to_string())]).unwrap();
    assert_eq!(store.get(keys::VIN).unwrap().as_deref(), Some("5YJ3"));

    store.update(&[(keys::HOME_LATITUDE, "not a number".to_string())]).unwrap();
    assert_eq!(store.get_f64(keys::HOME_LATITUDE).unwrap(), None);
}
