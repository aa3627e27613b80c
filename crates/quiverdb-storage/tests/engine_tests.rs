//! Integration tests for the redb storage backend.

use quiverdb_storage::backends::RedbEngine;
use quiverdb_storage::{Cursor, StorageEngine};

#[test]
fn on_disk_roundtrip_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("engine.qdb");

    {
        let engine = RedbEngine::open(&path).expect("create");
        engine.put(b"s:", b"schema").expect("put schema");
        engine.put(b"r:1", b"record one").expect("put record");
    }

    let engine = RedbEngine::open(&path).expect("reopen");
    assert_eq!(engine.get(b"s:").expect("get"), Some(b"schema".to_vec()));
    assert_eq!(engine.get(b"r:1").expect("get"), Some(b"record one".to_vec()));
}

#[test]
fn namespaces_do_not_leak_into_each_other() {
    let engine = RedbEngine::in_memory().expect("in-memory db");
    engine.put(b"r:1", b"record").expect("put");
    engine.put(b"i:vec:0", b"partition").expect("put");
    engine.put(b"i:vec:1", b"partition").expect("put");
    engine.put(b"c:vec", b"reserved").expect("put");

    let mut cursor = engine.scan_prefix(b"i:vec:").expect("cursor");
    let mut keys = Vec::new();
    while let Some((key, _)) = cursor.next().expect("next") {
        keys.push(key);
    }
    assert_eq!(keys, vec![b"i:vec:0".to_vec(), b"i:vec:1".to_vec()]);
}

#[test]
fn large_values_roundtrip() {
    let engine = RedbEngine::in_memory().expect("in-memory db");
    // Index partitions can reach megabytes; make sure blobs pass through
    // unharmed.
    let blob: Vec<u8> = (0..2_000_000u32).map(|i| (i % 251) as u8).collect();
    engine.put(b"i:big:0", &blob).expect("put");
    assert_eq!(engine.get(b"i:big:0").expect("get"), Some(blob));
}

#[test]
fn delete_then_scan_skips_the_key() {
    let engine = RedbEngine::in_memory().expect("in-memory db");
    for i in 0..10u64 {
        engine.put(format!("r:{i}").as_bytes(), b"v").expect("put");
    }
    assert!(engine.delete(b"r:4").expect("delete"));

    let mut cursor = engine.scan_prefix(b"r:").expect("cursor");
    let mut count = 0;
    while let Some((key, _)) = cursor.next().expect("next") {
        assert_ne!(key, b"r:4".to_vec());
        count += 1;
    }
    assert_eq!(count, 9);
}
