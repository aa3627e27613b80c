//! Exact full-scan behavior.

use quiverdb::{Database, FilterOp, Query, Record, ScalarType, Schema};

/// Two unindexed vector fields plus an int scalar.
fn db_with_multi_vectors() -> Database {
    let schema = Schema::new()
        .add_vector_field("v1", 3, 0)
        .expect("v1 field")
        .add_vector_field("v2", 4, 0)
        .expect("v2 field")
        .add_scalar_field("idx", ScalarType::Int)
        .expect("idx field");
    let mut db = Database::in_memory(schema).expect("create db");

    for i in 0..10u64 {
        let f = i as f32;
        let record = Record::new(i)
            .with_scalar(i as i64)
            .with_vector(vec![1.0 * f, 3.0 * f, 5.0 * f])
            .with_vector(vec![1.0 * f, 3.0 * f, 5.0 * f, 7.0 * f]);
        db.put_record(i, record).expect("put");
    }
    db
}

fn l2sq(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[test]
fn weighted_multi_vector_top3_matches_brute_force() {
    let db = db_with_multi_vectors();
    let t1 = vec![2.0, 4.0, 6.0];
    let t2 = vec![2.0, 4.0, 6.0, 8.0];

    let query = Query::new()
        .with_limit(3)
        .add_weighted_vector("v1", t1.clone(), 0.4)
        .add_weighted_vector("v2", t2.clone(), 0.6);
    let results = db.full_scan(&query).expect("full scan");

    // Independent brute-force ranking by the same weighted distance.
    let mut expected: Vec<(u64, f32)> = (0..10u64)
        .map(|i| {
            let f = i as f32;
            let p1 = [1.0 * f, 3.0 * f, 5.0 * f];
            let p2 = [1.0 * f, 3.0 * f, 5.0 * f, 7.0 * f];
            (i, 0.4 * l2sq(&t1, &p1) + 0.6 * l2sq(&t2, &p2))
        })
        .collect();
    expected.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("no NaN"));

    assert_eq!(results.len(), 3);
    for (result, (id, distance)) in results.iter().zip(&expected) {
        assert_eq!(result.id, *id);
        assert!((result.distance - distance).abs() < 1e-4);
    }
    assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn filters_are_conjunctive() {
    let db = db_with_multi_vectors();
    let query = Query::new()
        .with_limit(10)
        .add_vector("v1", vec![0.0, 0.0, 0.0])
        .add_filter("idx", FilterOp::Ge, 3i64)
        .add_filter("idx", FilterOp::Lt, 6i64);

    let results = db.full_scan(&query).expect("full scan");
    let mut ids: Vec<u64> = results.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![3, 4, 5]);
}

#[test]
fn cross_tag_filter_matches_nothing() {
    let db = db_with_multi_vectors();
    let query = Query::new()
        .with_limit(10)
        .add_vector("v1", vec![0.0, 0.0, 0.0])
        .add_filter("idx", FilterOp::Gt, 0.0f64);

    assert!(db.full_scan(&query).expect("full scan").is_empty());
}

#[test]
fn limit_zero_short_circuits() {
    let db = db_with_multi_vectors();
    let query = Query::new().with_limit(0).add_vector("v1", vec![0.0, 0.0, 0.0]);

    assert!(db.full_scan(&query).expect("full scan").is_empty());
    assert!(db.knn_search(&query, 4).expect("knn").is_empty());
    assert!(db.knn_search_iterative_merge(&query, 4, 16).expect("merge").is_empty());
    assert!(db.knn_search_vbase(&query, 4, 8).expect("vbase").is_empty());
}

#[test]
fn unflushed_records_are_visible_to_full_scan() {
    // put_record is write-back; the scan must still see records that
    // have never reached the store.
    let db = db_with_multi_vectors();
    let query = Query::new().with_limit(10).add_vector("v1", vec![0.0, 0.0, 0.0]);
    assert_eq!(db.full_scan(&query).expect("full scan").len(), 10);
}

#[test]
fn flushed_and_cached_records_are_not_double_counted() {
    let mut db = db_with_multi_vectors();
    db.flush_records().expect("flush");
    // Overwrite a flushed record so it exists in both cache and store.
    let record = Record::new(0)
        .with_scalar(0i64)
        .with_vector(vec![0.0, 0.0, 0.0])
        .with_vector(vec![0.0, 0.0, 0.0, 0.0]);
    db.put_record(0, record).expect("put");

    let query = Query::new().with_limit(20).add_vector("v1", vec![0.0, 0.0, 0.0]);
    let results = db.full_scan(&query).expect("full scan");
    assert_eq!(results.len(), 10);
    assert_eq!(results.iter().filter(|r| r.id == 0).count(), 1);
}
