// Rolling history: alignment and FIFO eviction

use kinetika::models::{DEFAULT_HISTORY_CAPACITY, RollingHistory};

#[test]
fn default_capacity_is_ten() {
    let h = RollingHistory::default();
    assert_eq!(h.capacity(), DEFAULT_HISTORY_CAPACITY);
    assert_eq!(h.capacity(), 10);
    assert!(h.is_empty());
}

#[test]
fn eleventh_push_evicts_exactly_the_first() {
    let mut h = RollingHistory::with_capacity(10);
    for i in 0..10u64 {
        h.push(i, i as f64, 100.0 - i as f64);
    }
    assert_eq!(h.timestamps(), (0..10).collect::<Vec<_>>());

    h.push(10, 10.0, 90.0);
    assert_eq!(h.len(), 10);
    assert_eq!(h.timestamps(), (1..=10).collect::<Vec<_>>());
    assert_eq!(h.speed().first(), Some(&1.0));
    assert_eq!(h.battery().last(), Some(&90.0));
}

#[test]
fn series_stay_aligned_under_churn() {
    let mut h = RollingHistory::with_capacity(4);
    for i in 0..25u64 {
        h.push(i * 1000, i as f64 * 0.5, (i % 100) as f64);
        assert!(h.is_aligned());
        assert!(h.len() <= 4);
    }
    assert_eq!(h.timestamps(), vec![21_000, 22_000, 23_000, 24_000]);
    assert_eq!(h.speed(), vec![10.5, 11.0, 11.5, 12.0]);
}

#[test]
fn capacity_three_scenario() {
    let mut h = RollingHistory::with_capacity(3);
    for (i, b) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        h.push(i as u64, 0.0, b);
    }
    assert_eq!(h.battery(), vec![10.0, 20.0, 30.0]);
    h.push(3, 0.0, 40.0);
    assert_eq!(h.battery(), vec![20.0, 30.0, 40.0]);
}

#[test]
fn zero_capacity_keeps_newest_point() {
    let mut h = RollingHistory::with_capacity(0);
    assert_eq!(h.capacity(), 1);
    h.push(1, 1.0, 1.0);
    h.push(2, 2.0, 2.0);
    assert_eq!(h.timestamps(), vec![2]);
}

#[test]
fn history_serializes_as_three_arrays() {
    let mut h = RollingHistory::with_capacity(2);
    h.push(5, 1.5, 99.0);
    let json = serde_json::to_value(&h).unwrap();
    assert_eq!(json["capacity"], 2);
    assert_eq!(json["timestamps"], serde_json::json!([5]));
    assert_eq!(json["speed"], serde_json::json!([1.5]));
    assert_eq!(json["battery"], serde_json::json!([99.0]));
}

#[test]
fn history_deserializes_when_aligned() {
    let json = r#"{"capacity":3,"timestamps":[1,2],"speed":[0.5,1.0],"battery":[90.0,89.0]}"#;
    let h: RollingHistory = serde_json::from_str(json).unwrap();
    assert_eq!(h.capacity(), 3);
    assert!(h.is_aligned());
    assert_eq!(h.battery(), vec![90.0, 89.0]);
}

#[test]
fn history_deserialize_rejects_misaligned_series() {
    let json = r#"{"capacity":5,"timestamps":[1,2,3],"speed":[1.0],"battery":[]}"#;
    let err = serde_json::from_str::<RollingHistory>(json).unwrap_err();
    assert!(err.to_string().contains("misaligned"));
}

#[test]
fn history_deserialize_rejects_zero_capacity() {
    let json = r#"{"capacity":0,"timestamps":[],"speed":[],"battery":[]}"#;
    assert!(serde_json::from_str::<RollingHistory>(json).is_err());
}

#[test]
fn history_deserialize_rejects_overfull_series() {
    let json = r#"{"capacity":1,"timestamps":[1,2],"speed":[1.0,2.0],"battery":[3.0,4.0]}"#;
    let err = serde_json::from_str::<RollingHistory>(json).unwrap_err();
    assert!(err.to_string().contains("capacity"));
}
