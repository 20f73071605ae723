use std::io::Write;

use chrono::TimeZone;

use super::*;

fn visit(id: i64, location: &str) -> Visit {
    Visit {
        id,
        username: "rina".to_string(),
        display_name: None,
        store_name: format!("Store {id}"),
        location: location.to_string(),
        start_time: Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap(),
        end_time: None,
        description: None,
        order_id: None,
    }
}

fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("visitmap-core-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn owner_label_prefers_display_name() {
    let mut v = visit(1, "-6.2,106.8");
    assert_eq!(v.owner_label(), "rina");
    v.display_name = Some("Rina Wijaya".to_string());
    assert_eq!(v.owner_label(), "Rina Wijaya");
    v.display_name = Some("  ".to_string());
    assert_eq!(v.owner_label(), "rina");
}

#[test]
fn visit_without_end_time_is_ongoing() {
    let mut v = visit(1, "-6.2,106.8");
    assert!(v.is_ongoing());
    v.end_time = Some(Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap());
    assert!(!v.is_ongoing());
}

#[test]
fn deserializes_camel_case_backend_payload() {
    let json = r#"{
        "id": 7,
        "username": "budi",
        "displayName": "Budi S.",
        "storeName": "Toko Maju",
        "location": "Jl. Sudirman 1, Jakarta",
        "startTime": "2025-03-04T09:00:00Z",
        "endTime": null,
        "orderId": 991
    }"#;
    let v: Visit = serde_json::from_str(json).unwrap();
    assert_eq!(v.store_name, "Toko Maju");
    assert_eq!(v.display_name.as_deref(), Some("Budi S."));
    assert_eq!(v.order_id, Some(991));
    assert!(v.end_time.is_none());
    assert!(v.description.is_none());
}

#[test]
fn validate_rejects_duplicate_ids() {
    let visits = vec![visit(1, "a"), visit(1, "b")];
    let err = validate_visits(&visits).unwrap_err();
    assert!(err.to_string().contains("duplicate visit id: 1"));
}

#[test]
fn validate_rejects_blank_location() {
    let visits = vec![visit(3, "   ")];
    let err = validate_visits(&visits).unwrap_err();
    assert!(err.to_string().contains("empty location"));
}

#[test]
fn validate_rejects_end_before_start() {
    let mut v = visit(4, "-6.2,106.8");
    v.end_time = Some(Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap());
    let err = validate_visits(&[v]).unwrap_err();
    assert!(err.to_string().contains("ends before it starts"));
}

#[test]
fn load_visits_reads_json_array_in_file_order() {
    let path = write_temp(
        "visits.json",
        r#"[
            {"id": 2, "username": "a", "store_name": "B", "location": "1,2", "start_time": "2025-03-04T09:00:00Z"},
            {"id": 1, "username": "a", "store_name": "A", "location": "3,4", "start_time": "2025-03-04T10:00:00Z"}
        ]"#,
    );
    let visits = load_visits(&path).unwrap();
    let ids: Vec<i64> = visits.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn load_visits_reads_wrapped_yaml() {
    let path = write_temp(
        "visits.yaml",
        "visits:\n  - id: 5\n    username: a\n    store_name: Warung\n    location: \"-6.2,106.8\"\n    start_time: 2025-03-04T09:00:00Z\n",
    );
    let visits = load_visits(&path).unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].store_name, "Warung");
}

#[test]
fn load_visits_reports_parse_errors_with_path() {
    let path = write_temp("broken.json", "{ not json");
    let err = load_visits(&path).unwrap_err();
    assert!(matches!(err, ConfigError::VisitsFileParse { .. }));
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn load_visits_reports_missing_file() {
    let err = load_visits(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, ConfigError::VisitsFileIo { .. }));
}
