use serde_json::json;
use tempfile::tempdir;

use fitness_tracker_mcp::tools::VALIDATION_FAILED;

use super::{call, server_in};

/// Data lines of one CSV section, header excluded
fn section_rows(csv: &str, title: &str) -> usize {
    csv.lines()
        .skip_while(|l| *l != title)
        .skip(2)
        .take_while(|l| !l.is_empty())
        .count()
}

#[tokio::test]
async fn test_csv_rows_match_window() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "exporter");

    for date in ["2024-06-12", "2024-06-10", "2024-05-01"] {
        call(
            &mut server,
            "calories_log",
            json!({"food_name": "Rice", "calories": 200, "date": date}),
        )
        .await;
    }
    call(&mut server, "water_log", json!({"amount_ml": 500, "date": "2024-06-11"})).await;
    call(&mut server, "weight_log", json!({"weight": 72.5})).await;

    let week = call(&mut server, "data_export", json!({"format": "csv", "range": "week"})).await;
    let csv = week.data["content"].as_str().unwrap();
    assert_eq!(section_rows(csv, "Calories"), 2);
    assert_eq!(section_rows(csv, "Workouts"), 0);
    assert_eq!(section_rows(csv, "Weight"), 1);
    assert_eq!(section_rows(csv, "Water"), 1);

    let all = call(&mut server, "data_export", json!({"format": "csv", "range": "all"})).await;
    let csv = all.data["content"].as_str().unwrap();
    assert_eq!(section_rows(csv, "Calories"), 3);
}

#[tokio::test]
async fn test_report_export_renders_tables() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "reporter");
    call(&mut server, "workout_log", json!({"exercise": "Run", "category": "cardio", "duration_minutes": 30})).await;

    let report = call(&mut server, "data_export", json!({"format": "report", "range": "month"})).await;
    let text = report.data["content"].as_str().unwrap();
    assert!(text.contains("Run"));
    assert_eq!(report.data["format"], "report");
}

#[tokio::test]
async fn test_restore_rejects_missing_timestamp() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "restorer");

    let err = server
        .call_tool("data_restore", json!({"backup": "{\"water\": []}"}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), VALIDATION_FAILED);
}

#[tokio::test]
async fn test_backup_file_restores_for_another_user() {
    let dir = tempdir().unwrap();
    let mut source = server_in(&dir, "source");
    call(&mut source, "water_log", json!({"amount_ml": 750})).await;
    call(&mut source, "habit_create", json!({"name": "Read"})).await;

    let backup = call(&mut source, "data_export", json!({"format": "json"})).await;
    let content = backup.data["content"].as_str().unwrap();
    assert!(backup.data["window"].is_null());

    let path = dir.path().join("backup.json");
    std::fs::write(&path, content).unwrap();
    drop(source);

    let mut target = server_in(&dir, "target");
    let restored = call(
        &mut target,
        "data_restore",
        json!({"path": path.to_string_lossy()}),
    )
    .await;
    assert_eq!(restored.data["restored"]["water"], 1);
    assert_eq!(restored.data["restored"]["habits"], 1);

    let water = call(&mut target, "water_today", json!({})).await;
    assert_eq!(water.data["total_ml"], 750.0);
}

#[tokio::test]
async fn test_backup_with_bad_record_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "restorer");

    let backup = json!({
        "timestamp": "2024-06-11T09:00:00Z",
        "user_id": "someone",
        "water": [
            {"id": "w1", "user_id": "someone", "date": "2024-06-12", "amount_ml": 500.0,
             "created_at": "2024-06-12T08:00:00Z"},
            {"id": "w2", "user_id": "someone", "date": "2024-06-12", "amount_ml": 99999.0,
             "created_at": "2024-06-12T09:00:00Z"}
        ]
    });

    let err = server
        .call_tool("data_restore", json!({"backup": backup.to_string()}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), VALIDATION_FAILED);

    let water = call(&mut server, "water_today", json!({})).await;
    assert_eq!(water.data["total_ml"], 0.0);
}
