use serde_json::json;
use tempfile::tempdir;

use fitness_tracker_mcp::tools::{definitions, ToolError, NOT_FOUND, VALIDATION_FAILED};
use fitness_tracker_mcp::{Config, FitnessTrackerServer, UserId};

use super::{call, server_in};

#[test]
fn test_server_opens_database_file() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("fitness.db");
    std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();

    let server = tokio_test::block_on(FitnessTrackerServer::new(
        db_path.clone(),
        Config::default(),
        UserId::new("local").unwrap(),
    ))
    .expect("Failed to create server");
    assert_eq!(server.session().user().as_str(), "local");
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_every_definition_dispatches() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "dispatch");

    for def in definitions() {
        let result = server.call_tool(&def.name, json!({})).await;
        assert!(
            !matches!(result, Err(ToolError::UnknownTool(_))),
            "{} is listed but not dispatched",
            def.name
        );
    }

    let unknown = server.call_tool("sleep_log", json!({})).await;
    assert!(matches!(unknown, Err(ToolError::UnknownTool(_))));
}

#[tokio::test]
async fn test_calorie_day_with_onboarding_target() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "eater");

    let onboarding = call(
        &mut server,
        "onboarding_complete",
        json!({
            "gender": "male",
            "age": 25,
            "height": 175,
            "weight": 70,
            "body_goal": "fat_loss",
            "activity_level": "sedentary"
        }),
    )
    .await;
    assert_eq!(onboarding.data["targets"]["bmr"], 1674);
    assert_eq!(onboarding.data["targets"]["tdee"], 2009);
    assert_eq!(onboarding.data["targets"]["daily_calories"], 1507);

    call(
        &mut server,
        "calories_log",
        json!({"food_name": "Oatmeal", "calories": 350, "meal_type": "breakfast"}),
    )
    .await;
    let lunch = call(
        &mut server,
        "calories_log",
        json!({"food_name": "Burrito", "calories": 900, "meal_type": "lunch", "protein_g": 40}),
    )
    .await;
    assert_eq!(lunch.data["day_total"], 1250.0);
    assert_eq!(lunch.data["calorie_target"], 1507);

    let dashboard = call(&mut server, "dashboard", json!({})).await;
    assert_eq!(dashboard.data["dashboard"]["calories_consumed"], 1250.0);
    assert_eq!(dashboard.data["dashboard"]["calories_remaining"], 257.0);
}

#[tokio::test]
async fn test_habit_toggle_twice_restores_state() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "habits");

    let created = call(&mut server, "habit_create", json!({"name": "Stretch"})).await;
    let habit_id = created.data["habit"]["id"].as_str().unwrap().to_string();

    let on = call(&mut server, "habit_toggle", json!({"habit_id": habit_id})).await;
    assert_eq!(on.data["entry"]["completed"], true);
    let off = call(&mut server, "habit_toggle", json!({"habit_id": habit_id})).await;
    assert_eq!(off.data["entry"]["completed"], false);

    let listed = call(&mut server, "habit_list", json!({})).await;
    assert_eq!(listed.data["completed"], 0);

    let deleted = call(&mut server, "habit_delete", json!({"habit_id": habit_id})).await;
    assert_eq!(deleted.data["entries_removed"], 1);

    let gone = server
        .call_tool("habit_toggle", json!({"habit_id": habit_id}))
        .await
        .unwrap_err();
    assert_eq!(gone.code(), NOT_FOUND);
}

#[tokio::test]
async fn test_routine_apply_logs_workouts_and_streak() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "lifter");

    let routine = call(
        &mut server,
        "routine_create",
        json!({
            "name": "Push day",
            "exercises": [
                {"exercise": "Bench press", "category": "strength", "sets": 3, "reps": 8, "weight": 60},
                {"exercise": "Dips", "category": "strength", "sets": 3, "reps": 10}
            ],
            "days": ["mon", "thu"]
        }),
    )
    .await;
    let routine_id = routine.data["routine"]["id"].as_str().unwrap().to_string();

    let applied = call(
        &mut server,
        "routine_apply",
        json!({"routine_id": routine_id, "dates": ["2024-06-11", "2024-06-12"]}),
    )
    .await;
    assert_eq!(applied.data["workouts"].as_array().unwrap().len(), 4);

    let stats = call(&mut server, "workout_stats", json!({"range": "week"})).await;
    assert_eq!(stats.data["stats"]["streak"]["current"], 2);
}

#[tokio::test]
async fn test_invalid_input_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "strict");

    let bad = server
        .call_tool("water_log", json!({"amount_ml": -5}))
        .await
        .unwrap_err();
    assert_eq!(bad.code(), VALIDATION_FAILED);

    let bad_date = server
        .call_tool("calories_log", json!({"food_name": "Tea", "calories": 5, "date": "12/06/2024"}))
        .await
        .unwrap_err();
    assert_eq!(bad_date.code(), VALIDATION_FAILED);

    let today = call(&mut server, "water_today", json!({})).await;
    assert_eq!(today.data["total_ml"], 0.0);
    let calories = call(&mut server, "calories_list", json!({})).await;
    assert!(calories.data["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reminders_round_trip_through_tools() {
    let dir = tempdir().unwrap();
    let mut server = server_in(&dir, "reminded");

    let added = call(
        &mut server,
        "reminder_add",
        json!({"kind": "water", "time": "09:30", "message": "Hydrate"}),
    )
    .await;
    assert_eq!(added.data["scheduled"], true);
    let reminder_id = added.data["reminder"]["id"].as_str().unwrap().to_string();
    assert!(server.reminders().is_scheduled(&reminder_id));

    let mut fired = server.start_reminders().unwrap().expect("receiver handed out once");
    assert!(server.start_reminders().unwrap().is_none());

    call(&mut server, "reminder_test", json!({"reminder_id": reminder_id})).await;
    let notification = fired.recv().await.unwrap();
    assert_eq!(notification.message, "Hydrate");

    call(&mut server, "reminder_remove", json!({"reminder_id": reminder_id})).await;
    assert_eq!(server.reminders().scheduled_count(), 0);
    let listed = call(&mut server, "reminder_list", json!({})).await;
    assert!(listed.data["reminders"].as_array().unwrap().is_empty());
}
