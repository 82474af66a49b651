/// Today-at-a-glance tool

use serde::Serialize;

use crate::analytics::Dashboard;
use crate::export::format_number;
use crate::session::Session;
use crate::storage::RecordStore;
use crate::tools::body::show_weight;
use crate::tools::ToolError;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub message: String,
    pub dashboard: Dashboard,
}

pub fn dashboard<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
) -> Result<DashboardResponse, ToolError> {
    let dashboard = session.analytics().dashboard(storage, session.user())?;
    let units = storage.load_settings(session.user())?.units;

    let mut lines = vec![format!("📊 Today ({})", dashboard.date)];

    let calories = match (dashboard.calorie_target, dashboard.calories_remaining) {
        (Some(target), Some(remaining)) if remaining >= 0.0 => format!(
            "🍽️ Calories: {} / {} kcal ({} left)",
            format_number(dashboard.calories_consumed.round()),
            target,
            format_number(remaining.round())
        ),
        (Some(target), Some(remaining)) => format!(
            "🍽️ Calories: {} / {} kcal ({} over)",
            format_number(dashboard.calories_consumed.round()),
            target,
            format_number((-remaining).round())
        ),
        _ => format!(
            "🍽️ Calories: {} kcal (no target set)",
            format_number(dashboard.calories_consumed.round())
        ),
    };
    lines.push(calories);

    lines.push(format!(
        "💧 Water: {} / {} ml",
        format_number(dashboard.water_ml),
        format_number(dashboard.water_target_ml)
    ));
    lines.push(format!(
        "🏋️ Workouts: {} ({} min, {} kcal burned)",
        dashboard.workouts_today,
        format_number(dashboard.workout_minutes_today),
        format_number(dashboard.calories_burned.round())
    ));
    lines.push(format!(
        "🔥 Workout streak: {} day(s) (best {})",
        dashboard.workout_streak.current, dashboard.workout_streak.longest
    ));
    if dashboard.habits_total > 0 {
        lines.push(format!(
            "✅ Habits: {}/{} done",
            dashboard.habits_completed, dashboard.habits_total
        ));
    }
    if let Some(kg) = dashboard.latest_weight_kg {
        lines.push(format!("⚖️ Latest weight: {}", show_weight(kg, units)));
    }

    Ok(DashboardResponse {
        message: lines.join("\n"),
        dashboard,
    })
}
