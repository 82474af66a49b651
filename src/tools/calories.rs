/// Tools for the calorie log
///
/// This module implements calories_log, calories_list and calories_stats.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::CalorieStats;
use crate::domain::{CalorieEntry, Macros, MealType, UserSettings};
use crate::export::format_number;
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::{parse_or, parse_range, resolve_date, ToolError};

/// Parameters for logging a food
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogCaloriesParams {
    /// Name of the food (e.g., "Oatmeal")
    pub food_name: String,
    /// Calories (kcal)
    pub calories: f64,
    /// breakfast, lunch, dinner or snack (default snack)
    pub meal_type: Option<String>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    /// Free-form serving description ("1 cup", "200 g")
    pub serving: Option<String>,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogCaloriesResponse {
    pub message: String,
    pub entry: CalorieEntry,
    pub day_total: f64,
    pub calorie_target: Option<u32>,
}

pub fn log_calories<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: LogCaloriesParams,
) -> Result<LogCaloriesResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let meal_type = parse_or(params.meal_type.as_deref(), MealType::Snack)?;

    let entry = CalorieEntry::new(
        session.user().clone(),
        date,
        params.food_name,
        params.calories,
        Macros {
            protein_g: params.protein_g,
            carbs_g: params.carbs_g,
            fat_g: params.fat_g,
        },
        meal_type,
        params.serving,
    )?;
    storage.insert_record(&entry)?;
    tracing::debug!("Logged {} kcal for {} on {}", entry.calories, session.user(), date);

    let day: Vec<CalorieEntry> = storage.list_records(session.user(), DateFilter::On(date))?;
    let day_total: f64 = day.iter().map(|e| e.calories).sum();
    let settings = storage.load_settings(session.user())?;

    Ok(LogCaloriesResponse {
        message: format!(
            "🍽️ Logged {} ({} kcal) for {}. {}",
            entry.food_name,
            format_number(entry.calories),
            meal_type,
            day_summary(day_total, &settings)
        ),
        entry,
        day_total,
        calorie_target: settings.daily_calorie_target,
    })
}

fn day_summary(total: f64, settings: &UserSettings) -> String {
    match settings.daily_calorie_target {
        Some(target) => {
            let remaining = f64::from(target) - total;
            if remaining >= 0.0 {
                format!(
                    "Day total: {} / {} kcal, {} remaining.",
                    format_number(total),
                    target,
                    format_number(remaining)
                )
            } else {
                format!(
                    "Day total: {} / {} kcal, {} over target.",
                    format_number(total),
                    target,
                    format_number(-remaining)
                )
            }
        }
        None => format!("Day total: {} kcal.", format_number(total)),
    }
}

/// Parameters for listing a day's food log
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListCaloriesParams {
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListCaloriesResponse {
    pub message: String,
    pub date: chrono::NaiveDate,
    pub entries: Vec<CalorieEntry>,
    pub total_calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

pub fn list_calories<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ListCaloriesParams,
) -> Result<ListCaloriesResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let mut entries: Vec<CalorieEntry> = storage.list_records(session.user(), DateFilter::On(date))?;
    entries.sort_by_key(|e| (e.meal_type, e.created_at));

    let total_calories: f64 = entries.iter().map(|e| e.calories).sum();
    let protein_g: f64 = entries.iter().filter_map(|e| e.macros.protein_g).sum();
    let carbs_g: f64 = entries.iter().filter_map(|e| e.macros.carbs_g).sum();
    let fat_g: f64 = entries.iter().filter_map(|e| e.macros.fat_g).sum();

    let message = if entries.is_empty() {
        format!("No food logged on {}.", date)
    } else {
        let settings = storage.load_settings(session.user())?;
        let mut lines = vec![format!("🍽️ Food log for {}:", date)];
        let mut current_meal = None;
        for entry in &entries {
            if current_meal != Some(entry.meal_type) {
                lines.push(format!("{}:", entry.meal_type));
                current_meal = Some(entry.meal_type);
            }
            lines.push(format!(
                "  • {} - {} kcal [{}]",
                entry.food_name,
                format_number(entry.calories),
                entry.id
            ));
        }
        lines.push(day_summary(total_calories, &settings));
        lines.join("\n")
    };

    Ok(ListCaloriesResponse {
        message,
        date,
        entries,
        total_calories,
        protein_g,
        carbs_g,
        fat_g,
    })
}

/// Parameters for calorie statistics
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalorieStatsParams {
    /// week, month, 3months, year or all (default month)
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalorieStatsResponse {
    pub message: String,
    pub stats: CalorieStats,
}

pub fn calorie_stats<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: CalorieStatsParams,
) -> Result<CalorieStatsResponse, ToolError> {
    let range = parse_range(params.range.as_deref())?;
    let stats = session.analytics().calorie_stats(storage, session.user(), range)?;

    let message = if stats.entries == 0 {
        format!("No calories logged from {} to {}.", stats.window.start, stats.window.end)
    } else {
        let mut lines = vec![
            format!("📊 Calories from {} to {}:", stats.window.start, stats.window.end),
            format!(
                "Total: {} kcal over {} logged days",
                format_number(stats.total_calories),
                stats.days_logged
            ),
            format!("Average: {} kcal/day", format_number(stats.average_per_day.round())),
        ];
        if let (Some(high), Some(low)) = (stats.highest_day, stats.lowest_day) {
            lines.push(format!(
                "Highest: {} kcal on {}, lowest: {} kcal on {}",
                format_number(high.value),
                high.date,
                format_number(low.value),
                low.date
            ));
        }
        lines.push(format!(
            "Macros: {} g protein, {} g carbs, {} g fat",
            format_number(stats.protein_g),
            format_number(stats.carbs_g),
            format_number(stats.fat_g)
        ));
        lines.push(format!("Trend: {}", stats.trend));
        lines.join("\n")
    };

    Ok(CalorieStatsResponse { message, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::storage::SqliteStorage;
    use chrono::NaiveDate;

    fn setup() -> (SqliteStorage, Session) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        (
            SqliteStorage::in_memory().unwrap(),
            Session::pinned(UserId::new("tester").unwrap(), today),
        )
    }

    fn food(name: &str, calories: f64, meal: &str) -> LogCaloriesParams {
        LogCaloriesParams {
            food_name: name.to_string(),
            calories,
            meal_type: Some(meal.to_string()),
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            serving: None,
            date: None,
        }
    }

    #[test]
    fn test_log_and_list_day() {
        let (storage, session) = setup();
        log_calories(&storage, &session, food("Oatmeal", 350.0, "breakfast")).unwrap();
        let second = log_calories(&storage, &session, food("Apple", 95.0, "snack")).unwrap();
        assert_eq!(second.day_total, 445.0);

        let listed = list_calories(&storage, &session, ListCaloriesParams { date: None }).unwrap();
        assert_eq!(listed.entries.len(), 2);
        assert_eq!(listed.entries[0].meal_type, MealType::Breakfast);
        assert!(listed.message.contains("Oatmeal"));
    }

    #[test]
    fn test_invalid_meal_writes_nothing() {
        let (storage, session) = setup();
        let result = log_calories(&storage, &session, food("Pie", 300.0, "brunch"));
        assert!(matches!(result, Err(ToolError::Domain(_))));

        let listed = list_calories(&storage, &session, ListCaloriesParams { date: None }).unwrap();
        assert!(listed.entries.is_empty());
    }

    #[test]
    fn test_target_in_summary() {
        let (storage, session) = setup();
        let mut settings = storage.load_settings(session.user()).unwrap();
        settings.set_calorie_target(2000).unwrap();
        storage.save_settings(&mut settings).unwrap();

        let response = log_calories(&storage, &session, food("Pasta", 2100.0, "dinner")).unwrap();
        assert!(response.message.contains("100 over target"));
    }

    #[test]
    fn test_stats_empty_range() {
        let (storage, session) = setup();
        let response = calorie_stats(&storage, &session, CalorieStatsParams { range: Some("week".to_string()) }).unwrap();
        assert_eq!(response.stats.entries, 0);
        assert!(response.message.starts_with("No calories"));
    }
}
