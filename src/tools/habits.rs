/// Tools for daily habits
///
/// This module implements habit_create, habit_list, habit_toggle,
/// habit_delete and habit_stats.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::{HabitStats, HabitSummary};
use crate::domain::{DateRange, Habit, HabitEntry, StreakSummary};
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::{parse_range, record_id, resolve_date, short_id, ToolError};

/// Parameters for creating a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Habit name (e.g., "Stretch", "No sugar")
    pub name: String,
    pub description: Option<String>,
    /// Emoji or short icon label
    pub icon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub message: String,
    pub habit: Habit,
}

pub fn create_habit<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(
        session.user().clone(),
        params.name,
        params.description,
        params.icon,
    )?;
    storage.insert_record(&habit)?;
    tracing::debug!("Created habit {} for {}", habit.id, session.user());

    Ok(CreateHabitResponse {
        message: format!(
            "✅ Created habit '{}' (ID: {})",
            habit.name,
            short_id(&habit.id)
        ),
        habit,
    })
}

/// Parameters for listing habits
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Day to show completion for, YYYY-MM-DD (default today)
    pub date: Option<String>,
}

/// A habit with its state on the requested day
#[derive(Debug, Serialize)]
pub struct HabitStatus {
    pub habit: Habit,
    pub completed: bool,
    pub streak: StreakSummary,
}

#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub message: String,
    pub date: NaiveDate,
    pub habits: Vec<HabitStatus>,
    pub completed: usize,
}

pub fn list_habits<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ListHabitsParams,
) -> Result<ListHabitsResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let mut habits: Vec<Habit> = storage.list_records(session.user(), DateFilter::Any)?;
    habits.sort_by_key(|h| h.created_at);
    let entries: Vec<HabitEntry> = storage.list_records(session.user(), DateFilter::Any)?;

    let statuses: Vec<HabitStatus> = habits
        .into_iter()
        .map(|habit| {
            let own: Vec<HabitEntry> = entries
                .iter()
                .filter(|e| e.habit_id == habit.id)
                .cloned()
                .collect();
            let completed = own.iter().any(|e| e.date == date && e.completed);
            let streak = StreakSummary::from_habit_entries(&own, session.today());
            HabitStatus {
                habit,
                completed,
                streak,
            }
        })
        .collect();

    let completed = statuses.iter().filter(|s| s.completed).count();

    let message = if statuses.is_empty() {
        "No habits yet. Create one with habit_create.".to_string()
    } else {
        let mut lines = vec![format!(
            "📋 Habits for {} ({}/{} done):",
            date,
            completed,
            statuses.len()
        )];
        for status in &statuses {
            let mark = if status.completed { "✅" } else { "⬜" };
            let icon = status.habit.icon.as_deref().map(|i| format!("{} ", i)).unwrap_or_default();
            let streak = if status.streak.current > 0 {
                format!(" 🔥 {}", status.streak.current)
            } else {
                String::new()
            };
            lines.push(format!(
                "  {} {}{}{} [{}]",
                mark, icon, status.habit.name, streak, status.habit.id
            ));
        }
        lines.join("\n")
    };

    Ok(ListHabitsResponse {
        message,
        date,
        habits: statuses,
        completed,
    })
}

/// Parameters for toggling a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleHabitParams {
    pub habit_id: String,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub message: String,
    pub entry: HabitEntry,
    pub streak: StreakSummary,
}

pub fn toggle_habit<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ToggleHabitParams,
) -> Result<ToggleHabitResponse, ToolError> {
    let habit_id = record_id(&params.habit_id, "Habit ID")?;
    let date = resolve_date(session, params.date.as_deref())?;

    let habit: Habit = storage.require_record(session.user(), &habit_id)?;
    let entry = storage.toggle_habit_entry(session.user(), &habit_id, date)?;

    let entries: Vec<HabitEntry> = storage
        .list_records::<HabitEntry>(session.user(), DateFilter::Any)?
        .into_iter()
        .filter(|e| e.habit_id == habit_id)
        .collect();
    let streak = StreakSummary::from_habit_entries(&entries, session.today());

    let message = if entry.completed {
        format!(
            "✅ Marked '{}' done for {}. {}",
            habit.name,
            date,
            streak.motivational_message()
        )
    } else {
        format!("⬜ Marked '{}' not done for {}.", habit.name, date)
    };

    Ok(ToggleHabitResponse {
        message,
        entry,
        streak,
    })
}

/// Parameters for deleting a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub message: String,
    pub habit_id: String,
    pub entries_removed: usize,
}

pub fn delete_habit<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = record_id(&params.habit_id, "Habit ID")?;
    let habit: Habit = storage.require_record(session.user(), &habit_id)?;
    let entries_removed = storage.delete_habit(session.user(), &habit_id)?;
    tracing::info!("Deleted habit {} and {} entries", habit_id, entries_removed);

    Ok(DeleteHabitResponse {
        message: format!(
            "🗑️ Deleted habit '{}' and {} entr{}",
            habit.name,
            entries_removed,
            if entries_removed == 1 { "y" } else { "ies" }
        ),
        habit_id: habit_id.to_string(),
        entries_removed,
    })
}

/// Parameters for habit statistics
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitStatsParams {
    /// week, month, 3months, year or all (default week)
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HabitStatsResponse {
    pub message: String,
    pub stats: HabitStats,
}

fn summary_line(summary: &HabitSummary) -> String {
    format!(
        "  • {}: {}/{} days ({:.0}%), streak {} (best {})",
        summary.name,
        summary.completions,
        summary.possible_days,
        summary.completion_rate * 100.0,
        summary.streak.current,
        summary.streak.longest
    )
}

pub fn habit_stats<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: HabitStatsParams,
) -> Result<HabitStatsResponse, ToolError> {
    let range = match params.range.as_deref() {
        Some(_) => parse_range(params.range.as_deref())?,
        None => DateRange::Week,
    };
    let stats = session.analytics().habit_stats(storage, session.user(), range)?;

    let message = if stats.habits.is_empty() {
        "No habits to report on yet.".to_string()
    } else {
        let mut lines = vec![format!(
            "📊 Habits from {} to {}: {:.0}% overall",
            stats.window.start,
            stats.window.end,
            stats.overall_rate * 100.0
        )];
        lines.extend(stats.habits.iter().map(summary_line));
        lines.join("\n")
    };

    Ok(HabitStatsResponse { message, stats })
}
