/// Tools for meal planning
///
/// This module implements meal_plan_add, meal_plan_list and meal_plan_log.
/// Planned meals are removed with entry_delete.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{CalorieEntry, Macros, MealPlan, MealType};
use crate::export::format_number;
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::{parse_label, record_id, resolve_date, short_id, ToolError};

/// Parameters for planning a meal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddMealPlanParams {
    /// Meal name (e.g., "Salmon bowl")
    pub name: String,
    /// breakfast, lunch, dinner or snack
    pub meal_type: String,
    pub calories: f64,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub notes: Option<String>,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddMealPlanResponse {
    pub message: String,
    pub plan: MealPlan,
}

pub fn add_meal_plan<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: AddMealPlanParams,
) -> Result<AddMealPlanResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let meal_type: MealType = parse_label(&params.meal_type)?;

    let plan = MealPlan::new(
        session.user().clone(),
        date,
        meal_type,
        params.name,
        params.calories,
        Macros {
            protein_g: params.protein_g,
            carbs_g: params.carbs_g,
            fat_g: params.fat_g,
        },
        params.notes,
    )?;
    storage.insert_record(&plan)?;
    tracing::debug!("Planned meal {} for {} on {}", plan.id, session.user(), date);

    Ok(AddMealPlanResponse {
        message: format!(
            "📝 Planned {} for {} on {} ({} kcal, ID: {})",
            plan.name,
            meal_type,
            date,
            format_number(plan.calories),
            short_id(&plan.id)
        ),
        plan,
    })
}

/// Parameters for listing planned meals
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListMealPlansParams {
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListMealPlansResponse {
    pub message: String,
    pub date: NaiveDate,
    pub plans: Vec<MealPlan>,
    pub planned_calories: f64,
}

pub fn list_meal_plans<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ListMealPlansParams,
) -> Result<ListMealPlansResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let mut plans: Vec<MealPlan> = storage.list_records(session.user(), DateFilter::On(date))?;
    plans.sort_by_key(|p| (p.meal_type, p.created_at));
    let planned_calories: f64 = plans.iter().map(|p| p.calories).sum();

    let message = if plans.is_empty() {
        format!("No meals planned for {}.", date)
    } else {
        let mut lines = vec![format!(
            "📝 Meal plan for {} ({} kcal):",
            date,
            format_number(planned_calories)
        )];
        for plan in &plans {
            lines.push(format!(
                "  • {}: {} - {} kcal [{}]",
                plan.meal_type,
                plan.name,
                format_number(plan.calories),
                plan.id
            ));
        }
        lines.join("\n")
    };

    Ok(ListMealPlansResponse {
        message,
        date,
        plans,
        planned_calories,
    })
}

/// Parameters for logging a planned meal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogMealPlanParams {
    pub plan_id: String,
    /// Day to log it on, YYYY-MM-DD (default the planned day)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogMealPlanResponse {
    pub message: String,
    pub entry: CalorieEntry,
}

pub fn log_meal_plan<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: LogMealPlanParams,
) -> Result<LogMealPlanResponse, ToolError> {
    let plan_id = record_id(&params.plan_id, "Meal plan ID")?;
    let plan: MealPlan = storage.require_record(session.user(), &plan_id)?;
    let date = match params.date.as_deref() {
        Some(d) if !d.trim().is_empty() => resolve_date(session, Some(d))?,
        _ => plan.date,
    };

    let entry = plan.to_calorie_entry(date)?;
    storage.insert_record(&entry)?;
    tracing::debug!("Logged planned meal {} on {}", plan.id, date);

    Ok(LogMealPlanResponse {
        message: format!(
            "🍽️ Logged planned {} ({} kcal) for {}",
            plan.name,
            format_number(plan.calories),
            date
        ),
        entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_plan_then_log() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let storage = SqliteStorage::in_memory().unwrap();
        let session = Session::pinned(UserId::new("tester").unwrap(), today);

        let plan = add_meal_plan(
            &storage,
            &session,
            AddMealPlanParams {
                name: "Salmon bowl".to_string(),
                meal_type: "dinner".to_string(),
                calories: 640.0,
                protein_g: Some(40.0),
                carbs_g: None,
                fat_g: None,
                notes: None,
                date: Some("2024-06-11".to_string()),
            },
        )
        .unwrap()
        .plan;

        let listed = list_meal_plans(
            &storage,
            &session,
            ListMealPlansParams { date: Some("2024-06-11".to_string()) },
        )
        .unwrap();
        assert_eq!(listed.plans.len(), 1);
        assert_eq!(listed.planned_calories, 640.0);

        let logged = log_meal_plan(
            &storage,
            &session,
            LogMealPlanParams { plan_id: plan.id.to_string(), date: None },
        )
        .unwrap();
        assert_eq!(logged.entry.date, plan.date);
        assert_eq!(logged.entry.macros.protein_g, Some(40.0));

        let entries: Vec<CalorieEntry> = storage
            .list_records(session.user(), DateFilter::On(plan.date))
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_bad_meal_type() {
        let storage = SqliteStorage::in_memory().unwrap();
        let session = Session::new(UserId::new("tester").unwrap());
        let result = add_meal_plan(
            &storage,
            &session,
            AddMealPlanParams {
                name: "Cake".to_string(),
                meal_type: "second breakfast".to_string(),
                calories: 400.0,
                protein_g: None,
                carbs_g: None,
                fat_g: None,
                notes: None,
                date: None,
            },
        );
        assert!(matches!(result, Err(ToolError::Domain(_))));
    }
}
