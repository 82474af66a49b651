/// Tools for food and exercise search
///
/// Both degrade to an empty result with a hint when lookup is unavailable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::WeightEntry;
use crate::export::{format_number, optional_number};
use crate::lookup::{ExerciseMatch, FoodMatch, NutritionLookup};
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::ToolError;

const DISABLED_HINT: &str =
    "Lookup is not configured. Set the lookup API key environment variable to enable search.";

fn require_query(value: &str, what: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidParams(format!("{} cannot be empty", what)));
    }
    Ok(trimmed.to_string())
}

/// Parameters for a food search
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FoodSearchParams {
    /// Food to search for, optionally with a quantity ("1 cup rice")
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct FoodSearchResponse {
    pub message: String,
    pub enabled: bool,
    pub results: Vec<FoodMatch>,
}

pub async fn search_food(
    lookup: &dyn NutritionLookup,
    params: FoodSearchParams,
) -> Result<FoodSearchResponse, ToolError> {
    let query = require_query(&params.query, "Query")?;
    let enabled = lookup.is_enabled();
    let results = lookup.search_food(&query).await;

    let message = if !enabled {
        DISABLED_HINT.to_string()
    } else if results.is_empty() {
        format!("No foods found for '{}'.", query)
    } else {
        let mut lines = vec![format!("🔎 Results for '{}':", query)];
        for food in &results {
            lines.push(format!(
                "  • {}: {} kcal per {} g (P {} / C {} / F {})",
                food.name,
                optional_number(food.calories),
                optional_number(food.serving_size_g),
                optional_number(food.protein_g),
                optional_number(food.carbs_g),
                optional_number(food.fat_g)
            ));
        }
        lines.join("\n")
    };

    Ok(FoodSearchResponse {
        message,
        enabled,
        results,
    })
}

/// Parameters for an exercise search
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExerciseSearchParams {
    /// Activity to search for ("running", "yoga")
    pub activity: String,
    pub duration_minutes: Option<f64>,
    /// Body weight in kg; defaults to your latest weigh-in or profile
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseSearchResponse {
    pub message: String,
    pub enabled: bool,
    pub results: Vec<ExerciseMatch>,
}

/// The body weight to estimate burn with: latest weigh-in, then profile
pub fn body_weight<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
) -> Result<Option<f64>, ToolError> {
    let latest = storage
        .list_records::<WeightEntry>(session.user(), DateFilter::Any)?
        .into_iter()
        .max_by_key(|w| (w.date, w.created_at))
        .map(|w| w.weight_kg);
    if latest.is_some() {
        return Ok(latest);
    }
    Ok(storage
        .load_settings(session.user())?
        .profile
        .map(|p| p.weight_kg))
}

pub async fn search_exercise(
    lookup: &dyn NutritionLookup,
    params: ExerciseSearchParams,
    default_weight_kg: Option<f64>,
) -> Result<ExerciseSearchResponse, ToolError> {
    let activity = require_query(&params.activity, "Activity")?;
    let enabled = lookup.is_enabled();
    let weight_kg = params.weight_kg.or(default_weight_kg);
    let results = lookup
        .search_exercise(&activity, weight_kg, params.duration_minutes)
        .await;

    let message = if !enabled {
        DISABLED_HINT.to_string()
    } else if results.is_empty() {
        format!("No activities found for '{}'.", activity)
    } else {
        let mut lines = vec![format!("🔎 Results for '{}':", activity)];
        for item in &results {
            let total = match (item.total_calories, item.duration_minutes) {
                (Some(total), Some(minutes)) => format!(
                    ", {} kcal in {} min",
                    format_number(total.round()),
                    format_number(minutes)
                ),
                _ => String::new(),
            };
            lines.push(format!(
                "  • {}: {} kcal/hour{}",
                item.name,
                optional_number(item.calories_per_hour),
                total
            ));
        }
        lines.join("\n")
    };

    Ok(ExerciseSearchResponse {
        message,
        enabled,
        results,
    })
}
