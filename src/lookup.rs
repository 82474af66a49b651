/// Optional food and exercise lookup
///
/// Searches a third-party nutrition API for foods (calories and macros) and
/// activities (calories burned). Lookup never fails from the caller's point
/// of view: without an API key, or when a request fails, it returns no
/// results and logs a warning.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::config::LookupConfig;

const KG_TO_LB: f64 = 2.204_622_6;

#[derive(Error, Debug)]
enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Response(#[from] serde_json::Error),
}

/// A food match with nutrition for the serving the service reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodMatch {
    pub name: String,
    pub calories: Option<f64>,
    pub serving_size_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}

/// An activity match with its calorie burn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseMatch {
    pub name: String,
    pub calories_per_hour: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub total_calories: Option<f64>,
}

#[async_trait]
pub trait NutritionLookup: Send + Sync {
    /// Whether a search can return anything at all
    fn is_enabled(&self) -> bool;

    async fn search_food(&self, query: &str) -> Vec<FoodMatch>;

    async fn search_exercise(
        &self,
        activity: &str,
        weight_kg: Option<f64>,
        duration_minutes: Option<f64>,
    ) -> Vec<ExerciseMatch>;
}

/// Numbers sometimes arrive as strings, or as notices in place of a value
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok())))
}

#[derive(Debug, Deserialize)]
struct FoodItem {
    name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    serving_size_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    protein_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    carbohydrates_total_g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    fat_total_g: Option<f64>,
}

impl From<FoodItem> for FoodMatch {
    fn from(item: FoodItem) -> Self {
        Self {
            name: item.name,
            calories: item.calories,
            serving_size_g: item.serving_size_g,
            protein_g: item.protein_g,
            carbs_g: item.carbohydrates_total_g,
            fat_g: item.fat_total_g,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ActivityItem {
    name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    calories_per_hour: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    duration_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    total_calories: Option<f64>,
}

impl From<ActivityItem> for ExerciseMatch {
    fn from(item: ActivityItem) -> Self {
        Self {
            name: item.name,
            calories_per_hour: item.calories_per_hour,
            duration_minutes: item.duration_minutes,
            total_calories: item.total_calories,
        }
    }
}

fn parse_foods(body: &str) -> Result<Vec<FoodMatch>, serde_json::Error> {
    let items: Vec<FoodItem> = serde_json::from_str(body)?;
    Ok(items.into_iter().map(FoodMatch::from).collect())
}

fn parse_activities(body: &str) -> Result<Vec<ExerciseMatch>, serde_json::Error> {
    let items: Vec<ActivityItem> = serde_json::from_str(body)?;
    Ok(items.into_iter().map(ExerciseMatch::from).collect())
}

/// Lookup over HTTP with an API key header
pub struct HttpLookup {
    client: Option<reqwest::Client>,
    api_key: Option<String>,
    base_url: String,
}

impl HttpLookup {
    /// Build from config, reading the API key from the configured variable
    pub fn from_config(config: &LookupConfig) -> Self {
        let api_key = if config.enabled {
            std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
        } else {
            None
        };
        Self::new(api_key, config.base_url.clone(), config.timeout_secs)
    }

    pub fn new(api_key: Option<String>, base_url: String, timeout_secs: u64) -> Self {
        let client = match reqwest::Client::builder()
            .user_agent(format!("fitness-tracker-mcp/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Failed to build HTTP client, lookup disabled: {}", e);
                None
            }
        };

        if api_key.is_none() {
            tracing::info!("No lookup API key configured, food and exercise search disabled");
        }

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Lookup with no key; every search returns nothing
    pub fn disabled() -> Self {
        Self {
            client: None,
            api_key: None,
            base_url: String::new(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Option<String>, LookupError> {
        let (Some(client), Some(key)) = (&self.client, &self.api_key) else {
            return Ok(None);
        };

        let response = client
            .get(format!("{}/{}", self.base_url, path))
            .header("X-Api-Key", key)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(Some(response.text().await?))
    }

    async fn try_search_food(&self, query: &str) -> Result<Vec<FoodMatch>, LookupError> {
        match self.get("nutrition", &[("query", query.to_string())]).await? {
            Some(body) => Ok(parse_foods(&body)?),
            None => Ok(Vec::new()),
        }
    }

    async fn try_search_exercise(
        &self,
        activity: &str,
        weight_kg: Option<f64>,
        duration_minutes: Option<f64>,
    ) -> Result<Vec<ExerciseMatch>, LookupError> {
        let mut query = vec![("activity", activity.to_string())];
        if let Some(kg) = weight_kg {
            // The service expects pounds
            query.push(("weight", format!("{:.0}", kg * KG_TO_LB)));
        }
        if let Some(minutes) = duration_minutes {
            query.push(("duration", format!("{:.0}", minutes)));
        }

        match self.get("caloriesburned", &query).await? {
            Some(body) => Ok(parse_activities(&body)?),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl NutritionLookup for HttpLookup {
    fn is_enabled(&self) -> bool {
        self.client.is_some() && self.api_key.is_some()
    }

    async fn search_food(&self, query: &str) -> Vec<FoodMatch> {
        match self.try_search_food(query).await {
            Ok(foods) => foods,
            Err(e) => {
                tracing::warn!("Food lookup for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn search_exercise(
        &self,
        activity: &str,
        weight_kg: Option<f64>,
        duration_minutes: Option<f64>,
    ) -> Vec<ExerciseMatch> {
        match self.try_search_exercise(activity, weight_kg, duration_minutes).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Exercise lookup for '{}' failed: {}", activity, e);
                Vec::new()
            }
        }
    }
}
