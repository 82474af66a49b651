/// Calorie log entries and planned meals
///
/// A calorie entry is one food logged on one day. A meal plan entry is a
/// meal the user intends to eat on a day; it can be copied into the calorie
/// log once eaten.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    validate_amount, validate_name, validate_notes, validate_optional_amount, DomainError,
    MealType, RecordId, UserId,
};

const MAX_CALORIES: f64 = 20_000.0;
const MAX_MACRO_GRAMS: f64 = 2_000.0;

/// Macronutrients in grams, all optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
}

impl Macros {
    fn validate(&self) -> Result<(), DomainError> {
        validate_optional_amount(self.protein_g, "Protein", MAX_MACRO_GRAMS)?;
        validate_optional_amount(self.carbs_g, "Carbs", MAX_MACRO_GRAMS)?;
        validate_optional_amount(self.fat_g, "Fat", MAX_MACRO_GRAMS)?;
        Ok(())
    }
}

/// One food logged on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieEntry {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub food_name: String,
    pub calories: f64,
    #[serde(flatten)]
    pub macros: Macros,
    pub meal_type: MealType,
    /// Free-form serving description ("1 cup", "200 g")
    pub serving: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CalorieEntry {
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        food_name: String,
        calories: f64,
        macros: Macros,
        meal_type: MealType,
        serving: Option<String>,
    ) -> Result<Self, DomainError> {
        let entry = Self {
            id: RecordId::generate(),
            user_id,
            date,
            food_name: food_name.trim().to_string(),
            calories,
            macros,
            meal_type,
            serving,
            created_at: Utc::now(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.food_name, "Food name", 200)?;
        validate_amount(self.calories, "Calories", MAX_CALORIES)?;
        self.macros.validate()
    }
}

/// A meal planned for a specific day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub name: String,
    pub calories: f64,
    #[serde(flatten)]
    pub macros: Macros,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MealPlan {
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        meal_type: MealType,
        name: String,
        calories: f64,
        macros: Macros,
        notes: Option<String>,
    ) -> Result<Self, DomainError> {
        let plan = Self {
            id: RecordId::generate(),
            user_id,
            date,
            meal_type,
            name: name.trim().to_string(),
            calories,
            macros,
            notes,
            created_at: Utc::now(),
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_name(&self.name, "Meal name", 200)?;
        validate_amount(self.calories, "Calories", MAX_CALORIES)?;
        self.macros.validate()?;
        validate_notes(&self.notes, "Notes")
    }

    /// Turn this planned meal into a calorie log entry for `date`
    pub fn to_calorie_entry(&self, date: NaiveDate) -> Result<CalorieEntry, DomainError> {
        CalorieEntry::new(
            self.user_id.clone(),
            date,
            self.name.clone(),
            self.calories,
            self.macros,
            self.meal_type,
            None,
        )
    }
}
