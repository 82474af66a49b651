/// Sectioned CSV export
///
/// Each section is a title line followed by a headed CSV table and a blank
/// line. Every record in the data set produces exactly one row.

use serde::Serialize;

use crate::domain::{CalorieEntry, WaterEntry, WeightEntry, Workout};
use crate::export::{format_number, optional_number, ExportData, ExportError};

#[derive(Debug, Serialize)]
struct CalorieRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Food")]
    food: &'a str,
    #[serde(rename = "Meal")]
    meal: String,
    #[serde(rename = "Calories")]
    calories: String,
    #[serde(rename = "Protein")]
    protein: String,
    #[serde(rename = "Carbs")]
    carbs: String,
    #[serde(rename = "Fat")]
    fat: String,
}

impl<'a> From<&'a CalorieEntry> for CalorieRow<'a> {
    fn from(entry: &'a CalorieEntry) -> Self {
        Self {
            date: entry.date.to_string(),
            food: &entry.food_name,
            meal: entry.meal_type.to_string(),
            calories: format_number(entry.calories),
            protein: optional_number(entry.macros.protein_g),
            carbs: optional_number(entry.macros.carbs_g),
            fat: optional_number(entry.macros.fat_g),
        }
    }
}

#[derive(Debug, Serialize)]
struct WorkoutRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Exercise")]
    exercise: &'a str,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Duration")]
    duration: String,
    #[serde(rename = "Calories Burned")]
    calories_burned: String,
    #[serde(rename = "Sets")]
    sets: Option<u32>,
    #[serde(rename = "Reps")]
    reps: Option<u32>,
    #[serde(rename = "Weight")]
    weight: String,
}

impl<'a> From<&'a Workout> for WorkoutRow<'a> {
    fn from(workout: &'a Workout) -> Self {
        Self {
            date: workout.date.to_string(),
            exercise: &workout.exercise,
            category: workout.category.to_string(),
            duration: optional_number(workout.details.duration_minutes),
            calories_burned: optional_number(workout.details.calories_burned),
            sets: workout.details.sets,
            reps: workout.details.reps,
            weight: optional_number(workout.details.weight_kg),
        }
    }
}

#[derive(Debug, Serialize)]
struct WeightRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Weight (kg)")]
    weight_kg: String,
}

impl From<&WeightEntry> for WeightRow {
    fn from(entry: &WeightEntry) -> Self {
        Self {
            date: entry.date.to_string(),
            weight_kg: format_number(entry.weight_kg),
        }
    }
}

#[derive(Debug, Serialize)]
struct WaterRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Amount (ml)")]
    amount_ml: String,
}

impl From<&WaterEntry> for WaterRow {
    fn from(entry: &WaterEntry) -> Self {
        Self {
            date: entry.date.to_string(),
            amount_ml: format_number(entry.amount_ml),
        }
    }
}

/// Write one titled section; empty sections still get their header row
fn write_section<R: Serialize>(
    out: &mut String,
    title: &str,
    headers: &[&str],
    rows: impl Iterator<Item = R>,
) -> Result<usize, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;

    out.push_str(title);
    out.push('\n');
    out.push_str(&String::from_utf8(bytes)?);
    out.push('\n');
    Ok(count)
}

/// Render the data set as sectioned CSV
pub fn to_csv(data: &ExportData) -> Result<String, ExportError> {
    let mut out = String::new();

    write_section(
        &mut out,
        "Calories",
        &["Date", "Food", "Meal", "Calories", "Protein", "Carbs", "Fat"],
        data.calories.iter().map(CalorieRow::from),
    )?;
    write_section(
        &mut out,
        "Workouts",
        &[
            "Date",
            "Exercise",
            "Category",
            "Duration",
            "Calories Burned",
            "Sets",
            "Reps",
            "Weight",
        ],
        data.workouts.iter().map(WorkoutRow::from),
    )?;
    write_section(
        &mut out,
        "Weight",
        &["Date", "Weight (kg)"],
        data.weights.iter().map(WeightRow::from),
    )?;
    write_section(
        &mut out,
        "Water",
        &["Date", "Amount (ml)"],
        data.water.iter().map(WaterRow::from),
    )?;

    tracing::debug!("Rendered CSV export ({} bytes)", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExerciseDetails, Macros, MealType, UserId, WorkoutCategory};
    use chrono::NaiveDate;

    fn user() -> UserId {
        UserId::new("csv").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    /// Lines between a section title and the following blank line
    fn section<'a>(csv: &'a str, title: &str) -> Vec<&'a str> {
        csv.lines()
            .skip_while(|l| *l != title)
            .skip(1)
            .take_while(|l| !l.is_empty())
            .collect()
    }

    #[test]
    fn test_sections_and_headers() {
        let data = ExportData {
            calories: vec![CalorieEntry::new(
                user(),
                day(1),
                "Apple, raw".to_string(),
                95.0,
                Macros { protein_g: Some(0.5), carbs_g: Some(25.0), fat_g: None },
                MealType::Snack,
                None,
            )
            .unwrap()],
            workouts: vec![Workout::new(
                user(),
                day(1),
                "Squat".to_string(),
                WorkoutCategory::Strength,
                ExerciseDetails { sets: Some(5), reps: Some(5), weight_kg: Some(100.0), ..Default::default() },
                None,
            )
            .unwrap()],
            ..Default::default()
        };

        let csv = to_csv(&data).unwrap();

        let calories = section(&csv, "Calories");
        assert_eq!(calories[0], "Date,Food,Meal,Calories,Protein,Carbs,Fat");
        assert_eq!(calories[1], "2024-07-01,\"Apple, raw\",snack,95,0.5,25,");

        let workouts = section(&csv, "Workouts");
        assert_eq!(
            workouts[0],
            "Date,Exercise,Category,Duration,Calories Burned,Sets,Reps,Weight"
        );
        assert_eq!(workouts[1], "2024-07-01,Squat,strength,,,5,5,100");

        assert_eq!(section(&csv, "Weight"), vec!["Date,Weight (kg)"]);
        assert_eq!(section(&csv, "Water"), vec!["Date,Amount (ml)"]);
    }

    #[test]
    fn test_row_count_matches_records() {
        let data = ExportData {
            water: (1..=9)
                .map(|d| WaterEntry::new(user(), day(d), 250.0).unwrap())
                .collect(),
            ..Default::default()
        };
        let csv = to_csv(&data).unwrap();
        assert_eq!(section(&csv, "Water").len(), 1 + 9);
    }
}
