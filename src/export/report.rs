/// Plain-text progress report
///
/// A summary block followed by one table per section. Sections longer than
/// the row limit are cut and the number of hidden rows is printed.

use std::fmt::Write;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::analytics::{CalorieStats, WeightStats};
use crate::domain::{DateWindow, Units};
use crate::export::{format_number, optional_number, ExportData};

/// Rows shown per section unless configured otherwise
pub const REPORT_ROW_LIMIT: usize = 50;

#[derive(Tabled)]
struct CalorieLine {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Meal")]
    meal: String,
    #[tabled(rename = "Food")]
    food: String,
    #[tabled(rename = "Calories")]
    calories: String,
    #[tabled(rename = "P/C/F (g)")]
    macros: String,
}

#[derive(Tabled)]
struct WorkoutLine {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Minutes")]
    minutes: String,
    #[tabled(rename = "Burned")]
    burned: String,
}

#[derive(Tabled)]
struct WeightLine {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

#[derive(Tabled)]
struct WaterLine {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount (ml)")]
    amount: String,
}

fn push_table<T: Tabled>(out: &mut String, title: &str, rows: Vec<T>, total: usize, numeric_from: usize) {
    let _ = writeln!(out, "\n{} ({})", title, total);
    if rows.is_empty() {
        out.push_str("No entries\n");
        return;
    }

    let shown = rows.len();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(numeric_from..)).with(Alignment::right()))
        .to_string();
    out.push_str(&table);
    out.push('\n');

    if total > shown {
        let _ = writeln!(out, "... {} more not shown", total - shown);
    }
}

/// Render the report; weights are shown in the user's units
pub fn render_report(data: &ExportData, window: DateWindow, units: Units, row_limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Fitness Report: {} to {}", window.start, window.end);

    let calories = CalorieStats::compute(&data.calories, window);
    let weight = WeightStats::compute(&data.weights, window);
    let minutes: f64 = data.workouts.iter().map(|w| w.duration_minutes()).sum();
    let burned: f64 = data.workouts.iter().map(|w| w.calories_burned()).sum();
    let water: f64 = data.water.iter().map(|w| w.amount_ml).sum();
    let unit = units.weight_label();

    let _ = writeln!(
        out,
        "Calories: {} kcal over {} days (avg {}/day)",
        format_number(calories.total_calories.round()),
        calories.days_logged,
        format_number(calories.average_per_day.round())
    );
    let _ = writeln!(
        out,
        "Workouts: {} sessions, {} min, {} kcal burned",
        data.workouts.len(),
        format_number(minutes.round()),
        format_number(burned.round())
    );
    if let (Some(start), Some(current)) = (weight.start_kg, weight.current_kg) {
        let _ = writeln!(
            out,
            "Weight: {} {unit} -> {} {unit} ({:+.1} {unit})",
            format_number(units.weight_from_kg(start)),
            format_number(units.weight_from_kg(current)),
            units.weight_from_kg(current) - units.weight_from_kg(start),
        );
    }
    let _ = writeln!(out, "Water: {} ml", format_number(water));

    let calorie_rows = data
        .calories
        .iter()
        .take(row_limit)
        .map(|e| CalorieLine {
            date: e.date.to_string(),
            meal: e.meal_type.to_string(),
            food: e.food_name.clone(),
            calories: format_number(e.calories),
            macros: format!(
                "{}/{}/{}",
                optional_number(e.macros.protein_g),
                optional_number(e.macros.carbs_g),
                optional_number(e.macros.fat_g)
            ),
        })
        .collect();
    push_table(&mut out, "Calories", calorie_rows, data.calories.len(), 3);

    let workout_rows = data
        .workouts
        .iter()
        .take(row_limit)
        .map(|w| WorkoutLine {
            date: w.date.to_string(),
            exercise: w.exercise.clone(),
            category: w.category.to_string(),
            minutes: optional_number(w.details.duration_minutes),
            burned: optional_number(w.details.calories_burned),
        })
        .collect();
    push_table(&mut out, "Workouts", workout_rows, data.workouts.len(), 3);

    let weight_rows = data
        .weights
        .iter()
        .take(row_limit)
        .map(|w| WeightLine {
            date: w.date.to_string(),
            weight: format!("{} {}", format_number(units.weight_from_kg(w.weight_kg)), unit),
        })
        .collect();
    push_table(&mut out, "Weight", weight_rows, data.weights.len(), 1);

    let water_rows = data
        .water
        .iter()
        .take(row_limit)
        .map(|w| WaterLine {
            date: w.date.to_string(),
            amount: format_number(w.amount_ml),
        })
        .collect();
    push_table(&mut out, "Water", water_rows, data.water.len(), 1);

    out
}
