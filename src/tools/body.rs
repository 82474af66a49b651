/// Tools for body metrics: weight, water and measurements
///
/// Weights are entered and shown in the user's preferred units and stored in
/// kilograms. Measurements are entered in cm or inches the same way.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::WeightStats;
use crate::domain::{
    MeasurementEntry, Measurements, Units, WaterEntry, WeightEntry,
};
use crate::export::format_number;
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::{parse_range, resolve_date, ToolError};

pub(crate) fn show_weight(kg: f64, units: Units) -> String {
    format!(
        "{} {}",
        format_number((units.weight_from_kg(kg) * 10.0).round() / 10.0),
        units.weight_label()
    )
}

/// Parameters for logging a weigh-in
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogWeightParams {
    /// Body weight in kg or lb per your units setting
    pub weight: f64,
    pub note: Option<String>,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogWeightResponse {
    pub message: String,
    pub entry: WeightEntry,
    /// Change in kg since the previous weigh-in
    pub change_kg: Option<f64>,
}

pub fn log_weight<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: LogWeightParams,
) -> Result<LogWeightResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let units = storage.load_settings(session.user())?.units;

    let entry = WeightEntry::new(
        session.user().clone(),
        date,
        units.weight_to_kg(params.weight),
        params.note,
    )?;

    let previous: Option<WeightEntry> = storage
        .list_records::<WeightEntry>(session.user(), DateFilter::Any)?
        .into_iter()
        .filter(|w| w.date <= date)
        .max_by_key(|w| (w.date, w.created_at));

    storage.insert_record(&entry)?;
    tracing::debug!("Logged weight for {} on {}", session.user(), date);

    let change_kg = previous.map(|p| entry.weight_kg - p.weight_kg);
    let change = match change_kg {
        Some(delta) if delta.abs() >= 0.05 => {
            let sign = if delta > 0.0 { "+" } else { "-" };
            format!(" ({}{} since last weigh-in)", sign, show_weight(delta.abs(), units))
        }
        Some(_) => " (no change since last weigh-in)".to_string(),
        None => String::new(),
    };

    Ok(LogWeightResponse {
        message: format!(
            "⚖️ Logged {} on {}{}",
            show_weight(entry.weight_kg, units),
            date,
            change
        ),
        entry,
        change_kg,
    })
}

/// Parameters for weight statistics
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeightStatsParams {
    /// week, month, 3months, year or all (default month)
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WeightStatsResponse {
    pub message: String,
    pub units: Units,
    pub stats: WeightStats,
}

pub fn weight_stats<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: WeightStatsParams,
) -> Result<WeightStatsResponse, ToolError> {
    let range = parse_range(params.range.as_deref())?;
    let units = storage.load_settings(session.user())?.units;
    let stats = session.analytics().weight_stats(storage, session.user(), range)?;

    let message = match (stats.start_kg, stats.current_kg, stats.change_kg) {
        (Some(start), Some(current), Some(change)) => {
            let mut lines = vec![
                format!("⚖️ Weight from {} to {}:", stats.window.start, stats.window.end),
                format!("Start: {}, current: {}", show_weight(start, units), show_weight(current, units)),
                format!(
                    "Change: {}{}",
                    if change > 0.0 { "+" } else if change < 0.0 { "-" } else { "" },
                    show_weight(change.abs(), units)
                ),
            ];
            if let (Some(min), Some(max)) = (stats.min_kg, stats.max_kg) {
                lines.push(format!("Range: {} to {}", show_weight(min, units), show_weight(max, units)));
            }
            lines.push(format!("Trend: {}", stats.trend));
            lines.join("\n")
        }
        _ => format!(
            "No weigh-ins from {} to {}.",
            stats.window.start, stats.window.end
        ),
    };

    Ok(WeightStatsResponse {
        message,
        units,
        stats,
    })
}

/// Parameters for logging water
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogWaterParams {
    /// Amount in millilitres
    pub amount_ml: f64,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WaterDayResponse {
    pub message: String,
    pub date: NaiveDate,
    pub total_ml: f64,
    pub target_ml: f64,
    /// 0 to 100
    pub percent: f64,
    pub entries: Vec<WaterEntry>,
}

fn water_day<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    date: NaiveDate,
    headline: Option<String>,
) -> Result<WaterDayResponse, ToolError> {
    let entries: Vec<WaterEntry> = storage.list_records(session.user(), DateFilter::On(date))?;
    let target_ml = storage.load_settings(session.user())?.daily_water_target_ml;
    let total_ml: f64 = entries.iter().map(|e| e.amount_ml).sum();
    let percent = if target_ml > 0.0 {
        (total_ml / target_ml * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let progress = format!(
        "💧 {} / {} ml on {} ({:.0}%)",
        format_number(total_ml),
        format_number(target_ml),
        date,
        percent
    );
    let message = match headline {
        Some(headline) => format!("{}\n{}", headline, progress),
        None => progress,
    };

    Ok(WaterDayResponse {
        message,
        date,
        total_ml,
        target_ml,
        percent,
        entries,
    })
}

pub fn log_water<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: LogWaterParams,
) -> Result<WaterDayResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let entry = WaterEntry::new(session.user().clone(), date, params.amount_ml)?;
    storage.insert_record(&entry)?;
    tracing::debug!("Logged {} ml water for {} on {}", entry.amount_ml, session.user(), date);

    water_day(
        storage,
        session,
        date,
        Some(format!("Logged {} ml of water.", format_number(entry.amount_ml))),
    )
}

/// Parameters for a day's water total
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WaterDayParams {
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

pub fn water_for_day<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: WaterDayParams,
) -> Result<WaterDayResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    water_day(storage, session, date, None)
}

/// Parameters for logging body measurements
///
/// Lengths are in cm or inches per your units setting.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct LogMeasurementsParams {
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hips: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
    pub neck: Option<f64>,
    /// Body fat percentage
    pub body_fat_pct: Option<f64>,
    /// Day in YYYY-MM-DD format (default today)
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogMeasurementsResponse {
    pub message: String,
    pub entry: MeasurementEntry,
}

pub fn log_measurements<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: LogMeasurementsParams,
) -> Result<LogMeasurementsResponse, ToolError> {
    let date = resolve_date(session, params.date.as_deref())?;
    let units = storage.load_settings(session.user())?.units;
    let cm = |value: Option<f64>| value.map(|v| units.length_to_cm(v));

    let entry = MeasurementEntry::new(
        session.user().clone(),
        date,
        Measurements {
            chest_cm: cm(params.chest),
            waist_cm: cm(params.waist),
            hips_cm: cm(params.hips),
            arms_cm: cm(params.arms),
            thighs_cm: cm(params.thighs),
            neck_cm: cm(params.neck),
            body_fat_pct: params.body_fat_pct,
        },
    )?;
    storage.insert_record(&entry)?;
    tracing::debug!("Logged measurements for {} on {}", session.user(), date);

    Ok(LogMeasurementsResponse {
        message: format!("📏 Logged measurements for {}", date),
        entry,
    })
}

/// Parameters for listing measurements
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListMeasurementsParams {
    /// week, month, 3months, year or all (default all)
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListMeasurementsResponse {
    pub message: String,
    pub entries: Vec<MeasurementEntry>,
}

pub fn list_measurements<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ListMeasurementsParams,
) -> Result<ListMeasurementsResponse, ToolError> {
    let entries: Vec<MeasurementEntry> = match params.range.as_deref() {
        Some(range) if !range.trim().is_empty() => {
            let window = parse_range(Some(range))?.resolve(session.today());
            storage.list_in_window(session.user(), window)?
        }
        _ => storage.list_records(session.user(), DateFilter::Any)?,
    };

    let message = if entries.is_empty() {
        "No measurements logged yet.".to_string()
    } else {
        let mut lines = vec![format!("📏 {} measurement set(s):", entries.len())];
        for entry in &entries {
            let m = &entry.measurements;
            let parts: Vec<String> = [
                ("chest", m.chest_cm),
                ("waist", m.waist_cm),
                ("hips", m.hips_cm),
                ("arms", m.arms_cm),
                ("thighs", m.thighs_cm),
                ("neck", m.neck_cm),
            ]
            .iter()
            .filter_map(|(name, value)| value.map(|v| format!("{} {} cm", name, format_number(v))))
            .chain(m.body_fat_pct.map(|pct| format!("body fat {}%", format_number(pct))))
            .collect();
            lines.push(format!("  • {}: {} [{}]", entry.date, parts.join(", "), entry.id));
        }
        lines.join("\n")
    };

    Ok(ListMeasurementsResponse { message, entries })
}
