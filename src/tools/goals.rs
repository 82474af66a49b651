/// Tools for goals
///
/// This module implements goal_create, goal_list and goal_update. Weight
/// targets are entered in the user's units and stored in kilograms.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analytics::GoalProgress;
use crate::domain::{parse_date, Goal, GoalPeriod, GoalType, Units};
use crate::export::format_number;
use crate::session::Session;
use crate::storage::{DateFilter, RecordStore};
use crate::tools::{parse_label, parse_or, record_id, short_id, ToolError};

fn target_to_stored(goal_type: GoalType, target: f64, units: Units) -> f64 {
    match goal_type {
        GoalType::Weight => units.weight_to_kg(target),
        _ => target,
    }
}

fn unit_label(goal_type: GoalType, units: Units) -> &'static str {
    match goal_type {
        GoalType::Calories => "kcal",
        GoalType::Workouts => "workouts",
        GoalType::Water => "ml",
        GoalType::Weight => units.weight_label(),
        GoalType::HabitCompletions => "completions",
    }
}

fn show_value(goal_type: GoalType, value: f64, units: Units) -> String {
    let shown = match goal_type {
        GoalType::Weight => (units.weight_from_kg(value) * 10.0).round() / 10.0,
        _ => value.round(),
    };
    format!("{} {}", format_number(shown), unit_label(goal_type, units))
}

/// Parameters for creating a goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateGoalParams {
    /// calories, workouts, water, weight or habit_completions
    pub goal_type: String,
    /// Target value (kcal, workouts, ml, kg/lb, completions)
    pub target: f64,
    /// daily, weekly or monthly (default weekly)
    pub period: Option<String>,
    pub title: Option<String>,
    /// Deadline in YYYY-MM-DD format
    pub deadline: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateGoalResponse {
    pub message: String,
    pub goal: Goal,
}

pub fn create_goal<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: CreateGoalParams,
) -> Result<CreateGoalResponse, ToolError> {
    let goal_type: GoalType = parse_label(&params.goal_type)?;
    let period = parse_or(params.period.as_deref(), GoalPeriod::Weekly)?;
    let deadline = match params.deadline.as_deref() {
        Some(d) if !d.trim().is_empty() => Some(parse_date(d)?),
        _ => None,
    };
    let units = storage.load_settings(session.user())?.units;

    let goal = Goal::new(
        session.user().clone(),
        goal_type,
        target_to_stored(goal_type, params.target, units),
        period,
        params.title.filter(|t| !t.trim().is_empty()),
        deadline,
    )?;
    storage.insert_record(&goal)?;
    tracing::debug!("Created goal {} for {}", goal.id, session.user());

    Ok(CreateGoalResponse {
        message: format!(
            "🎯 Created {} goal: {} {} (ID: {})",
            goal.period,
            goal.goal_type,
            show_value(goal_type, goal.target, units),
            short_id(&goal.id)
        ),
        goal,
    })
}

/// Parameters for listing goals
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListGoalsParams {
    /// Include goals that are no longer active
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Serialize)]
pub struct GoalWithProgress {
    pub goal: Goal,
    /// Present for active goals
    pub progress: Option<GoalProgress>,
}

#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub message: String,
    pub goals: Vec<GoalWithProgress>,
}

pub fn list_goals<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: ListGoalsParams,
) -> Result<ListGoalsResponse, ToolError> {
    let units = storage.load_settings(session.user())?.units;
    let mut goals: Vec<Goal> = storage.list_records(session.user(), DateFilter::Any)?;
    goals.retain(|g| g.active || params.include_inactive);
    goals.sort_by_key(|g| (!g.active, g.created_at));

    let mut listed = Vec::with_capacity(goals.len());
    for goal in goals {
        let progress = if goal.active {
            Some(GoalProgress::measure(storage, session.user(), &goal, session.today())?)
        } else {
            None
        };
        listed.push(GoalWithProgress { goal, progress });
    }

    let message = if listed.is_empty() {
        "No goals yet. Create one with goal_create.".to_string()
    } else {
        let mut lines = vec![format!("🎯 {} goal(s):", listed.len())];
        for item in &listed {
            let goal = &item.goal;
            let line = match &item.progress {
                Some(p) => format!(
                    "  {} {}: {} of {} ({:.0}%) [{}]",
                    if p.achieved { "✅" } else { "•" },
                    p.title,
                    show_value(goal.goal_type, p.current, units),
                    show_value(goal.goal_type, p.target, units),
                    p.percent,
                    goal.id
                ),
                None => format!("  ⏸️ {} (inactive) [{}]", goal.display_title(), goal.id),
            };
            lines.push(line);
        }
        lines.join("\n")
    };

    Ok(ListGoalsResponse {
        message,
        goals: listed,
    })
}

/// Parameters for updating a goal
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateGoalParams {
    pub goal_id: String,
    pub target: Option<f64>,
    /// daily, weekly or monthly
    pub period: Option<String>,
    /// New title; an empty string clears it
    pub title: Option<String>,
    /// New deadline in YYYY-MM-DD format; an empty string clears it
    pub deadline: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UpdateGoalResponse {
    pub message: String,
    pub goal: Goal,
}

pub fn update_goal<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: UpdateGoalParams,
) -> Result<UpdateGoalResponse, ToolError> {
    let goal_id = record_id(&params.goal_id, "Goal ID")?;
    let mut goal: Goal = storage.require_record(session.user(), &goal_id)?;
    let units = storage.load_settings(session.user())?.units;

    let period = match params.period.as_deref() {
        Some(p) => Some(parse_label::<GoalPeriod>(p)?),
        None => None,
    };
    let title = params
        .title
        .map(|t| if t.trim().is_empty() { None } else { Some(t) });
    let deadline = match params.deadline.as_deref() {
        Some(d) if d.trim().is_empty() => Some(None),
        Some(d) => Some(Some(parse_date(d)?)),
        None => None,
    };

    goal.update(
        params.target.map(|t| target_to_stored(goal.goal_type, t, units)),
        period,
        title,
        deadline,
        params.active,
    )?;
    storage.replace_record(&goal)?;
    tracing::debug!("Updated goal {}", goal.id);

    Ok(UpdateGoalResponse {
        message: format!("🎯 Updated goal '{}'", goal.display_title()),
        goal,
    })
}
