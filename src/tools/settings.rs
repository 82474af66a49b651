/// Tools for settings, onboarding and calorie targets
///
/// Heights and weights are entered in the units chosen in the same call, or
/// the saved units when none is given, and stored in cm and kg.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ActivityLevel, BodyGoal, CalorieTargets, DomainError, Gender, Profile, Units, UserSettings,
};
use crate::export::format_number;
use crate::session::Session;
use crate::storage::RecordStore;
use crate::tools::{parse_label, ToolError};

/// Profile fields as entered by the user
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProfileInput {
    /// male or female
    pub gender: Option<String>,
    pub age: Option<u32>,
    /// Height in cm, or inches for imperial units
    pub height: Option<f64>,
    /// Weight in kg, or lb for imperial units
    pub weight: Option<f64>,
}

impl ProfileInput {
    fn is_empty(&self) -> bool {
        self.gender.is_none() && self.age.is_none() && self.height.is_none() && self.weight.is_none()
    }

    /// Merge over an existing profile; without one every field is required
    fn resolve(&self, existing: Option<&Profile>, units: Units) -> Result<Profile, ToolError> {
        let gender = match self.gender.as_deref() {
            Some(g) => parse_label::<Gender>(g)?,
            None => existing
                .map(|p| p.gender)
                .ok_or(DomainError::MissingProfileField("gender"))?,
        };
        let age = self
            .age
            .or(existing.map(|p| p.age))
            .ok_or(DomainError::MissingProfileField("age"))?;
        let height_cm = self
            .height
            .map(|h| units.length_to_cm(h))
            .or(existing.map(|p| p.height_cm))
            .ok_or(DomainError::MissingProfileField("height"))?;
        let weight_kg = self
            .weight
            .map(|w| units.weight_to_kg(w))
            .or(existing.map(|p| p.weight_kg))
            .ok_or(DomainError::MissingProfileField("weight"))?;

        Ok(Profile::new(gender, age, height_cm, weight_kg)?)
    }
}

fn optional_label<T>(value: Option<&str>) -> Result<Option<T>, ToolError>
where
    T: std::str::FromStr<Err = DomainError>,
{
    match value {
        Some(v) => Ok(Some(parse_label(v)?)),
        None => Ok(None),
    }
}

fn targets_lines(targets: &CalorieTargets) -> Vec<String> {
    vec![
        format!("BMR: {} kcal", targets.bmr),
        format!("TDEE: {} kcal", targets.tdee),
        format!("Daily target: {} kcal", targets.daily_calories),
        format!(
            "Macros: {} g protein, {} g carbs, {} g fat",
            targets.macros.protein_g, targets.macros.carbs_g, targets.macros.fat_g
        ),
    ]
}

fn settings_lines(settings: &UserSettings) -> Vec<String> {
    let units = settings.units;
    let mut lines = vec![
        format!("Units: {}", units),
        format!(
            "Body goal: {}",
            settings.body_goal.map(|g| g.to_string()).unwrap_or_else(|| "not set".to_string())
        ),
        format!(
            "Activity level: {}",
            settings.activity_level.map(|a| a.to_string()).unwrap_or_else(|| "not set".to_string())
        ),
        format!(
            "Daily calorie target: {}",
            settings
                .daily_calorie_target
                .map(|t| format!("{} kcal", t))
                .unwrap_or_else(|| "not set".to_string())
        ),
        format!("Daily water target: {} ml", format_number(settings.daily_water_target_ml)),
    ];
    if let Some(profile) = &settings.profile {
        lines.push(format!(
            "Profile: {}, {} years, {} cm, {} {}",
            profile.gender,
            profile.age,
            format_number(profile.height_cm.round()),
            format_number((units.weight_from_kg(profile.weight_kg) * 10.0).round() / 10.0),
            units.weight_label()
        ));
    }
    lines.push(format!("Reminders: {}", settings.reminders.len()));
    lines
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub message: String,
    pub settings: UserSettings,
    /// Present when the profile, goal and activity level are all set
    pub targets: Option<CalorieTargets>,
}

impl SettingsResponse {
    fn build(headline: &str, settings: UserSettings) -> Self {
        let targets = CalorieTargets::compute(
            settings.profile.as_ref(),
            settings.activity_level,
            settings.body_goal,
        )
        .ok();

        let mut lines = vec![headline.to_string()];
        lines.extend(settings_lines(&settings));
        if let Some(targets) = &targets {
            lines.extend(targets_lines(targets));
        }

        Self {
            message: lines.join("\n"),
            settings,
            targets,
        }
    }
}

pub fn get_settings<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
) -> Result<SettingsResponse, ToolError> {
    let settings = storage.load_settings(session.user())?;
    Ok(SettingsResponse::build("⚙️ Settings:", settings))
}

/// Parameters for updating settings; omitted fields are left unchanged
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateSettingsParams {
    /// metric or imperial
    pub units: Option<String>,
    /// fat_loss, weight_loss, muscle_gain, body_recomposition or maintain
    pub body_goal: Option<String>,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: Option<String>,
    pub daily_calorie_target: Option<u32>,
    pub daily_water_target_ml: Option<f64>,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

pub fn update_settings<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: UpdateSettingsParams,
) -> Result<SettingsResponse, ToolError> {
    let mut settings = storage.load_settings(session.user())?;

    if let Some(units) = optional_label::<Units>(params.units.as_deref())? {
        settings.units = units;
    }
    if let Some(goal) = optional_label::<BodyGoal>(params.body_goal.as_deref())? {
        settings.body_goal = Some(goal);
    }
    if let Some(level) = optional_label::<ActivityLevel>(params.activity_level.as_deref())? {
        settings.activity_level = Some(level);
    }
    if let Some(kcal) = params.daily_calorie_target {
        settings.set_calorie_target(kcal)?;
    }
    if let Some(ml) = params.daily_water_target_ml {
        settings.set_water_target(ml)?;
    }
    if !params.profile.is_empty() {
        settings.profile = Some(params.profile.resolve(settings.profile.as_ref(), settings.units)?);
    }

    storage.save_settings(&mut settings)?;
    tracing::debug!("Updated settings for {}", session.user());
    Ok(SettingsResponse::build("⚙️ Settings updated:", settings))
}

/// Parameters for onboarding
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OnboardingParams {
    /// male or female
    pub gender: String,
    pub age: u32,
    /// Height in cm, or inches for imperial units
    pub height: f64,
    /// Weight in kg, or lb for imperial units
    pub weight: f64,
    /// fat_loss, weight_loss, muscle_gain, body_recomposition or maintain
    pub body_goal: String,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: String,
    /// metric or imperial (default: saved preference)
    pub units: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub message: String,
    pub settings: UserSettings,
    pub targets: CalorieTargets,
}

pub fn complete_onboarding<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: OnboardingParams,
) -> Result<OnboardingResponse, ToolError> {
    let mut settings = storage.load_settings(session.user())?;
    let units = optional_label::<Units>(params.units.as_deref())?.unwrap_or(settings.units);
    let body_goal: BodyGoal = parse_label(&params.body_goal)?;
    let activity_level: ActivityLevel = parse_label(&params.activity_level)?;
    let profile = ProfileInput {
        gender: Some(params.gender),
        age: Some(params.age),
        height: Some(params.height),
        weight: Some(params.weight),
    }
    .resolve(None, units)?;

    let targets = CalorieTargets::compute(Some(&profile), Some(activity_level), Some(body_goal))?;

    settings.units = units;
    settings.profile = Some(profile);
    settings.body_goal = Some(body_goal);
    settings.activity_level = Some(activity_level);
    settings.daily_calorie_target = Some(targets.daily_calories);
    settings.onboarding_complete = true;
    storage.save_settings(&mut settings)?;
    tracing::info!("Onboarding complete for {}", session.user());

    let mut lines = vec!["🎉 You're all set!".to_string()];
    lines.extend(targets_lines(&targets));

    Ok(OnboardingResponse {
        message: lines.join("\n"),
        settings,
        targets,
    })
}

/// Parameters for a targets calculation; saved values fill any gaps
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculateTargetsParams {
    #[serde(flatten)]
    pub profile: ProfileInput,
    /// fat_loss, weight_loss, muscle_gain, body_recomposition or maintain
    pub body_goal: Option<String>,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalculateTargetsResponse {
    pub message: String,
    pub targets: CalorieTargets,
}

pub fn calculate_targets<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
    params: CalculateTargetsParams,
) -> Result<CalculateTargetsResponse, ToolError> {
    let settings = storage.load_settings(session.user())?;
    let profile = if params.profile.is_empty() {
        settings.profile
    } else {
        Some(params.profile.resolve(settings.profile.as_ref(), settings.units)?)
    };
    let body_goal = optional_label::<BodyGoal>(params.body_goal.as_deref())?.or(settings.body_goal);
    let activity_level =
        optional_label::<ActivityLevel>(params.activity_level.as_deref())?.or(settings.activity_level);

    let targets = CalorieTargets::compute(profile.as_ref(), activity_level, body_goal)?;
    let mut lines = vec!["🧮 Calculated targets:".to_string()];
    lines.extend(targets_lines(&targets));

    Ok(CalculateTargetsResponse {
        message: lines.join("\n"),
        targets,
    })
}
