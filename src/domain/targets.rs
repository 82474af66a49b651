/// Calorie-target formulas
///
/// BMR uses Mifflin-St Jeor, TDEE scales BMR by a fixed activity multiplier,
/// and the daily target adjusts TDEE by a fixed factor per body goal.

use serde::{Deserialize, Serialize};

use crate::domain::{ActivityLevel, BodyGoal, DomainError, Gender, Profile};

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl BodyGoal {
    pub fn calorie_factor(self) -> f64 {
        match self {
            BodyGoal::FatLoss => 0.75,
            BodyGoal::WeightLoss => 0.85,
            BodyGoal::MuscleGain => 1.15,
            BodyGoal::BodyRecomposition => 0.95,
            BodyGoal::Maintain => 1.0,
        }
    }
}

/// Basal metabolic rate in kcal/day, rounded
pub fn bmr(gender: Gender, age: u32, height_cm: f64, weight_kg: f64) -> u32 {
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    let value = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + offset;
    value.round().max(0.0) as u32
}

/// Total daily energy expenditure, rounded
pub fn tdee(bmr: u32, activity: ActivityLevel) -> u32 {
    (f64::from(bmr) * activity.multiplier()).round() as u32
}

/// Daily calorie target for a body goal, rounded
pub fn calorie_target(tdee: u32, goal: BodyGoal) -> u32 {
    (f64::from(tdee) * goal.calorie_factor()).round() as u32
}

/// Daily macro split in grams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

impl MacroTargets {
    /// 30% protein, 40% carbs, 30% fat of the calorie target
    pub fn for_calories(kcal: u32) -> Self {
        let kcal = f64::from(kcal);
        Self {
            protein_g: (kcal * 0.30 / 4.0).round() as u32,
            carbs_g: (kcal * 0.40 / 4.0).round() as u32,
            fat_g: (kcal * 0.30 / 9.0).round() as u32,
        }
    }
}

/// Everything the onboarding flow computes from a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieTargets {
    pub bmr: u32,
    pub tdee: u32,
    pub daily_calories: u32,
    pub macros: MacroTargets,
}

impl CalorieTargets {
    /// Compute targets; every input is required
    pub fn compute(
        profile: Option<&Profile>,
        activity: Option<ActivityLevel>,
        goal: Option<BodyGoal>,
    ) -> Result<Self, DomainError> {
        let profile = profile.ok_or(DomainError::MissingProfileField("profile"))?;
        let activity = activity.ok_or(DomainError::MissingProfileField("activity_level"))?;
        let goal = goal.ok_or(DomainError::MissingProfileField("body_goal"))?;

        let bmr = bmr(profile.gender, profile.age, profile.height_cm, profile.weight_kg);
        let tdee = tdee(bmr, activity);
        let daily_calories = calorie_target(tdee, goal);

        Ok(Self {
            bmr,
            tdee,
            daily_calories,
            macros: MacroTargets::for_calories(daily_calories),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmr_reference_values() {
        // 10*70 + 6.25*175 - 5*25 + 5 = 1673.75
        assert_eq!(bmr(Gender::Male, 25, 175.0, 70.0), 1674);
        assert_eq!(bmr(Gender::Female, 25, 175.0, 70.0), 1508);
        assert_eq!(bmr(Gender::Male, 25, 170.0, 70.0), 1643);
    }

    #[test]
    fn test_tdee_sedentary() {
        assert_eq!(tdee(1674, ActivityLevel::Sedentary), 2009);
        assert_eq!(tdee(1674, ActivityLevel::VeryActive), 3181);
    }

    #[test]
    fn test_calorie_target_by_goal() {
        assert_eq!(calorie_target(2009, BodyGoal::FatLoss), 1507);
        assert_eq!(calorie_target(2009, BodyGoal::MuscleGain), 2310);
        assert_eq!(calorie_target(2009, BodyGoal::Maintain), 2009);
    }

    #[test]
    fn test_compute_requires_profile() {
        let err = CalorieTargets::compute(None, Some(ActivityLevel::Light), Some(BodyGoal::Maintain));
        assert!(matches!(err, Err(DomainError::MissingProfileField("profile"))));
    }

    #[test]
    fn test_compute_full_chain() {
        let profile = Profile::new(Gender::Male, 25, 175.0, 70.0).unwrap();
        let targets = CalorieTargets::compute(
            Some(&profile),
            Some(ActivityLevel::Sedentary),
            Some(BodyGoal::FatLoss),
        )
        .unwrap();
        assert_eq!(targets.bmr, 1674);
        assert_eq!(targets.tdee, 2009);
        assert_eq!(targets.daily_calories, 1507);
        assert_eq!(targets.macros.protein_g, 113);
    }
}
