use fitness_tracker_mcp::domain::{
    bmr, calorie_target, tdee, ActivityLevel, BodyGoal, CalorieTargets, Gender, Profile,
};

#[test]
fn test_bmr_reference_values() {
    assert_eq!(bmr(Gender::Male, 25, 175.0, 70.0), 1674);
    assert_eq!(bmr(Gender::Female, 25, 175.0, 70.0), 1508);
    assert_eq!(bmr(Gender::Male, 25, 170.0, 70.0), 1643);
}

#[test]
fn test_tdee_multiplies_and_rounds() {
    assert_eq!(tdee(1674, ActivityLevel::Sedentary), 2009);
    assert_eq!(tdee(1000, ActivityLevel::VeryActive), 1900);
    assert_eq!(tdee(1500, ActivityLevel::Light), 2063);
}

#[test]
fn test_goal_factors() {
    assert_eq!(calorie_target(2000, BodyGoal::FatLoss), 1500);
    assert_eq!(calorie_target(2000, BodyGoal::MuscleGain), 2300);
    assert_eq!(calorie_target(2000, BodyGoal::Maintain), 2000);
    assert_eq!(calorie_target(2009, BodyGoal::FatLoss), 1507);
}

#[test]
fn test_targets_need_every_input() {
    let profile = Profile {
        gender: Gender::Female,
        age: 30,
        height_cm: 165.0,
        weight_kg: 60.0,
    };

    let targets = CalorieTargets::compute(
        Some(&profile),
        Some(ActivityLevel::Moderate),
        Some(BodyGoal::Maintain),
    )
    .unwrap();
    assert_eq!(targets.bmr, 1320);
    assert_eq!(targets.tdee, 2046);
    assert_eq!(targets.daily_calories, 2046);

    assert!(CalorieTargets::compute(Some(&profile), None, Some(BodyGoal::Maintain)).is_err());
    assert!(CalorieTargets::compute(None, Some(ActivityLevel::Active), Some(BodyGoal::Maintain)).is_err());
}
