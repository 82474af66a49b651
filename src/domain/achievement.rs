/// Achievement catalog and unlock records
///
/// The catalog is fixed. Each definition names the metric it watches and the
/// threshold that unlocks it; the engine in `analytics::achievements` derives
/// the metrics and writes `AchievementUnlock` records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RecordId, UserId};

/// Metric an achievement is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementMetric {
    /// Current consecutive days with at least one workout
    WorkoutStreak,
    /// Workouts logged, all time
    TotalWorkouts,
    /// Calories burned across all workouts
    CaloriesBurned,
    /// Days with calories logged in the last 7 days
    PerfectWeek,
    /// Days with calories logged in the last 30 days
    PerfectMonth,
    /// Best current streak across habits
    HabitStreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub metric: AchievementMetric,
    pub threshold: f64,
}

pub const ACHIEVEMENTS: &[AchievementDefinition] = &[
    AchievementDefinition {
        id: "first_workout",
        name: "First Step",
        description: "Log your first workout",
        icon: "🏃",
        metric: AchievementMetric::TotalWorkouts,
        threshold: 1.0,
    },
    AchievementDefinition {
        id: "workouts_10",
        name: "Getting Serious",
        description: "Log 10 workouts",
        icon: "💪",
        metric: AchievementMetric::TotalWorkouts,
        threshold: 10.0,
    },
    AchievementDefinition {
        id: "workouts_50",
        name: "Dedicated",
        description: "Log 50 workouts",
        icon: "🏋️",
        metric: AchievementMetric::TotalWorkouts,
        threshold: 50.0,
    },
    AchievementDefinition {
        id: "workouts_100",
        name: "Century Club",
        description: "Log 100 workouts",
        icon: "💯",
        metric: AchievementMetric::TotalWorkouts,
        threshold: 100.0,
    },
    AchievementDefinition {
        id: "streak_3",
        name: "On a Roll",
        description: "Work out 3 days in a row",
        icon: "🔥",
        metric: AchievementMetric::WorkoutStreak,
        threshold: 3.0,
    },
    AchievementDefinition {
        id: "streak_7",
        name: "Week Warrior",
        description: "Work out 7 days in a row",
        icon: "⚡",
        metric: AchievementMetric::WorkoutStreak,
        threshold: 7.0,
    },
    AchievementDefinition {
        id: "streak_30",
        name: "Unstoppable",
        description: "Work out 30 days in a row",
        icon: "🏆",
        metric: AchievementMetric::WorkoutStreak,
        threshold: 30.0,
    },
    AchievementDefinition {
        id: "burn_1000",
        name: "Calorie Crusher",
        description: "Burn 1,000 calories through workouts",
        icon: "🔥",
        metric: AchievementMetric::CaloriesBurned,
        threshold: 1_000.0,
    },
    AchievementDefinition {
        id: "burn_10000",
        name: "Furnace",
        description: "Burn 10,000 calories through workouts",
        icon: "🌋",
        metric: AchievementMetric::CaloriesBurned,
        threshold: 10_000.0,
    },
    AchievementDefinition {
        id: "burn_50000",
        name: "Inferno",
        description: "Burn 50,000 calories through workouts",
        icon: "☄️",
        metric: AchievementMetric::CaloriesBurned,
        threshold: 50_000.0,
    },
    AchievementDefinition {
        id: "perfect_week",
        name: "Perfect Week",
        description: "Log your food every day for a week",
        icon: "📅",
        metric: AchievementMetric::PerfectWeek,
        threshold: 7.0,
    },
    AchievementDefinition {
        id: "perfect_month",
        name: "Perfect Month",
        description: "Log your food every day for 30 days",
        icon: "🗓️",
        metric: AchievementMetric::PerfectMonth,
        threshold: 30.0,
    },
    AchievementDefinition {
        id: "habit_streak_7",
        name: "Habit Former",
        description: "Keep a habit going for 7 days",
        icon: "✅",
        metric: AchievementMetric::HabitStreak,
        threshold: 7.0,
    },
    AchievementDefinition {
        id: "habit_streak_30",
        name: "Habit Master",
        description: "Keep a habit going for 30 days",
        icon: "🌟",
        metric: AchievementMetric::HabitStreak,
        threshold: 30.0,
    },
];

/// Look up a catalog entry by id
pub fn find_achievement(id: &str) -> Option<&'static AchievementDefinition> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Record that a user unlocked an achievement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementUnlock {
    pub id: RecordId,
    pub user_id: UserId,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

impl AchievementUnlock {
    pub fn new(user_id: UserId, achievement_id: &str) -> Self {
        Self {
            id: RecordId::generate(),
            user_id,
            achievement_id: achievement_id.to_string(),
            unlocked_at: Utc::now(),
        }
    }
}
