/// Tools for achievements
///
/// achievements_check unlocks anything newly earned; achievements_list shows
/// every achievement with progress. Both re-derive their metrics on each call.

use serde::Serialize;

use crate::analytics::AchievementProgress;
use crate::domain::AchievementDefinition;
use crate::session::Session;
use crate::storage::RecordStore;
use crate::tools::ToolError;

#[derive(Debug, Serialize)]
pub struct CheckAchievementsResponse {
    pub message: String,
    pub unlocked: Vec<AchievementDefinition>,
}

pub fn check<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
) -> Result<CheckAchievementsResponse, ToolError> {
    let unlocked: Vec<AchievementDefinition> = session
        .analytics()
        .check_achievements(storage, session.user())?
        .into_iter()
        .copied()
        .collect();

    let message = if unlocked.is_empty() {
        "No new achievements this time. Keep going!".to_string()
    } else {
        let mut lines = vec![format!("🏆 {} new achievement(s) unlocked!", unlocked.len())];
        for achievement in &unlocked {
            lines.push(format!(
                "  {} {}: {}",
                achievement.icon, achievement.name, achievement.description
            ));
        }
        lines.join("\n")
    };

    Ok(CheckAchievementsResponse { message, unlocked })
}

#[derive(Debug, Serialize)]
pub struct ListAchievementsResponse {
    pub message: String,
    pub unlocked_count: usize,
    pub achievements: Vec<AchievementProgress>,
}

pub fn list<S: RecordStore + ?Sized>(
    storage: &S,
    session: &Session,
) -> Result<ListAchievementsResponse, ToolError> {
    let achievements = session
        .analytics()
        .achievement_progress(storage, session.user())?;
    let unlocked_count = achievements.iter().filter(|a| a.unlocked).count();

    let mut lines = vec![format!(
        "🏆 Achievements: {}/{} unlocked",
        unlocked_count,
        achievements.len()
    )];
    for achievement in &achievements {
        if achievement.unlocked {
            lines.push(format!("  {} {} ✓", achievement.icon, achievement.name));
        } else {
            lines.push(format!(
                "  🔒 {}: {} ({}%)",
                achievement.name, achievement.description, achievement.percent
            ));
        }
    }

    Ok(ListAchievementsResponse {
        message: lines.join("\n"),
        unlocked_count,
        achievements,
    })
}
