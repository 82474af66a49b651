/// Goals: a numeric target over a daily, weekly or monthly period
///
/// Goals are one of the two record kinds that are replaced in place when
/// edited (the other is user settings).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{validate_name, DomainError, GoalPeriod, GoalType, RecordId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: RecordId,
    pub user_id: UserId,
    pub goal_type: GoalType,
    /// Target value in the goal type's natural unit (kcal, workouts, ml, kg, completions)
    pub target: f64,
    pub period: GoalPeriod,
    pub title: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        user_id: UserId,
        goal_type: GoalType,
        target: f64,
        period: GoalPeriod,
        title: Option<String>,
        deadline: Option<NaiveDate>,
    ) -> Result<Self, DomainError> {
        Self::validate_target(target)?;
        Self::validate_title(&title)?;

        let now = Utc::now();
        Ok(Self {
            id: RecordId::generate(),
            user_id,
            goal_type,
            target,
            period,
            title,
            deadline,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update with validation
    pub fn update(
        &mut self,
        target: Option<f64>,
        period: Option<GoalPeriod>,
        title: Option<Option<String>>,
        deadline: Option<Option<NaiveDate>>,
        active: Option<bool>,
    ) -> Result<(), DomainError> {
        if let Some(new_target) = target {
            Self::validate_target(new_target)?;
        }
        if let Some(ref new_title) = title {
            Self::validate_title(new_title)?;
        }

        if let Some(new_target) = target {
            self.target = new_target;
        }
        if let Some(new_period) = period {
            self.period = new_period;
        }
        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_deadline) = deadline {
            self.deadline = new_deadline;
        }
        if let Some(new_active) = active {
            self.active = new_active;
        }
        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        Self::validate_target(self.target)?;
        Self::validate_title(&self.title)
    }

    /// Title to show, falling back to a description of the target
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} {} {}", self.period, self.goal_type, self.target),
        }
    }

    fn validate_target(target: f64) -> Result<(), DomainError> {
        if !target.is_finite() || target <= 0.0 {
            return Err(DomainError::InvalidValue {
                message: "Goal target must be greater than 0".to_string(),
            });
        }
        if target > 1_000_000.0 {
            return Err(DomainError::InvalidValue {
                message: "Goal target cannot exceed 1000000".to_string(),
            });
        }
        Ok(())
    }

    fn validate_title(title: &Option<String>) -> Result<(), DomainError> {
        match title {
            Some(t) => validate_name(t, "Goal title", 100),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal() -> Goal {
        Goal::new(
            UserId::new("tester").unwrap(),
            GoalType::Workouts,
            4.0,
            GoalPeriod::Weekly,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_target_invalid() {
        let result = Goal::new(
            UserId::new("tester").unwrap(),
            GoalType::Water,
            0.0,
            GoalPeriod::Daily,
            None,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_keeps_id() {
        let mut g = goal();
        let id = g.id.clone();
        g.update(Some(5.0), None, Some(Some("Train more".to_string())), None, Some(false))
            .unwrap();
        assert_eq!(g.id, id);
        assert_eq!(g.target, 5.0);
        assert!(!g.active);
        assert_eq!(g.display_title(), "Train more");
    }

    #[test]
    fn test_invalid_update_is_not_applied() {
        let mut g = goal();
        assert!(g.update(Some(-1.0), Some(GoalPeriod::Daily), None, None, None).is_err());
        assert_eq!(g.target, 4.0);
        assert_eq!(g.period, GoalPeriod::Weekly);
    }

    #[test]
    fn test_default_display_title() {
        assert_eq!(goal().display_title(), "weekly workouts 4");
    }
}
