use serde::{Deserialize, Serialize};

/// Number of days in the near-term action plan. Fixed by product design:
/// the plan is a first-week sprint, not a full schedule.
pub const ACTION_PLAN_DAYS: usize = 7;

/// Task grouping for rendering and filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Registration,
    Documentation,
    Certification,
    RiskMitigation,
    Outreach,
}

/// One actionable task inside a day plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTask {
    pub id: String,
    pub title: String,
    pub category: TaskCategory,

    /// Working days this task is expected to take.
    pub estimated_duration_days: f32,

    #[serde(default)]
    pub done: bool,
}

/// Tasks scheduled for one day of the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based day number.
    pub day: u32,
    pub tasks: Vec<PlanTask>,
}

/// The fixed-length near-term action plan: always exactly
/// [`ACTION_PLAN_DAYS`] days, day numbers 1..=7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlan {
    pub days: Vec<DayPlan>,
}

impl ActionPlan {
    /// An empty-but-well-formed plan: seven days, no tasks.
    pub fn empty() -> ActionPlan {
        ActionPlan {
            days: (1..=ACTION_PLAN_DAYS as u32)
                .map(|day| DayPlan { day, tasks: Vec::new() })
                .collect(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.days.len() == ACTION_PLAN_DAYS
            && self
                .days
                .iter()
                .enumerate()
                .all(|(index, day)| day.day == (index + 1) as u32)
    }

    pub fn task_count(&self) -> usize {
        self.days.iter().map(|d| d.tasks.len()).sum()
    }

    /// Completion percentage, derived from task `done` flags each time it
    /// is asked for. An empty plan reads 0.
    pub fn progress_percentage(&self) -> f32 {
        let total = self.task_count();
        if total == 0 {
            return 0.0;
        }
        let done = self
            .days
            .iter()
            .flat_map(|d| d.tasks.iter())
            .filter(|t| t.done)
            .count();
        done as f32 / total as f32 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, done: bool) -> PlanTask {
        PlanTask {
            id: id.to_string(),
            title: id.to_string(),
            category: TaskCategory::Documentation,
            estimated_duration_days: 0.5,
            done,
        }
    }

    #[test]
    fn empty_plan_has_seven_days() {
        let plan = ActionPlan::empty();
        assert_eq!(plan.days.len(), 7);
        assert!(plan.is_valid());
        assert_eq!(plan.task_count(), 0);
    }

    #[test]
    fn misnumbered_days_are_invalid() {
        let mut plan = ActionPlan::empty();
        plan.days[3].day = 9;
        assert!(!plan.is_valid());
    }

    #[test]
    fn short_plan_is_invalid() {
        let mut plan = ActionPlan::empty();
        plan.days.pop();
        assert!(!plan.is_valid());
    }

    #[test]
    fn progress_over_empty_plan_is_zero() {
        assert_eq!(ActionPlan::empty().progress_percentage(), 0.0);
    }

    #[test]
    fn progress_counts_done_tasks() {
        let mut plan = ActionPlan::empty();
        plan.days[0].tasks.push(task("a", true));
        plan.days[1].tasks.push(task("b", false));
        plan.days[2].tasks.push(task("c", true));
        plan.days[3].tasks.push(task("d", false));
        assert_eq!(plan.progress_percentage(), 50.0);
    }
}
