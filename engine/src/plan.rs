//! Seven-day action plan derived from the roadmap.
//!
//! The plan is a first-week sprint: a fixed quick win on day one, then
//! roadmap work unrolled into concrete tasks and packed greedily into
//! days 1..=7. Whatever does not fit in the week is left to the roadmap.

use exportready_core::types::{
    ActionPlan, PlanTask, RoadmapStep, StepKind, TaskCategory,
};

/// Hard cap per day; the week never schedules more than this many tasks
/// on one date.
const MAX_TASKS_PER_DAY: usize = 3;

/// Build the 7-day plan from an ordered roadmap. The roadmap order
/// already encodes dependencies and duration-based priority, so packing
/// is a straight left-to-right fill.
pub fn build_action_plan(roadmap: &[RoadmapStep]) -> ActionPlan {
    let mut tasks = vec![PlanTask {
        id: String::new(),
        title: "Assemble the export document checklist (invoice, packing list, bank details)"
            .to_string(),
        category: TaskCategory::Documentation,
        estimated_duration_days: 0.5,
        done: false,
    }];

    for step in roadmap {
        match step.kind {
            StepKind::Registration => tasks.push(PlanTask {
                id: String::new(),
                title: step.title.clone(),
                category: TaskCategory::Registration,
                estimated_duration_days: 0.5,
                done: false,
            }),
            StepKind::Certification => {
                let name = step.title.strip_prefix("Obtain ").unwrap_or(&step.title);
                tasks.push(PlanTask {
                    id: String::new(),
                    title: format!("Prepare documents: {name}"),
                    category: TaskCategory::Documentation,
                    estimated_duration_days: 1.0,
                    done: false,
                });
                tasks.push(PlanTask {
                    id: String::new(),
                    title: format!("Submit application: {name}"),
                    category: TaskCategory::Certification,
                    estimated_duration_days: 0.5,
                    done: false,
                });
            }
            StepKind::Mitigation => tasks.push(PlanTask {
                id: String::new(),
                title: step.title.clone(),
                category: TaskCategory::RiskMitigation,
                estimated_duration_days: 1.0,
                done: false,
            }),
            StepKind::Logistics => tasks.push(PlanTask {
                id: String::new(),
                title: "Get freight quotes and shortlist a forwarder".to_string(),
                category: TaskCategory::Outreach,
                estimated_duration_days: 1.0,
                done: false,
            }),
        }
    }

    let mut plan = ActionPlan::empty();
    let mut day_index = 0usize;
    for (index, mut task) in tasks.into_iter().enumerate() {
        if plan.days[day_index].tasks.len() == MAX_TASKS_PER_DAY {
            day_index += 1;
            if day_index == plan.days.len() {
                break;
            }
        }
        task.id = format!("task-{}", index + 1);
        plan.days[day_index].tasks.push(task);
    }
    plan
}
