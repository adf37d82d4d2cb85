use serde::{Deserialize, Serialize};

/// Which phase of the export journey a step belongs to. Drives the
/// timeline phase breakdown on the report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Registration,
    Certification,
    Mitigation,
    Logistics,
}

/// One step of the compliance roadmap.
///
/// Steps are numbered 1-based in dependency order: every dependency number
/// is strictly smaller than the step's own number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub number: u32,
    pub title: String,
    pub description: String,
    pub kind: StepKind,
    pub duration_days: u32,

    /// Step numbers this step waits on; all strictly less than `number`.
    #[serde(default)]
    pub depends_on: Vec<u32>,
}

/// Check the dependency-ordering invariant over a whole roadmap: numbers
/// are 1..=n with no gaps, and every dependency points strictly backwards.
pub fn is_valid_roadmap(steps: &[RoadmapStep]) -> bool {
    for (index, step) in steps.iter().enumerate() {
        if step.number != (index + 1) as u32 {
            return false;
        }
        if step.duration_days == 0 {
            return false;
        }
        if step.depends_on.iter().any(|dep| *dep == 0 || *dep >= step.number) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(number: u32, depends_on: Vec<u32>) -> RoadmapStep {
        RoadmapStep {
            number,
            title: format!("step {number}"),
            description: String::new(),
            kind: StepKind::Registration,
            duration_days: 5,
            depends_on,
        }
    }

    #[test]
    fn ordered_steps_are_valid() {
        let steps = vec![step(1, vec![]), step(2, vec![1]), step(3, vec![1, 2])];
        assert!(is_valid_roadmap(&steps));
    }

    #[test]
    fn forward_dependency_is_invalid() {
        let steps = vec![step(1, vec![]), step(2, vec![3]), step(3, vec![])];
        assert!(!is_valid_roadmap(&steps));
    }

    #[test]
    fn self_dependency_is_invalid() {
        let steps = vec![step(1, vec![]), step(2, vec![2])];
        assert!(!is_valid_roadmap(&steps));
    }

    #[test]
    fn gapped_numbering_is_invalid() {
        let steps = vec![step(1, vec![]), step(3, vec![1])];
        assert!(!is_valid_roadmap(&steps));
    }

    #[test]
    fn zero_duration_is_invalid() {
        let mut bad = step(1, vec![]);
        bad.duration_days = 0;
        assert!(!is_valid_roadmap(&[bad]));
    }

    #[test]
    fn empty_roadmap_is_valid() {
        assert!(is_valid_roadmap(&[]));
    }
}
