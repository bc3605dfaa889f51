//! Terminal drill artifact and its diagram

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::SkillCategory;

/// Playing area in metres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDimensions {
    pub width: u32,
    pub length: u32,
}

impl FieldDimensions {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=f64::from(self.width)).contains(&x) && (0.0..=f64::from(self.length)).contains(&y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Cone,
    Player,
    Target,
    Goal,
    Ball,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    Dribble,
    Run,
    Pass,
}

/// Movement between two labelled elements, optionally tied to an
/// instruction by its 1-indexed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPath {
    pub from: String,
    pub to: String,
    pub style: PathStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillDiagram {
    pub field: FieldDimensions,
    pub elements: Vec<DiagramElement>,
    pub paths: Vec<MovementPath>,
}

/// A drill that passed every check and can be shown to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedDrill {
    pub name: String,
    pub description: String,
    pub setup: String,
    pub category: SkillCategory,
    pub difficulty: u8,
    pub estimated_duration: u32,
    pub instructions: Vec<String>,
    pub equipment: Vec<String>,
    pub target_skills: Vec<String>,
    pub progressions: Vec<String>,
    pub coaching_points: Vec<String>,
    #[serde(default)]
    pub safety_notes: Option<String>,
    pub diagram: DrillDiagram,
}

/// Outcome of matching path steps against instructions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepCoverage {
    /// Instruction steps no path references
    pub uncovered: Vec<u32>,
    /// Path steps with no matching instruction
    pub dangling: Vec<u32>,
}

impl StepCoverage {
    /// Compare the steps referenced by `paths` against `1..=instruction_count`
    pub fn check(instruction_count: usize, paths: &[MovementPath]) -> Self {
        let referenced: BTreeSet<u32> = paths.iter().filter_map(|p| p.step).collect();
        let count = u32::try_from(instruction_count).unwrap_or(u32::MAX);

        Self {
            uncovered: (1..=count).filter(|step| !referenced.contains(step)).collect(),
            dangling: referenced.into_iter().filter(|step| *step == 0 || *step > count).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty() && self.dangling.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(step: Option<u32>) -> MovementPath {
        MovementPath {
            from: "A".into(),
            to: "B".into(),
            style: PathStyle::Dribble,
            step,
        }
    }

    #[test]
    fn test_step_coverage_complete() {
        let paths = vec![path(Some(1)), path(Some(2)), path(Some(2)), path(Some(3)), path(None)];
        assert!(StepCoverage::check(3, &paths).is_complete());
    }

    #[test]
    fn test_step_coverage_reports_missing_and_dangling() {
        let paths = vec![path(Some(1)), path(Some(3)), path(Some(5))];
        let coverage = StepCoverage::check(3, &paths);
        assert_eq!(coverage.uncovered, vec![2]);
        assert_eq!(coverage.dangling, vec![5]);
        assert!(!coverage.is_complete());
    }

    #[test]
    fn test_field_bounds_are_inclusive() {
        let field = FieldDimensions { width: 20, length: 15 };
        assert!(field.contains(0.0, 0.0));
        assert!(field.contains(20.0, 15.0));
        assert!(!field.contains(20.5, 3.0));
        assert!(!field.contains(3.0, -0.1));
    }
}
