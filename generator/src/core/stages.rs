//! Typed stage outputs and the transitions between them

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{ElementKind, PathStyle, ValidatedDrill};

use crate::error::{GeneratorError, GeneratorResult};
use crate::types::{RefereeIssue, Stage};

/// Bumped whenever a stage artifact changes shape
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Bumped whenever [`DrillPattern`] gains or loses a variant
pub const PATTERN_CATALOG_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyCalibration {
    #[default]
    Maintain,
    Easier,
    Harder,
}

impl DifficultyCalibration {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyCalibration::Maintain => "maintain",
            DifficultyCalibration::Easier => "easier",
            DifficultyCalibration::Harder => "harder",
        }
    }
}

/// Scout output: what to work on and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutConcept {
    pub primary_weakness: String,
    pub drill_archetype: String,
    #[serde(default)]
    pub difficulty_calibration: DifficultyCalibration,
    #[serde(default)]
    pub reasoning: String,
}

/// Closed catalog of spatial layouts the Coach may choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrillPattern {
    Linear,
    Zigzag,
    Grid,
    Diamond,
    RondoCircle,
    Channel,
    OverlapRun,
    WallPassSequence,
    Triangle,
    Gates,
}

impl DrillPattern {
    pub const CATALOG: [DrillPattern; 10] = [
        DrillPattern::Linear,
        DrillPattern::Zigzag,
        DrillPattern::Grid,
        DrillPattern::Diamond,
        DrillPattern::RondoCircle,
        DrillPattern::Channel,
        DrillPattern::OverlapRun,
        DrillPattern::WallPassSequence,
        DrillPattern::Triangle,
        DrillPattern::Gates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrillPattern::Linear => "linear",
            DrillPattern::Zigzag => "zigzag",
            DrillPattern::Grid => "grid",
            DrillPattern::Diamond => "diamond",
            DrillPattern::RondoCircle => "rondo-circle",
            DrillPattern::Channel => "channel",
            DrillPattern::OverlapRun => "overlap-run",
            DrillPattern::WallPassSequence => "wall-pass-sequence",
            DrillPattern::Triangle => "triangle",
            DrillPattern::Gates => "gates",
        }
    }

    /// `a|b|c` list used in prompts
    pub fn catalog_choices() -> String {
        Self::CATALOG.iter().map(|p| p.as_str()).collect::<Vec<_>>().join("|")
    }
}

impl fmt::Display for DrillPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRule {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedPath {
    pub from: String,
    pub to: String,
    pub action: PathStyle,
    #[serde(default)]
    pub detail: String,
}

/// Coach output: layout the Writer must flesh out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachBlueprint {
    pub pattern_type: DrillPattern,
    pub equipment_placement: Vec<PlacementRule>,
    #[serde(default)]
    pub movement_paths: Vec<PlannedPath>,
    #[serde(default)]
    pub weakness_address: String,
}

/// Writer output, kept untyped until the Referee has checked it
#[derive(Debug, Clone, PartialEq)]
pub struct DrillDraft(pub Value);

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted(Box<ValidatedDrill>),
    Rejected(Vec<RefereeIssue>),
}

/// What one stage hands to the next
#[derive(Debug, Clone, PartialEq)]
pub enum StageArtifact {
    Concept { schema_version: u32, concept: ScoutConcept },
    Blueprint { schema_version: u32, blueprint: CoachBlueprint },
    Draft { schema_version: u32, draft: DrillDraft },
    Verdict { schema_version: u32, verdict: Verdict },
}

impl StageArtifact {
    pub fn concept(concept: ScoutConcept) -> Self {
        StageArtifact::Concept { schema_version: ARTIFACT_SCHEMA_VERSION, concept }
    }

    pub fn blueprint(blueprint: CoachBlueprint) -> Self {
        StageArtifact::Blueprint { schema_version: ARTIFACT_SCHEMA_VERSION, blueprint }
    }

    pub fn draft(draft: DrillDraft) -> Self {
        StageArtifact::Draft { schema_version: ARTIFACT_SCHEMA_VERSION, draft }
    }

    pub fn verdict(verdict: Verdict) -> Self {
        StageArtifact::Verdict { schema_version: ARTIFACT_SCHEMA_VERSION, verdict }
    }

    /// Stage that produces this artifact
    pub fn stage(&self) -> Stage {
        match self {
            StageArtifact::Concept { .. } => Stage::Scout,
            StageArtifact::Blueprint { .. } => Stage::Coach,
            StageArtifact::Draft { .. } => Stage::Writer,
            StageArtifact::Verdict { .. } => Stage::Referee,
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            StageArtifact::Concept { schema_version, .. }
            | StageArtifact::Blueprint { schema_version, .. }
            | StageArtifact::Draft { schema_version, .. }
            | StageArtifact::Verdict { schema_version, .. } => *schema_version,
        }
    }
}

/// Where a drill run stands
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Scout,
    Coach {
        concept: ScoutConcept,
    },
    Writer {
        concept: ScoutConcept,
        blueprint: CoachBlueprint,
        /// Issues from a rejected first draft; `Some` means this is the regeneration
        revision: Option<Vec<RefereeIssue>>,
    },
    Referee {
        concept: ScoutConcept,
        blueprint: CoachBlueprint,
        draft: DrillDraft,
        regenerated: bool,
    },
    Accepted(Box<ValidatedDrill>),
    RejectedFinal(Vec<RefereeIssue>),
}

impl PipelineState {
    /// Stage to run next, `None` once terminal
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Scout => Some(Stage::Scout),
            PipelineState::Coach { .. } => Some(Stage::Coach),
            PipelineState::Writer { .. } => Some(Stage::Writer),
            PipelineState::Referee { .. } => Some(Stage::Referee),
            PipelineState::Accepted(_) | PipelineState::RejectedFinal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage().is_none()
    }

    /// Feed the artifact of the current stage and move on.
    ///
    /// A first Referee rejection sends the run back to the Writer with the
    /// issue list; a rejection of the regenerated draft is final.
    pub fn advance(self, artifact: StageArtifact) -> GeneratorResult<PipelineState> {
        if artifact.schema_version() != ARTIFACT_SCHEMA_VERSION {
            return Err(GeneratorError::InvalidTransition {
                stage: artifact.stage(),
                message: format!(
                    "artifact schema v{} does not match v{}",
                    artifact.schema_version(),
                    ARTIFACT_SCHEMA_VERSION
                ),
            });
        }

        match (self, artifact) {
            (PipelineState::Scout, StageArtifact::Concept { concept, .. }) => Ok(PipelineState::Coach { concept }),
            (PipelineState::Coach { concept }, StageArtifact::Blueprint { blueprint, .. }) => Ok(PipelineState::Writer {
                concept,
                blueprint,
                revision: None,
            }),
            (
                PipelineState::Writer {
                    concept,
                    blueprint,
                    revision,
                },
                StageArtifact::Draft { draft, .. },
            ) => Ok(PipelineState::Referee {
                concept,
                blueprint,
                draft,
                regenerated: revision.is_some(),
            }),
            (PipelineState::Referee { .. }, StageArtifact::Verdict { verdict: Verdict::Accepted(drill), .. }) => {
                Ok(PipelineState::Accepted(drill))
            }
            (
                PipelineState::Referee {
                    concept,
                    blueprint,
                    regenerated: false,
                    ..
                },
                StageArtifact::Verdict { verdict: Verdict::Rejected(issues), .. },
            ) => Ok(PipelineState::Writer {
                concept,
                blueprint,
                revision: Some(issues),
            }),
            (PipelineState::Referee { regenerated: true, .. }, StageArtifact::Verdict { verdict: Verdict::Rejected(issues), .. }) => {
                Ok(PipelineState::RejectedFinal(issues))
            }
            (state, artifact) => Err(GeneratorError::InvalidTransition {
                stage: artifact.stage(),
                message: format!("{} artifact cannot follow state {:?}", artifact.stage(), state.stage()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn concept() -> ScoutConcept {
        ScoutConcept {
            primary_weakness: "first touch under pressure".into(),
            drill_archetype: "receive and turn".into(),
            difficulty_calibration: DifficultyCalibration::Maintain,
            reasoning: "asked for it".into(),
        }
    }

    fn blueprint() -> CoachBlueprint {
        CoachBlueprint {
            pattern_type: DrillPattern::Triangle,
            equipment_placement: Vec::new(),
            movement_paths: Vec::new(),
            weakness_address: String::new(),
        }
    }

    fn issue() -> RefereeIssue {
        RefereeIssue::new("spatial", "cone B outside field", "move B inside")
    }

    fn at_referee() -> PipelineState {
        PipelineState::Scout
            .advance(StageArtifact::concept(concept()))
            .and_then(|s| s.advance(StageArtifact::blueprint(blueprint())))
            .and_then(|s| s.advance(StageArtifact::draft(DrillDraft(json!({})))))
            .unwrap()
    }

    #[test]
    fn test_pattern_outside_catalog_does_not_parse() {
        let raw = json!({"pattern_type": "free", "equipment_placement": []});
        assert!(serde_json::from_value::<CoachBlueprint>(raw).is_err());

        let raw = json!({"pattern_type": "wall-pass-sequence", "equipment_placement": []});
        assert_eq!(
            serde_json::from_value::<CoachBlueprint>(raw).unwrap().pattern_type,
            DrillPattern::WallPassSequence
        );
    }

    #[test]
    fn test_one_rejection_returns_to_writer_with_issues() {
        let state = at_referee()
            .advance(StageArtifact::verdict(Verdict::Rejected(vec![issue()])))
            .unwrap();
        assert_matches!(state, PipelineState::Writer { revision: Some(ref issues), .. } if issues.len() == 1);
    }

    #[test]
    fn test_second_rejection_is_final() {
        let state = at_referee()
            .advance(StageArtifact::verdict(Verdict::Rejected(vec![issue()])))
            .and_then(|s| s.advance(StageArtifact::draft(DrillDraft(json!({})))))
            .unwrap();
        assert_matches!(state, PipelineState::Referee { regenerated: true, .. });

        let state = state
            .advance(StageArtifact::verdict(Verdict::Rejected(vec![issue()])))
            .unwrap();
        assert_matches!(state, PipelineState::RejectedFinal(ref issues) if issues[0].check == "spatial");
        assert!(state.is_terminal());
    }

    #[test]
    fn test_out_of_order_artifact_is_rejected() {
        let result = PipelineState::Scout.advance(StageArtifact::blueprint(blueprint()));
        assert_matches!(result, Err(GeneratorError::InvalidTransition { stage: Stage::Coach, .. }));

        let stale = StageArtifact::Concept { schema_version: 0, concept: concept() };
        assert_matches!(PipelineState::Scout.advance(stale), Err(GeneratorError::InvalidTransition { .. }));
    }
}
