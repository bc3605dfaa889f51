//! Referee checks: programmatic validation of a draft and interpretation
//! of the model's semantic review

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use shared::{
    DifficultyInput, DrillDiagram, FieldDimensions, GenerationRequest, SkillCategory, StepCoverage, ValidatedDrill,
};

use crate::core::parser;
use crate::error::ParseError;
use crate::types::RefereeIssue;

/// Fields every draft must carry, as the Writer names them
pub const REQUIRED_FIELDS: [&str; 10] = [
    "name",
    "description",
    "setup",
    "instructions",
    "diagram",
    "difficulty",
    "category",
    "targetSkills",
    "equipment",
    "estimatedDuration",
];

const MAX_NAME_CHARS: usize = 60;

/// Request-derived limits a draft is checked against
#[derive(Debug, Clone, PartialEq)]
pub struct RefereeContext {
    pub field: FieldDimensions,
    pub available_equipment: Vec<String>,
}

impl RefereeContext {
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            field: request.requirements.field_size.dimensions(),
            available_equipment: request.requirements.equipment.clone(),
        }
    }
}

/// Draft as the Writer is asked to emit it, with loose scalar types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftShape {
    name: String,
    description: String,
    setup: String,
    category: String,
    difficulty: DifficultyInput,
    estimated_duration: i64,
    instructions: Vec<String>,
    equipment: Vec<String>,
    target_skills: Vec<String>,
    #[serde(default)]
    progressions: Vec<String>,
    #[serde(default)]
    coaching_points: Vec<String>,
    #[serde(default)]
    safety_notes: Option<String>,
    diagram: DrillDiagram,
}

/// Programmatic pass: schema, ranges, spatial bounds, equipment, path
/// endpoints and step coverage. Returns every issue found, not just the first.
pub fn check_draft(draft: &Value, context: &RefereeContext) -> Result<ValidatedDrill, Vec<RefereeIssue>> {
    let Some(object) = draft.as_object() else {
        return Err(vec![RefereeIssue::new("schema", "draft is not a JSON object", "Return a single JSON object")]);
    };

    let missing: Vec<RefereeIssue> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| {
            RefereeIssue::new(
                "schema",
                format!("Missing required field: {field}"),
                format!("Add '{field}' to the response"),
            )
        })
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let shape: DraftShape = serde_json::from_value(draft.clone()).map_err(|e| {
        vec![RefereeIssue::new(
            "schema",
            format!("Field has the wrong type: {e}"),
            "Match the documented field types",
        )]
    })?;

    let mut issues = Vec::new();

    let name = shape.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        issues.push(RefereeIssue::new(
            "schema",
            format!("name must be 1 to {MAX_NAME_CHARS} characters"),
            "Use a short descriptive name",
        ));
    }

    let category = shape.category.parse::<SkillCategory>().ok();
    if category.is_none() {
        issues.push(RefereeIssue::new(
            "range",
            format!("Unknown category '{}'", shape.category),
            "Use technical, physical, tactical or recovery",
        ));
    }

    let difficulty = shape.difficulty.resolve();
    if difficulty.is_none() {
        issues.push(RefereeIssue::new("range", "difficulty is not a level from 1 to 5", "Set difficulty to 1-5"));
    }

    let duration = u32::try_from(shape.estimated_duration).ok().filter(|d| *d > 0);
    if duration.is_none() {
        issues.push(RefereeIssue::new(
            "range",
            format!("estimatedDuration {} is not a positive number of minutes", shape.estimated_duration),
            "Give the duration in whole minutes",
        ));
    }

    if shape.instructions.is_empty() {
        issues.push(RefereeIssue::new("schema", "instructions are empty", "List at least one instruction"));
    }

    issues.extend(check_spatial(&shape.diagram, context.field));
    issues.extend(check_equipment(&shape.equipment, &context.available_equipment));
    issues.extend(check_path_endpoints(&shape.diagram));
    issues.extend(check_step_coverage(shape.instructions.len(), &shape.diagram));

    match (issues.is_empty(), category, difficulty, duration) {
        (true, Some(category), Some(difficulty), Some(estimated_duration)) => Ok(ValidatedDrill {
            name: name.to_string(),
            description: shape.description,
            setup: shape.setup,
            category,
            difficulty,
            estimated_duration,
            instructions: shape.instructions,
            equipment: shape.equipment,
            target_skills: shape.target_skills,
            progressions: shape.progressions,
            coaching_points: shape.coaching_points,
            safety_notes: shape.safety_notes,
            diagram: shape.diagram,
        }),
        _ => Err(issues),
    }
}

fn check_spatial(diagram: &DrillDiagram, field: FieldDimensions) -> Vec<RefereeIssue> {
    let mut issues = Vec::new();
    if diagram.field != field {
        issues.push(RefereeIssue::new(
            "spatial",
            format!(
                "Diagram field {}x{} does not match the requested {}x{}",
                diagram.field.width, diagram.field.length, field.width, field.length
            ),
            format!("Set field to width {} and length {}", field.width, field.length),
        ));
    }
    for element in &diagram.elements {
        if !field.contains(element.x, element.y) {
            issues.push(RefereeIssue::new(
                "spatial",
                format!(
                    "Element '{}' at ({}, {}) is outside the {}x{} field",
                    element.label, element.x, element.y, field.width, field.length
                ),
                format!("Keep x within 0-{} and y within 0-{}", field.width, field.length),
            ));
        }
    }
    issues
}

fn check_equipment(used: &[String], available: &[String]) -> Option<RefereeIssue> {
    if available.is_empty() {
        return None;
    }
    let allowed: HashSet<String> = available.iter().map(|e| e.trim().to_lowercase()).collect();
    let extra: Vec<&str> = used
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.eq_ignore_ascii_case("none") && !allowed.contains(&e.to_lowercase()))
        .collect();

    (!extra.is_empty()).then(|| {
        RefereeIssue::new(
            "equipment",
            format!("Uses unavailable equipment: {}", extra.join(", ")),
            format!("Only use: {}", available.join(", ")),
        )
    })
}

fn check_path_endpoints(diagram: &DrillDiagram) -> Vec<RefereeIssue> {
    let labels: HashSet<&str> = diagram.elements.iter().map(|e| e.label.as_str()).collect();
    diagram
        .paths
        .iter()
        .flat_map(|path| [path.from.as_str(), path.to.as_str()])
        .filter(|label| !labels.contains(label))
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .map(|label| {
            RefereeIssue::new(
                "diagram",
                format!("Path references unknown element '{label}'"),
                "Connect paths only between labelled elements",
            )
        })
        .collect()
}

fn check_step_coverage(instruction_count: usize, diagram: &DrillDiagram) -> Vec<RefereeIssue> {
    let coverage = StepCoverage::check(instruction_count, &diagram.paths);
    let mut issues = Vec::new();
    if !coverage.uncovered.is_empty() {
        issues.push(RefereeIssue::new(
            "steps",
            format!("Instruction step(s) {:?} have no movement path", coverage.uncovered),
            "Tag at least one path with each step number",
        ));
    }
    if !coverage.dangling.is_empty() {
        issues.push(RefereeIssue::new(
            "steps",
            format!("Path step(s) {:?} have no matching instruction", coverage.dangling),
            format!("Use step numbers 1 to {instruction_count}"),
        ));
    }
    issues
}

#[derive(Debug, Deserialize)]
struct ReviewShape {
    #[serde(default)]
    verdict: Option<String>,
    #[serde(default)]
    errors: Vec<RefereeIssue>,
}

/// Read the semantic review. An empty list means the draft was accepted.
///
/// A missing verdict is inferred from the error list; an `ERRORS` verdict
/// without errors still counts as a rejection.
pub fn interpret_review(review: Value) -> Result<Vec<RefereeIssue>, ParseError> {
    let shape: ReviewShape = parser::into_shape(review)?;

    match shape.verdict.as_deref().map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("valid") => Ok(Vec::new()),
        Some(v) if v.eq_ignore_ascii_case("errors") => {
            if shape.errors.is_empty() {
                Ok(vec![RefereeIssue::new("review", "Reviewer rejected the drill without detail", "")])
            } else {
                Ok(shape.errors)
            }
        }
        None => Ok(shape.errors),
        Some(other) => Err(ParseError::Shape {
            message: format!("unknown verdict '{other}'"),
        }),
    }
}
