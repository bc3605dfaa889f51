//! Stage prompt templates
//!
//! Composition is pure: the same context always yields the same text. Optional
//! values that are absent render as [`UNKNOWN`] so every prompt keeps its shape.

use std::fmt::Write as _;

use serde_json::Value;
use shared::{FieldDimensions, GenerationRequest, PlanGenerationRequest, PlayerProfile};

use crate::core::stages::{CoachBlueprint, DrillPattern, ScoutConcept, PATTERN_CATALOG_VERSION};
use crate::core::validator::full_day_name;
use crate::types::{RefereeIssue, Stage};

/// Placeholder for missing optional context
pub const UNKNOWN: &str = "unknown";

const MAX_RATING_LINES: usize = 12;

/// System and user messages for one model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

/// Everything a template may draw on. Later stages add the artifacts of
/// earlier ones.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub request: &'a GenerationRequest,
    pub history_summary: Option<&'a str>,
    pub concept: Option<&'a ScoutConcept>,
    pub blueprint: Option<&'a CoachBlueprint>,
    pub draft: Option<&'a Value>,
    pub revision_issues: &'a [RefereeIssue],
    pub plan: Option<&'a PlanGenerationRequest>,
}

impl<'a> PromptContext<'a> {
    pub fn new(request: &'a GenerationRequest) -> Self {
        Self {
            request,
            history_summary: None,
            concept: None,
            blueprint: None,
            draft: None,
            revision_issues: &[],
            plan: None,
        }
    }

    pub fn for_plan(plan: &'a PlanGenerationRequest) -> Self {
        Self {
            plan: Some(plan),
            ..Self::new(&plan.base)
        }
    }

    pub fn with_history(self, summary: Option<&'a str>) -> Self {
        Self {
            history_summary: summary,
            ..self
        }
    }

    pub fn with_concept(self, concept: &'a ScoutConcept) -> Self {
        Self {
            concept: Some(concept),
            ..self
        }
    }

    pub fn with_blueprint(self, blueprint: &'a CoachBlueprint) -> Self {
        Self {
            blueprint: Some(blueprint),
            ..self
        }
    }

    pub fn with_draft(self, draft: &'a Value) -> Self {
        Self {
            draft: Some(draft),
            ..self
        }
    }

    pub fn with_revision(self, issues: &'a [RefereeIssue]) -> Self {
        Self {
            revision_issues: issues,
            ..self
        }
    }

    fn profile(&self) -> Option<&'a PlayerProfile> {
        self.request.player_profile.as_ref()
    }

    fn field(&self) -> FieldDimensions {
        self.request.requirements.field_size.dimensions()
    }

    /// Requested level, else the level implied by the player's experience
    fn difficulty(&self) -> String {
        self.request
            .requirements
            .difficulty
            .as_ref()
            .and_then(|d| d.resolve())
            .or_else(|| self.profile().and_then(|p| p.experience()).map(|e| e.level()))
            .map(|level| level.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn category(&self) -> &'a str {
        text_or_unknown(self.request.requirements.category.as_deref())
    }

    fn equipment(&self) -> String {
        list_or_unknown(&self.request.requirements.equipment)
    }

    fn has_wall(&self) -> bool {
        self.request
            .requirements
            .equipment
            .iter()
            .any(|e| e.trim().eq_ignore_ascii_case("wall"))
    }
}

fn text_or_unknown(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(UNKNOWN)
}

fn list_or_unknown(values: &[String]) -> String {
    let items: Vec<&str> = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect();
    if items.is_empty() {
        UNKNOWN.to_string()
    } else {
        items.join(", ")
    }
}

fn display_or_unknown<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Build the prompt for `stage`
pub fn compose(stage: Stage, context: &PromptContext<'_>) -> ComposedPrompt {
    match stage {
        Stage::Scout => compose_scout(context),
        Stage::Coach => compose_coach(context),
        Stage::Writer => compose_writer(context),
        Stage::Referee => compose_referee(context),
        Stage::Plan => compose_plan(context),
    }
}

fn player_line(profile: Option<&PlayerProfile>) -> String {
    let name = text_or_unknown(profile.and_then(|p| p.name.as_deref()));
    let age = display_or_unknown(profile.and_then(|p| p.age));
    let position = text_or_unknown(profile.and_then(|p| p.position.as_deref()));
    let experience = display_or_unknown(profile.and_then(|p| p.experience()));
    format!("{name}, age {age}, position {position}, experience {experience}")
}

fn recent_ratings(request: &GenerationRequest) -> String {
    let mut text = String::new();
    for exercise in request
        .recent_sessions
        .iter()
        .flat_map(|s| s.exercises.iter())
        .take(MAX_RATING_LINES)
    {
        let _ = write!(
            text,
            "- {} ({}): rated {}/5",
            exercise.name,
            list_or_unknown(&exercise.target_skills),
            exercise.performance_rating
        );
        if let Some(notes) = exercise.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            let _ = write!(text, " ({})", notes.trim());
        }
        text.push('\n');
    }
    if text.is_empty() {
        text.push_str(UNKNOWN);
    }
    text
}

fn feedback_lines(request: &GenerationRequest) -> String {
    let mut text = String::new();
    for fb in &request.drill_feedback {
        let _ = write!(
            text,
            "- {}: rated {}/5, difficulty: {}, sentiment: {}",
            text_or_unknown(fb.drill_name.as_deref()),
            fb.rating,
            text_or_unknown(fb.difficulty_feedback.as_deref()),
            text_or_unknown(fb.feedback_type.as_deref())
        );
        if let Some(notes) = fb.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            let _ = write!(text, ", notes: {}", notes.trim());
        }
        text.push('\n');
    }
    if text.is_empty() {
        text.push_str(UNKNOWN);
    }
    text
}

fn match_lines(profile: Option<&PlayerProfile>) -> String {
    match profile.and_then(|p| p.match_performance.as_ref()) {
        Some(perf) => format!(
            "Match weaknesses (last {} matches): {}\nMatch strengths: {}",
            perf.match_count,
            list_or_unknown(&perf.recent_weaknesses),
            list_or_unknown(&perf.recent_strengths)
        ),
        None => UNKNOWN.to_string(),
    }
}

fn category_balance(request: &GenerationRequest) -> String {
    if request.category_balance.is_empty() {
        return UNKNOWN.to_string();
    }
    request
        .category_balance
        .iter()
        .map(|(category, pct)| format!("{category} {pct:.0}%"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn active_plan(request: &GenerationRequest) -> String {
    match &request.active_plan {
        Some(plan) => format!(
            "{} (week {} of {}, focus {})",
            text_or_unknown(plan.name.as_deref()),
            display_or_unknown(plan.current_week),
            display_or_unknown(plan.total_weeks),
            text_or_unknown(plan.focus_area.as_deref())
        ),
        None => UNKNOWN.to_string(),
    }
}

fn selected_weaknesses(request: &GenerationRequest) -> String {
    if request.selected_weaknesses.is_empty() {
        return UNKNOWN.to_string();
    }
    request
        .selected_weaknesses
        .iter()
        .map(|w| format!("{} / {}", w.category.trim(), w.specific.trim()))
        .collect::<Vec<_>>()
        .join("; ")
}

fn compose_scout(ctx: &PromptContext<'_>) -> ComposedPrompt {
    let request = ctx.request;
    let profile = ctx.profile();

    let user = format!(
        r#"Analyze this soccer player and identify their #1 weakness to target.

Player: {player}
Playing style: {style}
Goals: {goals}
Self-identified weaknesses: {weaknesses}
Selected weaknesses: {selected}
Request focus: {focus}
Requested category: {category}
Category balance: {balance}
Active plan: {plan}

Training history:
{history}

Recent training ratings:
{ratings}

Previous drill feedback:
{feedback}

Match performance:
{matches}

Do not repeat or closely imitate these recent drills: {avoid}

Return JSON:
{{"primary_weakness": "specific weakness description", "drill_archetype": "specific drill type that addresses it", "difficulty_calibration": "maintain|easier|harder", "reasoning": "brief explanation"}}"#,
        player = player_line(profile),
        style = text_or_unknown(profile.and_then(|p| p.playing_style.as_deref())),
        goals = list_or_unknown(profile.map(|p| p.skill_goals.as_slice()).unwrap_or(&[])),
        weaknesses = list_or_unknown(profile.map(|p| p.weaknesses.as_slice()).unwrap_or(&[])),
        selected = selected_weaknesses(request),
        focus = text_or_unknown(request.freeform_text()),
        category = ctx.category(),
        balance = category_balance(request),
        plan = active_plan(request),
        history = text_or_unknown(ctx.history_summary),
        ratings = recent_ratings(request).trim_end(),
        feedback = feedback_lines(request).trim_end(),
        matches = match_lines(profile),
        avoid = list_or_unknown(&request.recent_artifact_names),
    );

    ComposedPrompt {
        system: "You are a soccer performance analyst. Identify the player's #1 weakness from their data and recommend a drill archetype. Weight the player's explicit request highest, then selected weaknesses, then match weaknesses, then session ratings.".to_string(),
        user,
    }
}

fn compose_coach(ctx: &PromptContext<'_>) -> ComposedPrompt {
    let field = ctx.field();
    let concept = ctx.concept;

    let wall = if ctx.has_wall() {
        "\nWall guidance:\n- The wall reflects the ball at the angle of incidence, not straight back to the passer\n- The player must move to the rebound angle to receive\n- Use the wall for one-touch passing, first touch and weak-foot work\n"
    } else {
        ""
    };

    let user = format!(
        r#"Design a soccer drill layout for this focus:

Weakness: {weakness}
Drill archetype: {archetype}
Difficulty calibration: {calibration}
Field: {width}m x {length}m
Equipment available: {equipment}
Category: {category}
Number of players: {players}

Pattern catalog v{catalog_version}: choose exactly one of {choices}

Weakness to pattern guidance:
- Tight-space dribbling: cones 1-2m apart, zigzag
- Weak foot passing: angled gates requiring the weak foot
- First touch under pressure: receive and turn with a defender cone behind
- Shooting accuracy: target zones with approach angles
- Speed and agility: sprint channels
- Combination play: triangle, diamond or wall-pass-sequence
- Possession: rondo-circle or grid
{wall}
Placement rules:
- Every element has a unique label
- All x values within 0 to {width}, all y values within 0 to {length}
- Movement paths connect labelled elements only

Return JSON:
{{"pattern_type": "{choices}", "equipment_placement": [{{"type": "cone|player|target|goal|ball", "label": "A", "x": 0, "y": 0, "purpose": "start"}}], "movement_paths": [{{"from": "A", "to": "B", "action": "dribble|run|pass", "detail": "description"}}], "weakness_address": "how this layout targets the weakness"}}"#,
        weakness = text_or_unknown(concept.map(|c| c.primary_weakness.as_str())),
        archetype = text_or_unknown(concept.map(|c| c.drill_archetype.as_str())),
        calibration = text_or_unknown(concept.map(|c| c.difficulty_calibration.as_str())),
        width = field.width,
        length = field.length,
        equipment = ctx.equipment(),
        category = ctx.category(),
        players = ctx.request.requirements.number_of_players,
        catalog_version = PATTERN_CATALOG_VERSION,
        choices = DrillPattern::catalog_choices(),
    );

    ComposedPrompt {
        system: "You are a soccer drill architect. Design practical spatial layouts that directly address the identified weakness. Only use equipment the player has. Keep coordinates within the field dimensions.".to_string(),
        user,
    }
}

fn compose_writer(ctx: &PromptContext<'_>) -> ComposedPrompt {
    let field = ctx.field();
    let concept = ctx.concept;
    let players = ctx.request.requirements.number_of_players;

    let layout = ctx
        .blueprint
        .and_then(|b| serde_json::to_string_pretty(b).ok())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let mut revision = String::new();
    if !ctx.revision_issues.is_empty() {
        revision.push_str("\nErrors to fix from the previous attempt:\n");
        for issue in ctx.revision_issues {
            let _ = writeln!(revision, "- {issue}");
        }
        revision.push_str("Fix every listed error in this attempt.\n");
    }

    let wall = if ctx.has_wall() {
        "\nWall physics: the ball rebounds at the angle of incidence, so the receiver must stand on the opposite angle.\n"
    } else {
        ""
    };

    let user = format!(
        r#"Write a complete soccer drill using this blueprint.

Focus: {weakness}
Archetype: {archetype}
Layout:
{layout}
Field: {width}m x {length}m
Number of players: {players}
Difficulty (1-5): {difficulty}
Category: {category}
Equipment available: {equipment}
{revision}{wall}
Instruction rules:
- Each instruction is one action with an imperative verb, 15-25 words
- No "Step 1:" prefixes
- Design for {players} player(s), assigning roles if more than one

Diagram rules:
- Element x values within 0 to {width}, y values within 0 to {length}
- Element types: cone, player, target, goal, ball
- Path styles: dribble, run, pass
- Path endpoints are element labels
- Tag paths with "step", the 1-based index of the instruction they illustrate
- Every instruction step must be tagged on at least one path

Return only valid JSON:
{{"name": "Short name (max 40 chars)", "description": "One sentence purpose.", "setup": "Dimensions. Equipment. Player start.", "instructions": ["Action 1", "Action 2", "Action 3"], "diagram": {{"field": {{"width": {width}, "length": {length}}}, "elements": [{{"type": "cone", "x": 0, "y": 0, "label": "A"}}], "paths": [{{"from": "A", "to": "B", "style": "dribble", "step": 1}}]}}, "progressions": ["Easier: ...", "Harder: ..."], "coachingPoints": ["Point 1", "Point 2"], "estimatedDuration": 15, "difficulty": 3, "category": "technical|physical|tactical|recovery", "targetSkills": ["skill"], "equipment": ["ball"], "safetyNotes": "Brief safety note"}}"#,
        weakness = text_or_unknown(concept.map(|c| c.primary_weakness.as_str())),
        archetype = text_or_unknown(concept.map(|c| c.drill_archetype.as_str())),
        width = field.width,
        length = field.length,
        difficulty = ctx.difficulty(),
        category = ctx.category(),
        equipment = ctx.equipment(),
    );

    ComposedPrompt {
        system: "You are an expert soccer coach. Write complete, practical drills from blueprints. Each instruction must be one clear action with an imperative verb. Keep all coordinates within the specified field dimensions.".to_string(),
        user,
    }
}

fn compose_referee(ctx: &PromptContext<'_>) -> ComposedPrompt {
    let field = ctx.field();
    let weakness = text_or_unknown(ctx.concept.map(|c| c.primary_weakness.as_str()));
    let drill = ctx
        .draft
        .and_then(|d| serde_json::to_string_pretty(d).ok())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let user = format!(
        r#"Review this soccer drill for quality and correctness.

Drill JSON:
{drill}

Context:
- Target weakness: {weakness}
- Field size: {width}m x {length}m
- Available equipment: {equipment}
- Difficulty (1-5): {difficulty}

Validate:
1. CLARITY: instructions are imperative, one action each?
2. RELEVANCE: addresses '{weakness}'?
3. SAFETY: appropriate for the difficulty level?
4. REALISM: would a real coach assign this?
5. DIAGRAM: do the tagged paths match what each instruction describes?

Return JSON:
{{"verdict": "VALID or ERRORS", "errors": [{{"check": "category", "issue": "description", "fix": "suggestion"}}], "score": 0-100}}

If everything passes, return {{"verdict": "VALID", "errors": [], "score": 85-100}}"#,
        width = field.width,
        length = field.length,
        equipment = ctx.equipment(),
        difficulty = ctx.difficulty(),
    );

    ComposedPrompt {
        system: "You are a soccer drill safety and logic checker. Be strict but fair. Only flag genuine issues that would make the drill confusing, unsafe, or ineffective.".to_string(),
        user,
    }
}

fn day_names(days: &[String]) -> Vec<&'static str> {
    days.iter()
        .filter_map(|d| d.trim().parse::<chrono::Weekday>().ok())
        .map(full_day_name)
        .collect()
}

fn compose_plan(ctx: &PromptContext<'_>) -> ComposedPrompt {
    let request = ctx.request;
    let profile = ctx.profile();
    let (weeks, role, focus, preferred, rest) = match ctx.plan {
        Some(plan) => (
            plan.duration_weeks.to_string(),
            text_or_unknown(plan.target_role.as_deref()).to_string(),
            list_or_unknown(&plan.focus_areas),
            day_names(&plan.preferred_days),
            day_names(&plan.rest_days),
        ),
        None => (UNKNOWN.to_string(), UNKNOWN.to_string(), UNKNOWN.to_string(), Vec::new(), Vec::new()),
    };

    let rest_rule = if rest.is_empty() {
        "- Include 1-2 rest days per week (is_rest_day: true, sessions: [])".to_string()
    } else {
        format!("- These days must be rest days (is_rest_day: true, sessions: []): {}", rest.join(", "))
    };
    let preferred_rule = if preferred.is_empty() {
        String::new()
    } else {
        format!("\n- Prioritize training sessions on: {}", preferred.join(", "))
    };
    let mut revision = String::new();
    if !ctx.revision_issues.is_empty() {
        revision.push_str("\n\nThe previous plan was rejected:\n");
        for issue in ctx.revision_issues {
            let _ = writeln!(revision, "- {issue}");
        }
        revision.push_str("Fix every listed problem in this plan.");
    }

    let user = format!(
        r#"Create a {weeks}-week training plan at difficulty {difficulty} (1-5) for a {position} focused on {category} skills.

Player: {player}
Goals: {goals}
Selected weaknesses: {selected}
Request focus: {freeform}
Target role: {role}
Focus areas: {focus}
Training history:
{history}

Return only valid JSON matching this structure:
{{
  "name": "Plan Name",
  "description": "Brief description",
  "category": "technical|physical|tactical|recovery",
  "difficulty": 3,
  "duration_weeks": {weeks},
  "target_role": "{role}",
  "equipment": ["ball"],
  "target_skills": ["skill"],
  "weeks": [
    {{
      "week_number": 1,
      "focus_area": "Week theme",
      "notes": "Week notes",
      "days": [
        {{
          "day_number": 1,
          "day_of_week": "Monday",
          "is_rest_day": false,
          "sessions": [
            {{"session_type": "technical", "duration": 45, "intensity": 3, "notes": "Session notes", "suggested_exercise_names": ["Wall Passing", "Cone Weaving"]}}
          ]
        }}
      ]
    }}
  ]
}}

Requirements:
- Exactly {weeks} weeks, each with all 7 days Monday through Sunday
- Progressive difficulty across weeks
- 2-4 exercises per session
- Session types: technical, physical, tactical, recovery
- Session duration 30-90 minutes, intensity 1-5
{rest_rule}{preferred_rule}{revision}"#,
        difficulty = ctx.difficulty(),
        position = text_or_unknown(profile.and_then(|p| p.position.as_deref())),
        category = ctx.category(),
        player = player_line(profile),
        goals = list_or_unknown(profile.map(|p| p.skill_goals.as_slice()).unwrap_or(&[])),
        selected = selected_weaknesses(request),
        freeform = text_or_unknown(request.freeform_text()),
        history = text_or_unknown(ctx.history_summary),
    );

    ComposedPrompt {
        system: "You are an expert soccer coach specializing in personalized training plans. Return only valid JSON, no markdown formatting.".to_string(),
        user,
    }
}
