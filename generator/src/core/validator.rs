//! Request validation, run before any model call

use std::collections::HashSet;

use chrono::Weekday;
use shared::{check_sessions, GenerationRequest, PlanGenerationRequest, SharedError, SkillCategory, MAX_RECENT_SESSIONS};

use crate::error::ValidationError;

/// Shortest freeform description that counts as a content signal
pub const MIN_FREEFORM_CHARS: usize = 10;
pub const MAX_PLAN_WEEKS: u32 = 12;

fn reject(field: &str, reason: impl Into<String>) -> Result<(), ValidationError> {
    Err(ValidationError::new(field, reason))
}

/// Check a drill request. Pure; the first failing field is reported.
pub fn validate(request: &GenerationRequest) -> Result<(), ValidationError> {
    if request.player_profile.is_none() {
        return reject("player_profile", "is required");
    }

    if let Some(category) = request.requirements.category.as_deref() {
        if category.parse::<SkillCategory>().is_err() {
            return reject(
                "requirements.category",
                format!("'{category}' is not one of technical, physical, tactical, recovery"),
            );
        }
    }

    if let Some(difficulty) = &request.requirements.difficulty {
        if difficulty.resolve().is_none() {
            return reject("requirements.difficulty", "must be a level from 1 to 5");
        }
    }

    if request.requirements.number_of_players == 0 {
        return reject("requirements.number_of_players", "must be at least 1");
    }

    if request.recent_sessions.len() > MAX_RECENT_SESSIONS {
        return reject(
            "recent_sessions",
            format!("at most {MAX_RECENT_SESSIONS} sessions may be sent, got {}", request.recent_sessions.len()),
        );
    }

    if let Err(err) = check_sessions(&request.recent_sessions) {
        return Err(match err {
            SharedError::OutOfRange { field, value, min, max } => {
                ValidationError::new(field, format!("must be between {min} and {max}, got {value}"))
            }
            other => ValidationError::new("recent_sessions", other.to_string()),
        });
    }

    for (index, weakness) in request.selected_weaknesses.iter().enumerate() {
        if weakness.category.parse::<SkillCategory>().is_err() {
            return reject(
                &format!("selected_weaknesses[{index}].category"),
                format!("'{}' is not a known category", weakness.category),
            );
        }
        if weakness.specific.trim().is_empty() {
            return reject(&format!("selected_weaknesses[{index}].specific"), "must not be empty");
        }
    }

    if !has_content_signal(request) {
        return reject(
            "skill_description",
            format!("select at least one weakness or describe the focus in {MIN_FREEFORM_CHARS} or more characters"),
        );
    }

    Ok(())
}

/// Whether the request says what to work on
pub fn has_content_signal(request: &GenerationRequest) -> bool {
    !request.selected_weaknesses.is_empty()
        || request
            .freeform_text()
            .is_some_and(|text| text.chars().count() >= MIN_FREEFORM_CHARS)
}

/// Check a plan request: the drill rules, with focus areas also counting
/// as a content signal, plus the scheduling constraints
pub fn validate_plan(request: &PlanGenerationRequest) -> Result<(), ValidationError> {
    let has_focus = request.focus_areas.iter().any(|f| !f.trim().is_empty());
    match validate(&request.base) {
        Err(err) if err.field == "skill_description" && has_focus => {}
        other => other?,
    }

    if !(1..=MAX_PLAN_WEEKS).contains(&request.duration_weeks) {
        return reject("duration_weeks", format!("must be between 1 and {MAX_PLAN_WEEKS}"));
    }

    let preferred = parse_days("preferred_days", &request.preferred_days)?;
    let rest = parse_days("rest_days", &request.rest_days)?;

    if let Some(day) = preferred.intersection(&rest).next() {
        return reject(
            "rest_days",
            format!("{} is both a preferred training day and a rest day", full_day_name(*day)),
        );
    }
    if rest.len() == 7 {
        return reject("rest_days", "at least one day per week must allow training");
    }

    Ok(())
}

fn parse_days(field: &str, days: &[String]) -> Result<HashSet<Weekday>, ValidationError> {
    days.iter()
        .enumerate()
        .map(|(index, day)| {
            day.trim()
                .parse::<Weekday>()
                .map_err(|_| ValidationError::new(format!("{field}[{index}]"), format!("'{day}' is not a weekday")))
        })
        .collect()
}

/// English name used in prompts and plan days
pub fn full_day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
