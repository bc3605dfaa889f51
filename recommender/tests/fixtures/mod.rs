//! Session and candidate builders for scoring tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use shared::{CandidateExercise, ExerciseRecord, PlayerProfile, SessionSummary, SkillCategory};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0).unwrap()
}

pub fn profile(experience: &str) -> PlayerProfile {
    PlayerProfile {
        position: Some("winger".into()),
        experience_level: Some(experience.into()),
        ..Default::default()
    }
}

/// `(exercise id, skill, category, rating)`
pub type Played<'a> = (&'a str, &'a str, SkillCategory, u8);

pub fn session(days_ago: i64, exercises: &[Played<'_>]) -> SessionSummary {
    SessionSummary {
        date: now() - Duration::days(days_ago),
        duration_minutes: 45,
        overall_rating: 3,
        exercises: exercises
            .iter()
            .map(|(id, skill, category, rating)| ExerciseRecord {
                exercise_id: id.to_string(),
                name: id.replace('-', " "),
                category: *category,
                target_skills: vec![skill.to_string()],
                performance_rating: *rating,
                difficulty: 3,
                notes: None,
            })
            .collect(),
    }
}

pub fn candidate(id: &str, skill: &str, category: SkillCategory, difficulty: u8) -> CandidateExercise {
    CandidateExercise {
        id: id.to_string(),
        name: id.replace('-', " "),
        category,
        target_skills: vec![skill.to_string()],
        difficulty,
    }
}
