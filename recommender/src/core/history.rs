//! Time-windowed summaries of a player's session log

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use shared::{SessionSummary, SkillCategory};

/// Frequency and rating total for one skill
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SkillStats {
    pub count: u32,
    pub rating_sum: f64,
}

impl SkillStats {
    fn record(&mut self, rating: u8) {
        self.count += 1;
        self.rating_sum += f64::from(rating);
    }

    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.rating_sum / f64::from(self.count))
    }
}

/// Per-skill stats for sessions no older than `days`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceWindow {
    pub days: i64,
    pub skills: BTreeMap<String, SkillStats>,
    pub category_counts: BTreeMap<SkillCategory, u32>,
}

impl PerformanceWindow {
    fn new(days: i64) -> Self {
        Self {
            days,
            skills: BTreeMap::new(),
            category_counts: BTreeMap::new(),
        }
    }

    pub fn average(&self, skill: &str) -> Option<f64> {
        self.skills.get(&skill_key(skill)).and_then(SkillStats::average)
    }

    pub fn frequency(&self, skill: &str) -> u32 {
        self.skills.get(&skill_key(skill)).map_or(0, |s| s.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub now: DateTime<Utc>,
    /// Shortest window first
    pub windows: Vec<PerformanceWindow>,
    pub all_time: BTreeMap<String, SkillStats>,
    pub last_practiced: BTreeMap<String, DateTime<Utc>>,
    /// Keyed by exercise id
    pub last_completed: HashMap<String, DateTime<Utc>>,
    /// Hardest difficulty attempted per skill
    pub max_difficulty: BTreeMap<String, u8>,
    pub category_counts: BTreeMap<SkillCategory, u32>,
    pub total_sessions: usize,
}

/// Skills are matched case-insensitively
pub fn skill_key(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// Summarise the `max_sessions` most recent sessions in one pass.
///
/// A session belongs to every window it is no older than; sessions dated
/// after `now` count as today's.
pub fn aggregate(sessions: &[SessionSummary], now: DateTime<Utc>, windows: &[i64], max_sessions: usize) -> HistorySummary {
    let mut ordered: Vec<&SessionSummary> = sessions.iter().collect();
    ordered.sort_by(|a, b| b.date.cmp(&a.date));
    ordered.truncate(max_sessions);

    let mut window_days = windows.to_vec();
    window_days.sort_unstable();
    window_days.dedup();

    let mut summary = HistorySummary {
        now,
        windows: window_days.iter().map(|d| PerformanceWindow::new(*d)).collect(),
        all_time: BTreeMap::new(),
        last_practiced: BTreeMap::new(),
        last_completed: HashMap::new(),
        max_difficulty: BTreeMap::new(),
        category_counts: BTreeMap::new(),
        total_sessions: ordered.len(),
    };

    for session in ordered {
        let age = (now - session.date).max(Duration::zero());

        for exercise in &session.exercises {
            *summary.category_counts.entry(exercise.category).or_default() += 1;
            summary
                .last_completed
                .entry(exercise.exercise_id.clone())
                .and_modify(|seen| *seen = (*seen).max(session.date))
                .or_insert(session.date);

            let skills: Vec<String> = if exercise.target_skills.is_empty() {
                vec![skill_key(&exercise.name)]
            } else {
                exercise.target_skills.iter().map(|s| skill_key(s)).collect()
            };

            for window in summary.windows.iter_mut().filter(|w| age <= Duration::days(w.days)) {
                *window.category_counts.entry(exercise.category).or_default() += 1;
                for skill in &skills {
                    window.skills.entry(skill.clone()).or_default().record(exercise.performance_rating);
                }
            }

            for skill in skills {
                summary.all_time.entry(skill.clone()).or_default().record(exercise.performance_rating);
                summary
                    .last_practiced
                    .entry(skill.clone())
                    .and_modify(|seen| *seen = (*seen).max(session.date))
                    .or_insert(session.date);
                summary
                    .max_difficulty
                    .entry(skill)
                    .and_modify(|d| *d = (*d).max(exercise.difficulty))
                    .or_insert(exercise.difficulty);
            }
        }
    }

    summary
}

impl HistorySummary {
    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }

    pub fn window(&self, days: i64) -> Option<&PerformanceWindow> {
        self.windows.iter().find(|w| w.days == days)
    }

    /// Average rating for `skill` within the `days` window
    pub fn average_within(&self, skill: &str, days: i64) -> Option<f64> {
        self.window(days).and_then(|w| w.average(skill))
    }

    pub fn stats(&self, skill: &str) -> SkillStats {
        self.all_time.get(&skill_key(skill)).copied().unwrap_or_default()
    }

    pub fn days_since_practiced(&self, skill: &str) -> Option<i64> {
        self.last_practiced
            .get(&skill_key(skill))
            .map(|date| (self.now - *date).num_days().max(0))
    }

    pub fn completed_within(&self, exercise_id: &str, days: i64) -> bool {
        self.last_completed
            .get(exercise_id)
            .is_some_and(|date| self.now - *date <= Duration::days(days))
    }

    /// Categories with the fewest exercises in the `days` window
    pub fn least_represented(&self, days: i64) -> Vec<SkillCategory> {
        let counts = self.window(days).map(|w| &w.category_counts);
        let count_of = |category: &SkillCategory| counts.and_then(|c| c.get(category)).copied().unwrap_or(0);
        let fewest = SkillCategory::ALL.iter().map(count_of).min().unwrap_or(0);
        SkillCategory::ALL.into_iter().filter(|c| count_of(c) == fewest).collect()
    }

    /// Plain-text digest for the Scout prompt
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "No sessions recorded yet.".to_string();
        }

        let mut text = format!("{} recent session(s).", self.total_sessions);

        if !self.category_counts.is_empty() {
            let categories: Vec<String> = self
                .category_counts
                .iter()
                .map(|(category, count)| format!("{category} {count}"))
                .collect();
            let _ = write!(text, " Exercises by category: {}.", categories.join(", "));
        }

        for window in &self.windows {
            if window.skills.is_empty() {
                continue;
            }
            let skills: Vec<String> = window
                .skills
                .iter()
                .filter_map(|(skill, stats)| {
                    stats
                        .average()
                        .map(|avg| format!("{skill} {avg:.1} ({}x)", stats.count))
                })
                .collect();
            let _ = write!(text, "\nLast {} days: {}", window.days, skills.join(", "));
        }

        let mut weakest: Vec<(&String, f64)> = self
            .all_time
            .iter()
            .filter_map(|(skill, stats)| stats.average().map(|avg| (skill, avg)))
            .collect();
        weakest.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        if let Some((skill, avg)) = weakest.first() {
            let _ = write!(text, "\nWeakest skill overall: {skill} ({avg:.1}/5)");
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::ExerciseRecord;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn session(days_ago: i64, exercises: Vec<ExerciseRecord>) -> SessionSummary {
        SessionSummary {
            date: now() - Duration::days(days_ago),
            duration_minutes: 45,
            overall_rating: 3,
            exercises,
        }
    }

    fn exercise(id: &str, skill: &str, category: SkillCategory, rating: u8) -> ExerciseRecord {
        ExerciseRecord {
            exercise_id: id.to_string(),
            name: format!("{skill} drill"),
            category,
            target_skills: vec![skill.to_string()],
            performance_rating: rating,
            difficulty: 3,
            notes: None,
        }
    }

    fn aggregate_default(sessions: &[SessionSummary]) -> HistorySummary {
        aggregate(sessions, now(), &[3, 7, 14, 30], 30)
    }

    #[test]
    fn test_sessions_land_in_every_window_they_fit() {
        let summary = aggregate_default(&[
            session(1, vec![exercise("a", "Passing", SkillCategory::Technical, 2)]),
            session(10, vec![exercise("a", "passing", SkillCategory::Technical, 4)]),
            session(25, vec![exercise("b", "Sprinting", SkillCategory::Physical, 5)]),
        ]);

        assert_eq!(summary.window(3).unwrap().frequency("passing"), 1);
        assert_eq!(summary.window(7).unwrap().frequency("passing"), 1);
        assert_eq!(summary.window(14).unwrap().frequency("passing"), 2);
        assert_eq!(summary.average_within("Passing", 14), Some(3.0));
        assert_eq!(summary.window(14).unwrap().frequency("sprinting"), 0);
        assert_eq!(summary.window(30).unwrap().frequency("sprinting"), 1);
        assert_eq!(summary.stats("passing").count, 2);
        assert_eq!(summary.days_since_practiced("passing"), Some(1));
        assert_eq!(summary.total_sessions, 3);
    }

    #[test]
    fn test_keeps_only_most_recent_sessions() {
        let sessions: Vec<SessionSummary> = (0..40)
            .map(|d| session(d, vec![exercise("a", "passing", SkillCategory::Technical, 3)]))
            .collect();
        let summary = aggregate(&sessions, now(), &[3, 7, 14, 30], 30);
        assert_eq!(summary.total_sessions, 30);
        assert_eq!(summary.stats("passing").count, 30);
    }

    #[test]
    fn test_recency_and_balance() {
        let summary = aggregate_default(&[
            session(2, vec![exercise("wall", "passing", SkillCategory::Technical, 3)]),
            session(5, vec![exercise("sprint", "speed", SkillCategory::Physical, 3)]),
        ]);
        assert!(summary.completed_within("wall", 3));
        assert!(!summary.completed_within("sprint", 3));
        assert!(!summary.completed_within("unknown", 3));
        assert_eq!(summary.least_represented(30), vec![SkillCategory::Tactical, SkillCategory::Recovery]);
    }

    #[test]
    fn test_is_deterministic_and_order_independent() {
        let a = session(1, vec![exercise("a", "passing", SkillCategory::Technical, 2)]);
        let b = session(9, vec![exercise("b", "shooting", SkillCategory::Technical, 4)]);
        assert_eq!(aggregate_default(&[a.clone(), b.clone()]), aggregate_default(&[b, a]));
    }

    #[test]
    fn test_describe() {
        assert_eq!(aggregate_default(&[]).describe(), "No sessions recorded yet.");

        let text = aggregate_default(&[session(1, vec![exercise("a", "passing", SkillCategory::Technical, 2)])]).describe();
        assert!(text.starts_with("1 recent session(s)."));
        assert!(text.contains("Last 3 days: passing 2.0 (1x)"));
        assert!(text.contains("Weakest skill overall: passing (2.0/5)"));
    }
}
