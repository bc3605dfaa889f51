//! Tests for InMemoryArtifactStore

use chrono::{Duration, TimeZone, Utc};

use shared::{DrillDiagram, FieldDimensions, SkillCategory, ValidatedDrill, ValidatedPlan};

use crate::services::InMemoryArtifactStore;
use crate::traits::ArtifactStore;
use crate::types::{ArtifactRecord, StoredArtifact};

fn drill(name: &str) -> StoredArtifact {
    StoredArtifact::Drill(ValidatedDrill {
        name: name.to_string(),
        description: "Pass and move".to_string(),
        setup: "Two cones 10m apart".to_string(),
        category: SkillCategory::Technical,
        difficulty: 2,
        estimated_duration: 15,
        instructions: vec!["Pass to the cone".to_string()],
        equipment: vec!["ball".to_string()],
        target_skills: vec!["passing".to_string()],
        progressions: Vec::new(),
        coaching_points: Vec::new(),
        safety_notes: None,
        diagram: DrillDiagram {
            field: FieldDimensions { width: 20, length: 15 },
            elements: Vec::new(),
            paths: Vec::new(),
        },
    })
}

fn plan(name: &str) -> StoredArtifact {
    StoredArtifact::Plan(ValidatedPlan {
        name: name.to_string(),
        description: "Base fitness".to_string(),
        category: SkillCategory::Physical,
        difficulty: 2,
        duration_weeks: 1,
        target_role: None,
        weeks: Vec::new(),
        equipment: Vec::new(),
        target_skills: Vec::new(),
    })
}

fn at(minutes: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 15, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

#[tokio::test]
async fn test_recent_drill_names_newest_first_and_limited() {
    let store = InMemoryArtifactStore::new();
    for (i, name) in ["Wall Volley", "Cone Weave", "Box Rondo"].iter().enumerate() {
        store.upsert(ArtifactRecord::new("u-1", drill(name), at(i as i64))).await.unwrap();
    }
    store.upsert(ArtifactRecord::new("u-1", plan("Pre-season"), at(10))).await.unwrap();
    store.upsert(ArtifactRecord::new("u-2", drill("Other User"), at(20))).await.unwrap();

    let names = store.recent_drill_names("u-1", 2).await.unwrap();
    assert_eq!(names, vec!["Box Rondo".to_string(), "Cone Weave".to_string()]);
    assert!(store.recent_drill_names("nobody", 5).await.unwrap().is_empty());
    assert_eq!(store.len().await, 5);
}

#[tokio::test]
async fn test_upsert_replaces_same_id() {
    let store = InMemoryArtifactStore::new();
    let mut record = ArtifactRecord::new("u-1", drill("First Name"), at(0));
    store.upsert(record.clone()).await.unwrap();

    record.artifact = drill("Renamed");
    store.upsert(record.clone()).await.unwrap();

    assert_eq!(store.len().await, 1);
    let stored = store.get("u-1", &record.id).await.unwrap();
    assert_eq!(stored.artifact.name(), "Renamed");
}
