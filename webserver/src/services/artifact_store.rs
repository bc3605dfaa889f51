//! In-process artifact store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::WebServerResult;
use crate::traits::ArtifactStore;
use crate::types::{ArtifactRecord, StoredArtifact};

/// Artifacts held in memory, keyed by user then artifact id.
///
/// Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    records: RwLock<HashMap<String, HashMap<Uuid, ArtifactRecord>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, user_id: &str, id: &Uuid) -> Option<ArtifactRecord> {
        self.records
            .read()
            .await
            .get(user_id)
            .and_then(|records| records.get(id))
            .cloned()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn upsert(&self, record: ArtifactRecord) -> WebServerResult<()> {
        self.records
            .write()
            .await
            .entry(record.user_id.clone())
            .or_default()
            .insert(record.id, record);
        Ok(())
    }

    async fn recent_drill_names(&self, user_id: &str, limit: usize) -> WebServerResult<Vec<String>> {
        let records = self.records.read().await;
        let Some(user_records) = records.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut drills: Vec<&ArtifactRecord> = user_records
            .values()
            .filter(|r| matches!(r.artifact, StoredArtifact::Drill(_)))
            .collect();
        drills.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(drills
            .into_iter()
            .take(limit)
            .map(|r| r.artifact.name().to_string())
            .collect())
    }
}
