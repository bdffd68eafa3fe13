use std::{collections::HashMap, sync::Arc};

use pdi_core::entity::OwnedEntity;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Locally held records, keyed by id. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct EntityCache {
  entries: Arc<RwLock<HashMap<Uuid, OwnedEntity>>>,
}

impl EntityCache {
  pub fn new() -> Self { Self::default() }

  pub async fn get(&self, id: Uuid) -> Option<OwnedEntity> {
    self.entries.read().await.get(&id).cloned()
  }

  pub async fn insert(&self, entity: OwnedEntity) {
    self.entries.write().await.insert(entity.entity_id, entity);
  }

  pub async fn extend(&self, entities: impl IntoIterator<Item = OwnedEntity>) {
    let mut entries = self.entries.write().await;
    entries.extend(entities.into_iter().map(|e| (e.entity_id, e)));
  }
}
