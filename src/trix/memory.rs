use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    model::{Trix, TrixId},
    repo::TrixStore,
};

/// Process-local store, selected with `TRIX_STORE=memory`.
#[derive(Default)]
pub struct MemoryTrixStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: TrixId,
    rows: Vec<Trix>,
}

impl MemoryTrixStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrixStore for MemoryTrixStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Trix>> {
        let mut rows = self.inner.read().await.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get(&self, id: TrixId, owner: Uuid) -> anyhow::Result<Option<Trix>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .cloned())
    }

    async fn create(&self, owner: Uuid, text: &str, photo: Option<&str>) -> anyhow::Result<Trix> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let trix = Trix {
            id: inner.last_id,
            user_id: owner,
            text: text.to_string(),
            photo: photo.map(str::to_string),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.rows.push(trix.clone());
        Ok(trix)
    }

    async fn update(
        &self,
        id: TrixId,
        owner: Uuid,
        text: &str,
        photo: Option<&str>,
    ) -> anyhow::Result<Option<Trix>> {
        let mut inner = self.inner.write().await;
        let Some(trix) = inner
            .rows
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
        else {
            return Ok(None);
        };
        trix.text = text.to_string();
        trix.photo = photo.map(str::to_string);
        trix.user_id = owner;
        Ok(Some(trix.clone()))
    }

    async fn delete(&self, id: TrixId, owner: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(inner.rows.len() < before)
    }
}
