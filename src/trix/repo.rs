use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{Trix, TrixId};

/// Persistence for trix records.
///
/// Every owner-scoped method answers `None`/`false` both when the id does not
/// exist and when it belongs to another user.
#[async_trait]
pub trait TrixStore: Send + Sync {
    /// All records of all users, newest first.
    async fn list_all(&self) -> anyhow::Result<Vec<Trix>>;
    async fn get(&self, id: TrixId, owner: Uuid) -> anyhow::Result<Option<Trix>>;
    async fn create(&self, owner: Uuid, text: &str, photo: Option<&str>) -> anyhow::Result<Trix>;
    /// Replaces text and photo and stamps `owner` onto the record.
    async fn update(
        &self,
        id: TrixId,
        owner: Uuid,
        text: &str,
        photo: Option<&str>,
    ) -> anyhow::Result<Option<Trix>>;
    async fn delete(&self, id: TrixId, owner: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgTrixStore {
    db: PgPool,
}

impl PgTrixStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrixStore for PgTrixStore {
    async fn list_all(&self) -> anyhow::Result<Vec<Trix>> {
        let rows = sqlx::query_as::<_, Trix>(
            r#"
            SELECT id, user_id, text, photo, created_at
            FROM trixs
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list trixs")?;
        Ok(rows)
    }

    async fn get(&self, id: TrixId, owner: Uuid) -> anyhow::Result<Option<Trix>> {
        let row = sqlx::query_as::<_, Trix>(
            r#"
            SELECT id, user_id, text, photo, created_at
            FROM trixs
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await
        .context("get trix")?;
        Ok(row)
    }

    async fn create(&self, owner: Uuid, text: &str, photo: Option<&str>) -> anyhow::Result<Trix> {
        let row = sqlx::query_as::<_, Trix>(
            r#"
            INSERT INTO trixs (user_id, text, photo)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, text, photo, created_at
            "#,
        )
        .bind(owner)
        .bind(text)
        .bind(photo)
        .fetch_one(&self.db)
        .await
        .context("insert trix")?;
        Ok(row)
    }

    async fn update(
        &self,
        id: TrixId,
        owner: Uuid,
        text: &str,
        photo: Option<&str>,
    ) -> anyhow::Result<Option<Trix>> {
        let row = sqlx::query_as::<_, Trix>(
            r#"
            UPDATE trixs
               SET text = $3, photo = $4, user_id = $2
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, text, photo, created_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(text)
        .bind(photo)
        .fetch_optional(&self.db)
        .await
        .context("update trix")?;
        Ok(row)
    }

    async fn delete(&self, id: TrixId, owner: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM trixs WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await
            .context("delete trix")?;
        Ok(res.rows_affected() > 0)
    }
}
