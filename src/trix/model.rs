use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub type TrixId = i64;

/// A trix record.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Trix {
    pub id: TrixId,
    pub user_id: Uuid,              // owner
    pub text: String,
    pub photo: Option<String>,      // object storage key
    pub created_at: OffsetDateTime, // list ordering key
}
