pub mod form;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod photos;
pub mod repo;
pub mod views;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryTrixStore;
pub use model::{Trix, TrixId};
pub use repo::{PgTrixStore, TrixStore};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
