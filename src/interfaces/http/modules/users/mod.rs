//! Users module: CRUD, bulk delete, random-user ingestion and stats

pub mod dto;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;

pub use dto::*;
pub use handlers::*;

/// Routes mounted under `/api/v1/users`.
pub fn router(state: UserHandlerState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/stats", get(user_stats))
        .route("/add", post(add_users))
        .route("/delete-multiple", post(delete_multiple_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(state)
}
