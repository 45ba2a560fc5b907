//! HTTP route definitions.

mod employees;
mod sync;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(employees::routes())
        .merge(sync::routes())
}
