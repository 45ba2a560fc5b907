//! Registry and history routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use branchsync_engine::{Employee, EmployeeFields, Error as EngineError, LoggedEntry};

use crate::error::Result;
use crate::handlers::{employee_id, CreateEmployeeRequest, SearchQuery};
use crate::AppState;

/// Create employee routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_handler).post(create_handler))
        .route("/employees/search", get(search_handler))
        .route("/employees/{id}", get(read_handler).put(update_handler))
        .route("/employees/{id}/peek", get(peek_handler))
        .route("/history", get(history_handler))
}

/// POST /employees - Create an employee owned by this node.
async fn create_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>)> {
    let id = employee_id(&request.id)?;
    let employee = state.node.create(id, request.fields).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT /employees/{id} - Overwrite an employee's fields.
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<EmployeeFields>,
) -> Result<Json<Employee>> {
    let employee = state.node.update(employee_id(&id)?, fields).await?;
    Ok(Json(employee))
}

/// GET /employees/{id} - Point read, recorded in history.
async fn read_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>> {
    let employee = state.node.read(employee_id(&id)?).await?;
    Ok(Json(employee))
}

/// GET /employees/{id}/peek - Lookup that leaves no history entry.
async fn peek_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Employee>> {
    let id = employee_id(&id)?;
    let employee = state
        .node
        .replica()
        .get(id)
        .await
        .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
    Ok(Json(employee))
}

/// GET /employees/search?q=&limit= - Id-prefix or name matches, not recorded.
async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Employee>> {
    let limit = query.limit();
    Json(state.node.replica().search(&query.q, limit).await)
}

/// GET /employees - Plain listing, not recorded.
async fn list_handler(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.node.replica().employees().await)
}

/// GET /history - Newest first.
async fn history_handler(State(state): State<AppState>) -> Json<Vec<LoggedEntry>> {
    Json(state.node.replica().history().await)
}
