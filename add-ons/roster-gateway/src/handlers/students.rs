//! Student CRUD, natural-language query and save endpoints. Each handler is a thin
//! adapter over one `RecordManager` operation.

use super::ApiError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::{QueryOutcome, Record, RecordDraft, RecordPatch};
use serde::Deserialize;

/// Longest accepted `name` / `major` on the HTTP surface.
pub const MAX_FIELD_LENGTH: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Optional case-insensitive name substring.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    /// Generated when absent or empty.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub major: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(alias = "query_text")]
    pub text: String,
}

fn check_length(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) if v.chars().count() > MAX_FIELD_LENGTH => Err(ApiError::BadRequest(format!(
            "{} must be at most {} characters",
            field, MAX_FIELD_LENGTH
        ))),
        _ => Ok(()),
    }
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// GET /students – all students in id order, optionally filtered by `?name=`.
pub async fn list_students(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Query(params) = params?;
    let manager = state.manager.read().await;
    let records = match params.name.as_deref() {
        Some(part) => manager.find_by_name(part),
        None => manager.all(),
    };
    Ok(Json(records.into_iter().cloned().collect()))
}

/// GET /students/:id
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let manager = state.manager.read().await;
    Ok(Json(manager.get(&id)?.clone()))
}

/// POST /students – 201 with the stored record.
pub async fn create_student(
    State(state): State<AppState>,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let Json(req) = body?;
    check_length("name", Some(&req.name))?;
    check_length("major", Some(&req.major))?;
    let id = req
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generate_id);
    let draft = RecordDraft::new(id, req.name, req.age, req.gender, req.major);
    let record = state.manager.write().await.add(draft)?;
    tracing::info!(target: "roster::gateway", id = %record.id, "student created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /students/:id – absent body fields keep their current values.
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<RecordPatch>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    let Json(patch) = body?;
    check_length("name", patch.name.as_deref())?;
    check_length("major", patch.major.as_deref())?;
    let record = state.manager.write().await.patch(&id, patch)?;
    tracing::info!(target: "roster::gateway", id = %record.id, "student updated");
    Ok(Json(record))
}

/// DELETE /students/:id – 204 on success.
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.manager.write().await.delete(&id)?;
    tracing::info!(target: "roster::gateway", id = %id, "student deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /query?text=... – matches plus the parameters the agent extracted.
pub async fn query_students(
    State(state): State<AppState>,
    query: Result<Query<QueryRequest>, QueryRejection>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let Query(req) = query?;
    let outcome = state.manager.read().await.query(&req.text)?;
    Ok(Json(outcome))
}

/// POST /save – flushes the whole roster to storage.
pub async fn save_students(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let manager = state.manager.read().await;
    manager.save()?;
    Ok(Json(serde_json::json!({
        "message": "Data saved successfully.",
        "storage": manager.storage_description(),
        "record_count": manager.len(),
    })))
}
