//! Student Routes
//!
//! One handler per endpoint: decode and validate the request, call the
//! store once, and shape the result. Failures become [`ApiError`]s, which
//! carry their own status mapping.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use data_validator::StudentPayload;
use serde::Serialize;
use storage::{NewStudent, Student};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Response for a successful create
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

/// Response for a successful update or delete
#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub id: String,
    #[serde(rename = "rowsAffected")]
    pub rows_affected: String,
}

impl WriteResponse {
    fn new(id: i64, rows_affected: u64) -> Self {
        Self {
            id: id.to_string(),
            rows_affected: rows_affected.to_string(),
        }
    }
}

/// `POST /api/students`
pub async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    info!("Creating a new student");
    let student = decode_student(&state, &body)?;

    let id = state.store.create_student(&student).await?;

    info!(id, "Student created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `GET /api/students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    info!(id = %raw_id, "Getting a student");
    let id = parse_id(&raw_id)?;

    let student = state.store.get_student_by_id(id).await?;
    Ok(Json(student))
}

/// `GET /api/students`
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    info!("Getting all students");

    let students = state.store.get_student_list().await?;
    Ok(Json(students))
}

/// `PUT /api/students/{id}`
pub async fn update_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<WriteResponse>, ApiError> {
    info!(id = %raw_id, "Updating a student");
    let id = parse_id(&raw_id)?;
    let student = decode_student(&state, &body)?;

    let rows = state.store.update_student(&student, id).await?;

    info!(id, rows, "Student updated");
    Ok(Json(WriteResponse::new(id, rows)))
}

/// `DELETE /api/students/{id}`
pub async fn delete_student(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<WriteResponse>, ApiError> {
    info!(id = %raw_id, "Deleting a student");
    let id = parse_id(&raw_id)?;

    let rows = state.store.delete_student(id).await?;

    info!(id, rows, "Student deleted");
    Ok(Json(WriteResponse::new(id, rows)))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::MalformedId(raw.to_string()))
}

/// Decode the body, then validate it into a write payload
fn decode_student(state: &AppState, body: &[u8]) -> Result<NewStudent, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::EmptyBody);
    }

    let payload: StudentPayload =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    state.validator.validate(&payload).map_err(ApiError::Validation)
}
