//! HTTP surface for the student directory.
//!
//! This module exposes a compact Axum router:
//!
//! - `GET /` – Health check returning the service status and version (not in the API description).
//! - `GET /students` – List every student in insertion order.
//! - `POST /students` – Create a student; the id is generated when omitted. Responds `201`.
//! - `GET /students/:student_id` – Fetch one student.
//! - `PATCH /students/:student_id` – Merge the supplied fields into an existing student.
//! - `DELETE /students/:student_id` – Remove a student. Responds `204`.
//! - `GET /students/search/by-name?name=` – Case-insensitive exact name match.
//! - `GET /openapi.json` – Generated OpenAPI description of the routes above.
//!
//! Failures are reported as `{"detail": "..."}` with `404`, `409`, or `422`; validation failures
//! also list the offending fields under `errors`. Bodies or query strings that cannot be parsed
//! get the same JSON shape with the status axum assigns to the rejection.

use crate::directory::{
    DirectoryApi, DirectoryError, FieldViolation, NewStudent, Student, StudentPatch,
};
use crate::openapi;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Build the HTTP router exposing the directory operations.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DirectoryApi + 'static,
{
    Router::new()
        .route("/", get(health))
        .route(
            "/students",
            get(list_students::<S>).post(create_student::<S>),
        )
        .route("/students/search/by-name", get(search_students::<S>))
        .route(
            "/students/:student_id",
            get(get_student::<S>)
                .patch(update_student::<S>)
                .delete(delete_student::<S>),
        )
        .route("/openapi.json", get(api_description))
        .with_state(service)
}

/// Response body for `GET /`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn api_description() -> Json<Value> {
    Json(openapi::document())
}

async fn list_students<S>(State(service): State<Arc<S>>) -> Json<Vec<Student>>
where
    S: DirectoryApi,
{
    Json(service.list_all())
}

async fn get_student<S>(
    State(service): State<Arc<S>>,
    Path(student_id): Path<String>,
) -> Result<Json<Student>, AppError>
where
    S: DirectoryApi,
{
    Ok(Json(service.get_by_id(&student_id)?))
}

/// Query string for `GET /students/search/by-name`.
#[derive(Deserialize)]
struct SearchQuery {
    /// Name to match, case-insensitively.
    name: String,
}

async fn search_students<S>(
    State(service): State<Arc<S>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<Student>>, AppError>
where
    S: DirectoryApi,
{
    let Query(query) = query?;
    Ok(Json(service.search_by_name(&query.name)?))
}

async fn create_student<S>(
    State(service): State<Arc<S>>,
    candidate: Result<Json<NewStudent>, JsonRejection>,
) -> Result<(StatusCode, Json<Student>), AppError>
where
    S: DirectoryApi,
{
    let Json(candidate) = candidate?;
    let student = service.create(candidate)?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn update_student<S>(
    State(service): State<Arc<S>>,
    Path(student_id): Path<String>,
    patch: Result<Json<StudentPatch>, JsonRejection>,
) -> Result<Json<Student>, AppError>
where
    S: DirectoryApi,
{
    let Json(patch) = patch?;
    Ok(Json(service.update(&student_id, patch)?))
}

async fn delete_student<S>(
    State(service): State<Arc<S>>,
    Path(student_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: DirectoryApi,
{
    service.delete(&student_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct ErrorBody {
    /// Human-readable description of the failure.
    pub detail: String,
    /// Offending fields, present only for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
}

enum AppError {
    Directory(DirectoryError),
    /// Request body or query string rejected before reaching the directory.
    Malformed { status: StatusCode, detail: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Directory(err) => {
                let status = match &err {
                    DirectoryError::StudentNotFound(_) | DirectoryError::NameNotFound(_) => {
                        StatusCode::NOT_FOUND
                    }
                    DirectoryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    DirectoryError::Conflict(_) => StatusCode::CONFLICT,
                };
                let body = ErrorBody {
                    detail: err.to_string(),
                    errors: err.violations().to_vec(),
                };
                (status, body)
            }
            Self::Malformed { status, detail } => {
                tracing::debug!(%status, detail = %detail, "Rejected malformed request");
                let body = ErrorBody {
                    detail,
                    errors: Vec::new(),
                };
                (status, body)
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<DirectoryError> for AppError {
    fn from(inner: DirectoryError) -> Self {
        Self::Directory(inner)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}
