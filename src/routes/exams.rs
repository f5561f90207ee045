use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::exam_dto::{
        CreateExamPayload, ExamListQuery, ExamListResponse, ExamResponse, UpdateExamPayload,
    },
    error::Result,
    middleware::auth::AuthUser,
    services::exam_service::ExamFilter,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/exams",
    request_body = CreateExamPayload,
    responses(
        (status = 201, description = "Exam created successfully", body = Json<ExamResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_exam(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (exam, questions) = state.exam_service.create_exam(payload, auth.id).await?;
    tracing::info!("Exam created: {} by {}", exam.id, auth.id);
    Ok((
        StatusCode::CREATED,
        Json(ExamResponse::from_parts(exam, questions)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/exams",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("perPage" = Option<i64>, Query, description = "Items per page"),
        ("isActive" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Search in title and description")
    ),
    responses(
        (status = 200, description = "List of the caller's exams", body = Json<ExamListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_exams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExamListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let filter = ExamFilter {
        is_active: query.is_active,
        search: query.search,
    };
    let result = state
        .exam_service
        .list_exams(auth.id, page, per_page, filter)
        .await?;
    Ok(Json(ExamListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/exams/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam ID")
    ),
    responses(
        (status = 200, description = "Exam found", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn get_exam(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (exam, questions) = state.exam_service.get_exam(id, auth.id).await?;
    Ok(Json(ExamResponse::from_parts(exam, questions)))
}

#[utoipa::path(
    patch,
    path = "/api/exams/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam ID")
    ),
    request_body = UpdateExamPayload,
    responses(
        (status = 200, description = "Exam updated successfully", body = Json<ExamResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn update_exam(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (exam, questions) = state.exam_service.update_exam(id, auth.id, payload).await?;
    Ok(Json(ExamResponse::from_parts(exam, questions)))
}

#[utoipa::path(
    delete,
    path = "/api/exams/{id}",
    params(
        ("id" = Uuid, Path, description = "Exam ID")
    ),
    responses(
        (status = 204, description = "Exam deleted successfully"),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_exam(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.exam_service.delete_exam(id, auth.id).await?;
    tracing::info!("Exam deleted: {} by {}", id, auth.id);
    Ok(StatusCode::NO_CONTENT)
}
