use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::report_dto::{OverviewResponse, StudentReportResponse},
    error::Result,
    middleware::auth::AuthUser,
    AppState,
};

#[axum::debug_handler]
pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let items = state.report_service.overview(auth.id).await?;
    Ok(Json(OverviewResponse { items }))
}

#[axum::debug_handler]
pub async fn exam_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.find_owned(exam_id, auth.id).await?;
    let stats = state.report_service.exam_stats(&exam).await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn students(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let items = state.report_service.student_reports(auth.id).await?;
    Ok(Json(StudentReportResponse { items }))
}
