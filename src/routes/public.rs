use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::dto::public_dto::{PublicExamResponse, SubmitResponsePayload, SubmitResultResponse};
use crate::error::Result;
use crate::AppState;

#[axum::debug_handler]
pub async fn get_exam_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.find_active_by_token(&token).await?;
    let questions = state.exam_service.load_questions(exam.id).await?;
    Ok(Json(PublicExamResponse::from_parts(exam, questions)))
}

#[axum::debug_handler]
pub async fn submit_response(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<SubmitResponsePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    tracing::info!("Submission received for share token: {}", token);

    let exam = state.exam_service.find_active_by_token(&token).await?;
    let questions = state.exam_service.load_questions(exam.id).await?;

    let (response, answers) = state
        .response_service
        .create_response(exam.id, &questions, &payload)
        .await?;

    let result = SubmitResultResponse::from_parts(response, answers, &questions);
    tracing::info!(
        "Response {} graded: {}/{} ({}%)",
        result.response.id,
        result.score,
        result.total_points,
        result.percentage
    );

    Ok((StatusCode::CREATED, Json(result)))
}
