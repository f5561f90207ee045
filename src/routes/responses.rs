use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::response_dto::{ResponseDetail, ResponseListResponse, ResponseSummary, SetScorePayload},
    error::{Error, Result},
    middleware::auth::AuthUser,
    AppState,
};

#[axum::debug_handler]
pub async fn list_exam_responses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(exam_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.exam_service.find_owned(exam_id, auth.id).await?;
    let responses = state.response_service.list_for_exam(exam_id).await?;
    let items: Vec<ResponseSummary> = responses.into_iter().map(Into::into).collect();
    Ok(Json(ResponseListResponse { items }))
}

#[axum::debug_handler]
pub async fn get_response(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(response_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (response, author_id) = state.response_service.find_with_author(response_id).await?;
    if author_id != auth.id {
        return Err(Error::Forbidden(
            "Only the exam author can view this response".to_string(),
        ));
    }
    let answers = state.response_service.load_answers(response_id).await?;
    Ok(Json(ResponseDetail::from_parts(response, answers)))
}

#[axum::debug_handler]
pub async fn set_score(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(response_id): Path<Uuid>,
    Json(payload): Json<SetScorePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let response = state
        .response_service
        .set_score(response_id, payload.score, auth.id)
        .await?;
    tracing::info!(
        "Score override on response {}: {} by {}",
        response.id,
        payload.score,
        auth.id
    );
    Ok(Json(ResponseSummary::from(response)))
}
