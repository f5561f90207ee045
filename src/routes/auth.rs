use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use url::Url;
use validator::Validate;

use crate::{
    dto::auth_dto::{
        AuthResponse, ChangePasswordPayload, GoogleLoginPayload, LoginPayload, RegisterPayload,
        UpdateProfilePayload, UserResponse,
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::user::User,
    utils::jwt::sign_token,
    AppState,
};

fn auth_response(user: User) -> Result<AuthResponse> {
    let config = crate::config::get_config();
    let token = sign_token(
        user.id,
        user.role,
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;
    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.auth_service.register(payload).await?;
    tracing::info!("Registered new user: {}", user.id);
    Ok((StatusCode::CREATED, Json(auth_response(user)?)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(auth_response(user)?))
}

#[axum::debug_handler]
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state
        .google_service
        .verify_id_token(&payload.id_token)
        .await?;
    let user = state.auth_service.login_with_google(&profile).await?;
    tracing::info!("Google sign-in for user: {}", user.id);
    Ok(Json(auth_response(user)?))
}

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.get_user(auth.id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    if let Some(avatar_url) = payload.avatar_url.as_deref() {
        let parsed = Url::parse(avatar_url)
            .map_err(|_| Error::BadRequest("Avatar link is not a valid URL".to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::BadRequest(
                "Only HTTP and HTTPS avatar links are allowed".to_string(),
            ));
        }
    }

    let user = state
        .auth_service
        .update_profile(auth.id, payload.name, payload.avatar_url)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .auth_service
        .change_password(auth.id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
