use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::utils::jwt::decode_token;

/// The authenticated caller, inserted into request extensions by the auth
/// middleware and pulled out by handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

pub async fn require_auth(req: Request, next: Next) -> Response {
    match authenticate(req) {
        Ok((req, _)) => next.run(req).await,
        Err(rejection) => rejection,
    }
}

pub async fn require_tutor(req: Request, next: Next) -> Response {
    match authenticate(req) {
        Ok((req, user)) => {
            if user.role != UserRole::Tutor {
                return failure(StatusCode::FORBIDDEN, "Tutor access required");
            }
            next.run(req).await
        }
        Err(rejection) => rejection,
    }
}

fn authenticate(mut req: Request) -> Result<(Request, AuthUser), Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "Missing authorization header",
        ));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "Malformed authorization header",
        ));
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(failure(
            StatusCode::UNAUTHORIZED,
            "Unsupported authorization scheme",
        ));
    };

    let config = crate::config::get_config();
    let Ok(claims) = decode_token(token, &config.jwt_secret) else {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid or expired token"));
    };
    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        return Err(failure(StatusCode::UNAUTHORIZED, "Invalid token subject"));
    };

    let user = AuthUser {
        id: user_id,
        role: claims.role,
    };
    req.extensions_mut().insert(user);
    Ok((req, user))
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}
