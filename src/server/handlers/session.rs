//! Health, login and session checks.

use axum::{Json, extract::State, http::HeaderMap};
use serde_json::{Value, json};
use std::sync::Arc;

use super::super::auth::{AuthUser, bearer_token, generate_access_token, validate_token};
use super::super::error::{ApiError, ApiResult};
use super::super::models::{LoginRequest, LoginResponse, SessionResponse, User};
use super::super::state::AppState;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /login
pub async fn login(State(state): State<Arc<AppState>>, Json(req): Json<Value>) -> ApiResult<Json<LoginResponse>> {
    let req: LoginRequest = serde_json::from_value(req)
        .ok()
        .filter(|r: &LoginRequest| !r.id.trim().is_empty() && !r.password.is_empty())
        .ok_or_else(|| ApiError::BadRequest("ID and password are required".into()))?;

    let user = if state.config.dev_mode && state.accounts.is_empty() {
        AuthUser::dev().0
    } else {
        state
            .accounts
            .authenticate(req.id.trim(), &req.password)
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?
    };

    let access_token =
        generate_access_token(&user, &state.jwt).map_err(|e| ApiError::Internal(format!("Login failed: {}", e)))?;
    tracing::info!(user = %user.id, "login");
    Ok(Json(LoginResponse {
        success: true,
        access_token,
        user,
    }))
}

/// POST /verify-session
pub async fn verify_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ApiResult<Json<SessionResponse>> {
    if state.config.dev_mode {
        return Ok(Json(SessionResponse {
            success: true,
            user: AuthUser::dev().0,
        }));
    }
    let token = bearer_token(&headers).ok_or_else(|| ApiError::Unauthorized("No token provided".into()))?;
    let claims = validate_token(token, &state.jwt).map_err(|_| ApiError::Unauthorized("Invalid session".into()))?;
    Ok(Json(SessionResponse {
        success: true,
        user: User {
            id: claims.sub,
            email: claims.email,
        },
    }))
}
