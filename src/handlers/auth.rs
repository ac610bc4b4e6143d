use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{ApiResponse, AuthResponse, LoginForm, RegisterRequest, User, UserRole};
use crate::services::auth::bearer_token;
use crate::state::AppState;

/// Resolves the caller's user id from the bearer token.
pub fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<String, AppError> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    bearer_token(header)
        .and_then(|token| state.tokens.verify(token))
        .ok_or(AppError::Unauthorized)
}

fn auth_response(token: String, user: &User) -> AuthResponse {
    AuthResponse {
        access_token: Some(token),
        id: Some(user.id.clone()),
        first_name: Some(user.first_name.clone()),
        last_name: Some(user.last_name.clone()),
        phone_number: Some(user.phone.clone()),
        role: Some(user.role.as_str().to_string()),
        message: None,
        error: None,
    }
}

// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("Please enter a valid email address".to_string()));
    }
    if req.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name are required".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.clone(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: req.phone_number.trim().to_string(),
        // Self-registration only ever creates customers.
        role: UserRole::Customer,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        if queries::get_user_by_email(&db, &email)?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        let digest = state.tokens.hash_password(&email, &req.password);
        queries::create_user(&db, &user, &digest)?;
    }

    tracing::info!(user_id = %user.id, "customer registered");
    let token = state.tokens.issue(&user.id);
    Ok((StatusCode::CREATED, Json(auth_response(token, &user))))
}

// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<AuthResponse>, AppError> {
    let found = {
        let db = state.db.lock().unwrap();
        queries::get_user_by_email(&db, &form.email)?
    };

    let user = match found {
        Some((user, digest)) if state.tokens.verify_password(&user.email, &form.password, &digest) => user,
        _ => {
            tracing::warn!("failed login attempt");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state.tokens.issue(&user.id);
    Ok(Json(auth_response(token, &user)))
}

// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    tracing::info!(user_id = %user_id, "customer logged out");

    let mut resp = ApiResponse::ok(serde_json::Value::Null);
    resp.message = Some("Logged out".to_string());
    Ok(Json(resp))
}

// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user_id = check_auth(&state, &headers)?;
    let user = {
        let db = state.db.lock().unwrap();
        queries::get_user_by_id(&db, &user_id)?
    };
    // A valid signature for a deleted account is still a stale credential.
    let user = user.ok_or(AppError::Unauthorized)?;
    Ok(Json(ApiResponse::ok(user)))
}
