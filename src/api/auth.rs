use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{LendingError, LendingResult};
use super::extract::LendingJson;
use crate::domain::{DomainError, NewUser};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{create_jwt, hash_password, verify_password};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub company: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn invalid_credentials() -> LendingError {
    LendingError(DomainError::Unauthorized(
        "Invalid email or password".to_string(),
    ))
}

pub async fn signup(
    State(state): State<AppState>,
    LendingJson(payload): LendingJson<SignupRequest>,
) -> LendingResult<impl IntoResponse> {
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();
    let company = payload.company.trim().to_string();

    if username.is_empty() || email.is_empty() || company.is_empty() {
        return Err(DomainError::validation("username, email and company are required").into());
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))
        .into());
    }
    if state.user_repo.exists(&username, &email).await? {
        return Err(DomainError::validation("Username or email already registered").into());
    }

    let password_hash = hash_password(&payload.password).map_err(DomainError::Internal)?;
    let user = state
        .user_repo
        .create(NewUser {
            username,
            email,
            password_hash,
            company,
            role: "user".to_string(),
        })
        .await?;

    tracing::info!("User {} signed up for company '{}'", user.username, user.company);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User created successfully",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    LendingJson(payload): LendingJson<LoginRequest>,
) -> LendingResult<Json<Value>> {
    let email = payload.email.trim().to_lowercase();
    tracing::info!("Login attempt for {}", email);

    let (user, password_hash) = match state.user_repo.find_credentials(&email).await? {
        Some(found) => found,
        None => {
            tracing::warn!("Unknown account: {}", email);
            return Err(invalid_credentials());
        }
    };

    let valid = verify_password(&payload.password, &password_hash).map_err(|e| {
        tracing::error!("Stored password hash for {} is unreadable: {}", email, e);
        DomainError::Internal("Failed to verify password".to_string())
    })?;
    if !valid {
        tracing::warn!("Invalid password for {}", email);
        return Err(invalid_credentials());
    }

    let token = create_jwt(user.id, &user.username, &user.company, &user.role)
        .map_err(DomainError::Internal)?;

    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": user,
    })))
}
