use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use kereta_core::account::{NewUserAccount, UserAccount};
use kereta_core::profile::{ProfileUpdate, UserProfile};
use kereta_store::password;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/profile", get(get_profile).put(update_profile))
        .route("/api/users/{id}", get(get_user))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

async fn get_profile(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.history.get_profile().await?))
}

async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.history.update_profile(update).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserAccount>, AppError> {
    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
    birthdate: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user_id: i64,
    message: String,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password).await?;
    let created = state
        .users
        .create_user(NewUserAccount {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash,
            phone: req.phone,
            birthdate: req.birthdate,
            address: req.address,
        })
        .await?;

    info!(user_id = created.user_id, "user registered");
    Ok(Json(RegisterResponse {
        user_id: created.user_id,
        message: "User registered successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    user_id: i64,
    first_name: String,
    last_name: String,
    email: String,
    membership_level: Option<String>,
}

/// Credentials are checked against the stored salted hash; a missing
/// account and a wrong password are indistinguishable to the caller.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || AppError::AuthenticationError("Invalid credentials".to_string());

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash).await? {
        return Err(invalid());
    }

    Ok(Json(LoginResponse {
        user_id: user.user_id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        membership_level: user.membership_level,
    }))
}
