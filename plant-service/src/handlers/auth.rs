use crate::dtos::{LoginRequest, MessageResponse, RegisterRequest};
use crate::middleware::auth_user::session_error;
use crate::middleware::{AuthUser, ValidatedJson, AUTHENTICATED_KEY, USER_ID_KEY};
use crate::models::NewUser;
use crate::startup::AppState;
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use plant_core::error::AppError;
use tower_sessions::Session;

/// Mark the session as signed in for `user_id` under a fresh id, so any
/// cookie the client held before stops working.
async fn sign_in(session: &Session, user_id: i64) -> Result<(), AppError> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(USER_ID_KEY, user_id)
        .await
        .map_err(session_error)?;
    session
        .insert(AUTHENTICATED_KEY, true)
        .await
        .map_err(session_error)?;
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = hash_password(&Password::new(req.password))?;

    let user = state
        .storage
        .create_user(NewUser {
            username: req.username,
            password_hash: password_hash.into_string(),
            email: req.email.filter(|e| !e.is_empty()),
            name: req.name.filter(|n| !n.trim().is_empty()),
        })
        .await?;

    sign_in(&session, user.id).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::Unauthorized(anyhow::anyhow!("Invalid username or password"));

    let user = state
        .storage
        .get_user_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    verify_password(
        &Password::new(req.password),
        &PasswordHashString::new(user.password_hash.clone()),
    )
    .map_err(|_| {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        invalid()
    })?;

    sign_in(&session, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(user.sanitized()))
}

pub async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    let user_id: Option<i64> = session.get(USER_ID_KEY).await.map_err(session_error)?;

    // Deletes the stored record and expires the cookie
    session.flush().await.map_err(session_error)?;

    if let Some(user_id) = user_id {
        tracing::info!(user_id, "User logged out");
    }

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

pub async fn current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .storage
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Account no longer exists")))?;

    Ok(Json(user.sanitized()))
}
