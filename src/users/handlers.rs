use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::dto::PublicUser,
    error::AppError,
    state::AppState,
    users::{
        dto::{MessageResponse, RegisterRequest, RegisterResponse, UpdatePasswordRequest},
        services,
    },
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/register", post(register))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:email", delete(deregister))
}

pub fn self_service_routes() -> Router<AppState> {
    Router::new().route("/user/update-password", put(update_password))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let user = services::register(&state, &payload.email, &payload.password).await?;
    Ok(Json(RegisterResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn deregister(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    services::deregister(&state, &email).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "User and associated tickets deleted.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    services::change_password(
        &state,
        &payload.email,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Password updated successfully.".into(),
    }))
}
