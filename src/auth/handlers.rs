use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse},
        services::authenticate,
    },
    error::AppError,
    state::AppState,
    store::Role,
};

pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/admin/login", post(admin_login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = authenticate(
        state.store.as_ref(),
        &payload.email,
        &payload.password,
        Role::User,
    )
    .await?;
    info!(email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        success: true,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = authenticate(
        state.store.as_ref(),
        &payload.email,
        &payload.password,
        Role::Admin,
    )
    .await?;
    info!(email = %user.email, "admin logged in");
    Ok(Json(LoginResponse {
        success: true,
        user: user.into(),
    }))
}
