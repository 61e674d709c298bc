use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    state::AppState,
    store::Ticket,
    tickets::{
        dto::{
            AppendMessageRequest, CreateTicketRequest, MessageAppendedResponse, TicketResponse,
            UpdateTicketRequest,
        },
        services::{self, HistoryScope},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket))
        .route("/tickets/:email", get(tickets_by_user))
        .route("/tickets/:email/product/:product", get(user_product_history))
        .route("/ticket/:id", get(ticket_by_id))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/tickets", get(all_tickets))
        .route("/admin/tickets/product/:product", get(product_history))
        .route("/admin/tickets/:id", put(update_ticket))
        .route("/admin/tickets/:id/message", post(append_message))
}

#[instrument(skip(state, payload))]
pub async fn create_ticket(
    State(state): State<AppState>,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket = services::create_ticket(&state, payload).await?;
    Ok(Json(TicketResponse {
        success: true,
        ticket,
    }))
}

#[instrument(skip(state))]
pub async fn tickets_by_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.store.tickets_by_user(&email).await?))
}

#[instrument(skip(state))]
pub async fn user_product_history(
    State(state): State<AppState>,
    Path((email, product)): Path<(String, String)>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets =
        services::product_history(state.store.as_ref(), &product, HistoryScope::User(email))
            .await?;
    Ok(Json(tickets))
}

#[instrument(skip(state))]
pub async fn ticket_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, AppError> {
    Ok(Json(services::ticket_by_id(state.store.as_ref(), &id).await?))
}

#[instrument(skip(state))]
pub async fn all_tickets(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, AppError> {
    Ok(Json(state.store.all_tickets().await?))
}

#[instrument(skip(state))]
pub async fn product_history(
    State(state): State<AppState>,
    Path(product): Path<String>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let tickets =
        services::product_history(state.store.as_ref(), &product, HistoryScope::AllUsers).await?;
    Ok(Json(tickets))
}

#[instrument(skip(state, payload))]
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTicketRequest>,
) -> Result<Json<TicketResponse>, AppError> {
    let ticket =
        services::update_status(&state, &id, &payload.status, payload.action_taken).await?;
    Ok(Json(TicketResponse {
        success: true,
        ticket,
    }))
}

#[instrument(skip(state, payload))]
pub async fn append_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AppendMessageRequest>,
) -> Result<Json<MessageAppendedResponse>, AppError> {
    let message = services::append_message(&state, &id, &payload.message).await?;
    Ok(Json(MessageAppendedResponse {
        success: true,
        message,
    }))
}
