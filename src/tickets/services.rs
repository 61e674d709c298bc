use anyhow::anyhow;
use rand::Rng;
use time::OffsetDateTime;
use tracing::info;

use crate::error::AppError;
use crate::mailer::notify;
use crate::state::AppState;
use crate::store::{Role, Store, Ticket, TicketMessage, TicketStatus};
use crate::tickets::dto::CreateTicketRequest;

/// Whose tickets a product-history query covers.
#[derive(Debug, Clone)]
pub enum HistoryScope {
    AllUsers,
    User(String),
}

const ID_ATTEMPTS: usize = 16;

/// Draws 8-digit ids until one is unused. Ids are never reused, so a
/// collision just means another draw.
async fn fresh_ticket_id(store: &dyn Store) -> Result<String, AppError> {
    for _ in 0..ID_ATTEMPTS {
        let id = {
            let mut rng = rand::thread_rng();
            rng.gen_range(10_000_000..100_000_000u32).to_string()
        };
        if store.find_ticket(&id).await?.is_none() {
            return Ok(id);
        }
    }
    Err(AppError::Internal(anyhow!(
        "could not allocate a unique ticket id after {ID_ATTEMPTS} attempts"
    )))
}

pub async fn create_ticket(
    state: &AppState,
    req: CreateTicketRequest,
) -> Result<Ticket, AppError> {
    let CreateTicketRequest {
        title,
        description,
        category,
        priority,
        email,
        product,
    } = req;

    for (name, value) in [
        ("title", &title),
        ("description", &description),
        ("category", &category),
        ("priority", &priority),
        ("email", &email),
        ("product", &product),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} is required")));
        }
    }

    let creator = state
        .store
        .find_user(&email)
        .await?
        .filter(|u| u.role == Role::User)
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let id = fresh_ticket_id(state.store.as_ref()).await?;
    let ticket = Ticket {
        id: id.clone(),
        title,
        description,
        category,
        priority,
        product,
        status: TicketStatus::Open,
        created_by: creator.email,
        created_at: OffsetDateTime::now_utc(),
        action_taken: None,
        messages: Vec::new(),
    };
    state.store.insert_ticket(&ticket).await?;
    info!(id = %ticket.id, created_by = %ticket.created_by, "ticket created");

    notify(
        state.mailer.as_ref(),
        &ticket.created_by,
        &format!("Ticket Created (Ref #{id})"),
        &format!(
            "Your support ticket has been successfully created. Ref #: {id}. \
             We will review it shortly."
        ),
    )
    .await;
    if let Some(admin) = &state.config.mail.admin_email {
        notify(
            state.mailer.as_ref(),
            admin,
            &format!("New Ticket Submitted (Ref #{id})"),
            &format!(
                "{} filed a new {} priority ticket for {}.",
                ticket.created_by, ticket.priority, ticket.product
            ),
        )
        .await;
    }

    Ok(ticket)
}

/// Overwrites the status unconditionally within the known set. An absent
/// `action_taken` keeps the prior value. The store write commits before the
/// notification is attempted.
pub async fn update_status(
    state: &AppState,
    id: &str,
    status: &str,
    action_taken: Option<String>,
) -> Result<Ticket, AppError> {
    let status = TicketStatus::parse(status)
        .ok_or_else(|| AppError::Validation(format!("Unknown status: {status}")))?;

    let updated = state
        .store
        .set_status(id, status, action_taken.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;
    info!(id, status = %status, "ticket status updated");

    let action = updated.action_taken.as_deref().unwrap_or("None");
    notify(
        state.mailer.as_ref(),
        &updated.created_by,
        &format!("Ticket Updated (Ref #{id})"),
        &format!("Your ticket has been updated.\nNew Status: {status}\nAction Taken: {action}"),
    )
    .await;

    Ok(updated)
}

pub async fn append_message(
    state: &AppState,
    id: &str,
    text: &str,
) -> Result<TicketMessage, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".into()));
    }

    let message = TicketMessage {
        text: text.to_string(),
        timestamp: OffsetDateTime::now_utc(),
    };
    let ticket = state
        .store
        .append_message(id, &message)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;
    info!(id, "message appended");

    notify(
        state.mailer.as_ref(),
        &ticket.created_by,
        &format!("New Message on Ticket (Ref #{id})"),
        &format!("A new message has been added to your ticket:\n\n{text}"),
    )
    .await;

    Ok(message)
}

pub async fn ticket_by_id(store: &dyn Store, id: &str) -> Result<Ticket, AppError> {
    store
        .find_ticket(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".into()))
}

pub async fn product_history(
    store: &dyn Store,
    product: &str,
    scope: HistoryScope,
) -> Result<Vec<Ticket>, AppError> {
    let created_by = match &scope {
        HistoryScope::AllUsers => None,
        HistoryScope::User(email) => Some(email.as_str()),
    };
    Ok(store.tickets_by_product(product, created_by).await?)
}
