use serde::{Deserialize, Serialize};

use crate::store::{Ticket, TicketMessage};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub email: String,
    pub product: String,
}

/// Status arrives as a plain string so an unknown name surfaces as a
/// validation error in the standard failure envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    pub status: String,
    #[serde(default)]
    pub action_taken: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub success: bool,
    pub ticket: Ticket,
}

#[derive(Debug, Serialize)]
pub struct MessageAppendedResponse {
    pub success: bool,
    pub message: TicketMessage,
}
