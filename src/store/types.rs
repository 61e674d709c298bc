use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "User" => Some(Role::User),
            "Admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Account record, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // plaintext credential, never exposed in JSON
    pub role: Role,
}

/// Ticket lifecycle states. The transition graph is permissive: an admin
/// may overwrite any status with any other, only unknown names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Ready for Collection")]
    ReadyForCollection,
    Collected,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::ReadyForCollection => "Ready for Collection",
            TicketStatus::Collected => "Collected",
            TicketStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<TicketStatus> {
        match s {
            "Open" => Some(TicketStatus::Open),
            "In Progress" => Some(TicketStatus::InProgress),
            "Ready for Collection" => Some(TicketStatus::ReadyForCollection),
            "Collected" => Some(TicketStatus::Collected),
            "Closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One admin-to-user communication on a ticket. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub product: String,
    pub status: TicketStatus,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub action_taken: Option<String>,
    pub messages: Vec<TicketMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ticket() -> Ticket {
        Ticket {
            id: "12345678".into(),
            title: "Won't boot".into(),
            description: "Black screen on power up".into(),
            category: "Technical".into(),
            priority: "High".into(),
            product: "Laptop X".into(),
            status: TicketStatus::Open,
            created_by: "u1@test.com".into(),
            created_at: time::macros::datetime!(2026-01-15 10:30:00 UTC),
            action_taken: None,
            messages: vec![],
        }
    }

    #[test]
    fn ticket_serializes_with_camel_case_keys() {
        let json = serde_json::to_string(&sample_ticket()).unwrap();
        assert!(json.contains("\"createdBy\":\"u1@test.com\""));
        assert!(json.contains("\"createdAt\":\"2026-01-15T10:30:00Z\""));
        assert!(json.contains("\"actionTaken\":null"));
        assert!(json.contains("\"status\":\"Open\""));
    }

    #[test]
    fn status_round_trips_through_display_names() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::ReadyForCollection,
            TicketStatus::Collected,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("Reopened"), None);
    }

    #[test]
    fn user_password_is_not_serialized() {
        let user = User {
            email: "u1@test.com".into(),
            password: "pw1".into(),
            role: Role::User,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("pw1"));
        assert!(json.contains("\"role\":\"User\""));
    }
}
