use async_trait::async_trait;

mod memory;
mod postgres;
mod types;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use types::{Role, Ticket, TicketMessage, TicketStatus, User};

/// Persistence boundary for accounts and tickets. `PgStore` backs it in
/// production, `MemoryStore` in tests and `AppState::fake()`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn insert_user(&self, user: &User) -> anyhow::Result<()>;
    /// Returns false when no such user exists.
    async fn set_password(&self, email: &str, new_password: &str) -> anyhow::Result<bool>;
    /// Non-admin accounts only.
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;
    /// Deletes the user and every ticket they created in one atomic batch.
    /// Returns false when no such user exists.
    async fn delete_user_with_tickets(&self, email: &str) -> anyhow::Result<bool>;

    async fn insert_ticket(&self, ticket: &Ticket) -> anyhow::Result<()>;
    async fn find_ticket(&self, id: &str) -> anyhow::Result<Option<Ticket>>;
    /// Creation-time order, complete (no pagination).
    async fn tickets_by_user(&self, email: &str) -> anyhow::Result<Vec<Ticket>>;
    /// Newest first.
    async fn all_tickets(&self) -> anyhow::Result<Vec<Ticket>>;
    /// Case-insensitive exact match on product name, newest first,
    /// optionally narrowed to one creator.
    async fn tickets_by_product(
        &self,
        product: &str,
        created_by: Option<&str>,
    ) -> anyhow::Result<Vec<Ticket>>;
    /// Overwrites the status; a `None` action keeps the prior value.
    /// Returns the updated ticket, or `None` for an unknown id.
    async fn set_status(
        &self,
        id: &str,
        status: TicketStatus,
        action_taken: Option<&str>,
    ) -> anyhow::Result<Option<Ticket>>;
    /// Atomic append; prior messages are never rewritten. Returns the
    /// updated ticket, or `None` for an unknown id.
    async fn append_message(
        &self,
        id: &str,
        message: &TicketMessage,
    ) -> anyhow::Result<Option<Ticket>>;
}
