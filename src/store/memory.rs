use anyhow::{anyhow, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{Role, Store, Ticket, TicketMessage, TicketStatus, User};

/// In-process store with the same semantics as `PgStore`. Tickets keep
/// insertion order; every operation runs under one lock, so the cascade
/// delete and the message append are atomic here too.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    tickets: Vec<Ticket>,
}

impl MemoryStore {
    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| anyhow!("store mutex poisoned"))
    }
}

fn newest_first(mut tickets: Vec<Ticket>) -> Vec<Ticket> {
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    tickets
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock()?.users.get(email).cloned())
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if inner.users.contains_key(&user.email) {
            bail!("user {} already exists", user.email);
        }
        inner.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn set_password(&self, email: &str, new_password: &str) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        match inner.users.get_mut(email) {
            Some(user) => {
                user.password = new_password.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let inner = self.lock()?;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|u| u.role == Role::User)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn delete_user_with_tickets(&self, email: &str) -> anyhow::Result<bool> {
        let mut inner = self.lock()?;
        if inner.users.remove(email).is_none() {
            return Ok(false);
        }
        inner.tickets.retain(|t| t.created_by != email);
        Ok(true)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> anyhow::Result<()> {
        let mut inner = self.lock()?;
        if inner.tickets.iter().any(|t| t.id == ticket.id) {
            bail!("ticket {} already exists", ticket.id);
        }
        inner.tickets.push(ticket.clone());
        Ok(())
    }

    async fn find_ticket(&self, id: &str) -> anyhow::Result<Option<Ticket>> {
        Ok(self.lock()?.tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn tickets_by_user(&self, email: &str) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .lock()?
            .tickets
            .iter()
            .filter(|t| t.created_by == email)
            .cloned()
            .collect())
    }

    async fn all_tickets(&self) -> anyhow::Result<Vec<Ticket>> {
        Ok(newest_first(self.lock()?.tickets.clone()))
    }

    async fn tickets_by_product(
        &self,
        product: &str,
        created_by: Option<&str>,
    ) -> anyhow::Result<Vec<Ticket>> {
        let tickets = self
            .lock()?
            .tickets
            .iter()
            .filter(|t| t.product.eq_ignore_ascii_case(product))
            .filter(|t| created_by.map_or(true, |email| t.created_by == email))
            .cloned()
            .collect();
        Ok(newest_first(tickets))
    }

    async fn set_status(
        &self,
        id: &str,
        status: TicketStatus,
        action_taken: Option<&str>,
    ) -> anyhow::Result<Option<Ticket>> {
        let mut inner = self.lock()?;
        let Some(ticket) = inner.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        ticket.status = status;
        if let Some(action) = action_taken {
            ticket.action_taken = Some(action.to_string());
        }
        Ok(Some(ticket.clone()))
    }

    async fn append_message(
        &self,
        id: &str,
        message: &TicketMessage,
    ) -> anyhow::Result<Option<Ticket>> {
        let mut inner = self.lock()?;
        let Some(ticket) = inner.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        ticket.messages.push(message.clone());
        Ok(Some(ticket.clone()))
    }
}
