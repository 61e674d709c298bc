use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;

use super::{Role, Store, Ticket, TicketMessage, TicketStatus, User};

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct UserRow {
    email: String,
    password: String,
    role: String,
}

impl UserRow {
    fn into_user(self) -> anyhow::Result<User> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| anyhow!("unknown role {:?} for user {}", self.role, self.email))?;
        Ok(User {
            email: self.email,
            password: self.password,
            role,
        })
    }
}

#[derive(FromRow)]
struct TicketRow {
    id: String,
    title: String,
    description: String,
    category: String,
    priority: String,
    product: String,
    status: String,
    created_by: String,
    created_at: OffsetDateTime,
    action_taken: Option<String>,
    messages: Json<Vec<TicketMessage>>,
}

impl TicketRow {
    fn into_ticket(self) -> anyhow::Result<Ticket> {
        let status = TicketStatus::parse(&self.status)
            .ok_or_else(|| anyhow!("unknown status {:?} on ticket {}", self.status, self.id))?;
        Ok(Ticket {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            product: self.product,
            status,
            created_by: self.created_by,
            created_at: self.created_at,
            action_taken: self.action_taken,
            messages: self.messages.0,
        })
    }
}

fn into_tickets(rows: Vec<TicketRow>) -> anyhow::Result<Vec<Ticket>> {
    rows.into_iter().map(TicketRow::into_ticket).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT email, password, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (email, password, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .execute(&self.db)
        .await
        .context("insert user")?;
        Ok(())
    }

    async fn set_password(&self, email: &str, new_password: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET password = $2 WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(new_password)
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT email, password, role
            FROM users
            WHERE role = 'User'
            ORDER BY email
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn delete_user_with_tickets(&self, email: &str) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await?;
        sqlx::query(r#"DELETE FROM tickets WHERE created_by = $1"#)
            .bind(email)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(r#"DELETE FROM users WHERE email = $1"#)
            .bind(email)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_ticket(&self, ticket: &Ticket) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tickets
                (id, title, description, category, priority, product,
                 status, created_by, created_at, action_taken, messages)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&ticket.id)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(&ticket.category)
        .bind(&ticket.priority)
        .bind(&ticket.product)
        .bind(ticket.status.as_str())
        .bind(&ticket.created_by)
        .bind(ticket.created_at)
        .bind(&ticket.action_taken)
        .bind(Json(&ticket.messages))
        .execute(&self.db)
        .await
        .context("insert ticket")?;
        Ok(())
    }

    async fn find_ticket(&self, id: &str) -> anyhow::Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, category, priority, product,
                   status, created_by, created_at, action_taken, messages
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(TicketRow::into_ticket).transpose()
    }

    async fn tickets_by_user(&self, email: &str) -> anyhow::Result<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, category, priority, product,
                   status, created_by, created_at, action_taken, messages
            FROM tickets
            WHERE created_by = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(email)
        .fetch_all(&self.db)
        .await?;
        into_tickets(rows)
    }

    async fn all_tickets(&self) -> anyhow::Result<Vec<Ticket>> {
        let rows = sqlx::query_as::<_, TicketRow>(
            r#"
            SELECT id, title, description, category, priority, product,
                   status, created_by, created_at, action_taken, messages
            FROM tickets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        into_tickets(rows)
    }

    async fn tickets_by_product(
        &self,
        product: &str,
        created_by: Option<&str>,
    ) -> anyhow::Result<Vec<Ticket>> {
        let rows = match created_by {
            Some(email) => {
                sqlx::query_as::<_, TicketRow>(
                    r#"
                    SELECT id, title, description, category, priority, product,
                           status, created_by, created_at, action_taken, messages
                    FROM tickets
                    WHERE lower(product) = lower($1) AND created_by = $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(product)
                .bind(email)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, TicketRow>(
                    r#"
                    SELECT id, title, description, category, priority, product,
                           status, created_by, created_at, action_taken, messages
                    FROM tickets
                    WHERE lower(product) = lower($1)
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(product)
                .fetch_all(&self.db)
                .await?
            }
        };
        into_tickets(rows)
    }

    async fn set_status(
        &self,
        id: &str,
        status: TicketStatus,
        action_taken: Option<&str>,
    ) -> anyhow::Result<Option<Ticket>> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            UPDATE tickets
            SET status = $2, action_taken = COALESCE($3, action_taken)
            WHERE id = $1
            RETURNING id, title, description, category, priority, product,
                      status, created_by, created_at, action_taken, messages
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(action_taken)
        .fetch_optional(&self.db)
        .await?;
        row.map(TicketRow::into_ticket).transpose()
    }

    async fn append_message(
        &self,
        id: &str,
        message: &TicketMessage,
    ) -> anyhow::Result<Option<Ticket>> {
        // Single-statement jsonb concatenation, no read-modify-write.
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            UPDATE tickets
            SET messages = messages || $2
            WHERE id = $1
            RETURNING id, title, description, category, priority, product,
                      status, created_by, created_at, action_taken, messages
            "#,
        )
        .bind(id)
        .bind(Json(std::slice::from_ref(message)))
        .fetch_optional(&self.db)
        .await?;
        row.map(TicketRow::into_ticket).transpose()
    }
}
