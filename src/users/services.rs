use tracing::info;

use crate::auth::services::is_valid_email;
use crate::error::AppError;
use crate::mailer::notify;
use crate::state::AppState;
use crate::store::{Role, User};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Admin-driven account creation. The welcome mail carries the temporary
/// password; its delivery is best-effort and the account exists either way.
pub async fn register(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    if state.store.find_user(email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".into()));
    }

    let user = User {
        email: email.to_string(),
        password: password.to_string(),
        role: Role::User,
    };
    state.store.insert_user(&user).await?;
    info!(email, "user registered");

    notify(
        state.mailer.as_ref(),
        email,
        "Welcome to the Support Portal",
        &format!(
            "Your account has been created. Your temporary password is: {password}. \
             Please login and change it."
        ),
    )
    .await;

    Ok(user)
}

pub async fn change_password(
    state: &AppState,
    email: &str,
    current_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let matches = state
        .store
        .find_user(email)
        .await?
        .map_or(false, |user| user.password == current_password);
    if !matches {
        return Err(AppError::Auth("Invalid current password.".into()));
    }

    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    state.store.set_password(email, new_password).await?;
    info!(email, "password updated");
    Ok(())
}

/// Removes the account and every ticket it created in one atomic batch.
/// Admin accounts cannot be removed through this path.
pub async fn deregister(state: &AppState, email: &str) -> Result<(), AppError> {
    let user = state
        .store
        .find_user(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    if user.role == Role::Admin {
        return Err(AppError::Validation("Cannot deregister admin account".into()));
    }

    state.store.delete_user_with_tickets(email).await?;
    info!(email, "user and associated tickets deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::RecordingMailer;
    use crate::state::AppState;
    use crate::store::{Ticket, TicketStatus};
    use std::sync::Arc;
    use time::macros::datetime;

    fn recording_state() -> (AppState, Arc<RecordingMailer>) {
        let base = AppState::fake();
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::from_parts(base.config, base.store, mailer.clone());
        (state, mailer)
    }

    fn ticket_for(id: &str, created_by: &str) -> Ticket {
        Ticket {
            id: id.into(),
            title: "title".into(),
            description: "description".into(),
            category: "General".into(),
            priority: "Low".into(),
            product: "Laptop".into(),
            status: TicketStatus::Open,
            created_by: created_by.into(),
            created_at: datetime!(2026-01-01 08:00:00 UTC),
            action_taken: None,
            messages: vec![],
        }
    }

    #[tokio::test]
    async fn register_persists_and_sends_welcome_mail() {
        let (state, mailer) = recording_state();
        let user = register(&state, "u1@test.com", "pw1").await.unwrap();
        assert_eq!(user.role, Role::User);

        let stored = state.store.find_user("u1@test.com").await.unwrap().unwrap();
        assert_eq!(stored.password, "pw1");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "u1@test.com");
        assert_eq!(sent[0].subject, "Welcome to the Support Portal");
        assert!(sent[0].body.contains("pw1"));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let (state, _) = recording_state();
        register(&state, "u1@test.com", "pw1").await.unwrap();
        let err = register(&state, "u1@test.com", "pw2").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_survives_mail_failure() {
        let mut state = AppState::fake();
        state.mailer = Arc::new(RecordingMailer::failing());
        register(&state, "u1@test.com", "pw1").await.unwrap();
        assert!(state.store.find_user("u1@test.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let (state, _) = recording_state();
        register(&state, "u1@test.com", "pw1").await.unwrap();

        let err = change_password(&state, "u1@test.com", "wrong", "longenough")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));

        change_password(&state, "u1@test.com", "pw1", "longenough")
            .await
            .unwrap();
        let stored = state.store.find_user("u1@test.com").await.unwrap().unwrap();
        assert_eq!(stored.password, "longenough");
    }

    #[tokio::test]
    async fn change_password_enforces_minimum_length() {
        let (state, _) = recording_state();
        register(&state, "u1@test.com", "pw1pw1").await.unwrap();
        let err = change_password(&state, "u1@test.com", "pw1pw1", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn deregister_cascades_to_tickets_and_spares_others() {
        let (state, _) = recording_state();
        register(&state, "u1@test.com", "pw1").await.unwrap();
        register(&state, "u2@test.com", "pw2").await.unwrap();
        for id in ["1", "2", "3"] {
            state
                .store
                .insert_ticket(&ticket_for(id, "u1@test.com"))
                .await
                .unwrap();
        }
        state
            .store
            .insert_ticket(&ticket_for("4", "u2@test.com"))
            .await
            .unwrap();

        deregister(&state, "u1@test.com").await.unwrap();

        assert!(state.store.find_user("u1@test.com").await.unwrap().is_none());
        assert!(state
            .store
            .tickets_by_user("u1@test.com")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            state.store.tickets_by_user("u2@test.com").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn deregister_rejects_admin_and_unknown_accounts() {
        let (state, _) = recording_state();
        state
            .store
            .insert_user(&User {
                email: "admin@test.com".into(),
                password: "root".into(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        let err = deregister(&state, "admin@test.com").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = deregister(&state, "ghost@test.com").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_excludes_admin_accounts() {
        let (state, _) = recording_state();
        register(&state, "u1@test.com", "pw1").await.unwrap();
        state
            .store
            .insert_user(&User {
                email: "admin@test.com".into(),
                password: "root".into(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        let users = state.store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "u1@test.com");
    }
}
