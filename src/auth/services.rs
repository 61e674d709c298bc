use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::error::AppError;
use crate::store::{Role, Store, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Exact email lookup with plaintext comparison. Missing user, wrong
/// password and wrong role all collapse into the same rejection, so the
/// response never reveals which part failed.
pub async fn authenticate(
    store: &dyn Store,
    email: &str,
    password: &str,
    expected_role: Role,
) -> Result<User, AppError> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let user = store
        .find_user(email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if user.password != password || user.role != expected_role {
        warn!(email, "login rejected");
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::default();
        store
            .insert_user(&User {
                email: "u1@test.com".into(),
                password: "pw1".into(),
                role: Role::User,
            })
            .await
            .unwrap();
        store
            .insert_user(&User {
                email: "admin@test.com".into(),
                password: "root".into(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn accepts_matching_credentials_and_role() {
        let store = seeded_store().await;
        let user = authenticate(&store, "u1@test.com", "pw1", Role::User)
            .await
            .unwrap();
        assert_eq!(user.email, "u1@test.com");
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let store = seeded_store().await;
        let err = authenticate(&store, "u1@test.com", "nope", Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_unknown_email_identically() {
        let store = seeded_store().await;
        let err = authenticate(&store, "ghost@test.com", "pw1", Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_role_mismatch_on_admin_endpoint() {
        let store = seeded_store().await;
        let err = authenticate(&store, "u1@test.com", "pw1", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn rejects_empty_fields() {
        let store = seeded_store().await;
        let err = authenticate(&store, "", "", Role::User).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[test]
    fn email_syntax_check() {
        assert!(is_valid_email("u1@test.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@test.com"));
    }
}
