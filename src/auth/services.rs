use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::{info, warn};

use crate::auth::{
    claims::Claims,
    error::AuthError,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::Identity,
};

lazy_static! {
    /// Verified against when the email is unknown.
    static ref DUMMY_HASH: String =
        hash_password("portal-auth-dummy-password").unwrap_or_default();
}

/// Credential checks and token handling over a [`UserStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    /// Checks the credentials and records the login.
    ///
    /// An inactive account is reported before the password is checked.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let user = match self.store.find_by_email(email).await? {
            Some(u) => u,
            None => {
                let _ = verify_password(password, &DUMMY_HASH);
                warn!(email = %email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !user.is_active {
            warn!(user_id = %user.id, "login on inactive account");
            return Err(AuthError::InactiveAccount);
        }

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        self.store.touch_last_login(user.id).await?;
        info!(user_id = %user.id, role = %user.role, "user authenticated");
        Ok(Identity::from(&user))
    }

    pub fn issue_token(&self, identity: &Identity) -> Result<String, AuthError> {
        Ok(self.keys.issue(identity)?)
    }

    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        self.keys.verify(token)
    }

    /// See [`JwtKeys::decode_unverified`].
    pub fn decode_token(&self, token: &str) -> Option<Claims> {
        JwtKeys::decode_unverified(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use crate::config::JwtConfig;
    use crate::test_utils::MemoryUserStore;

    fn service(store: Arc<MemoryUserStore>) -> AuthService {
        let keys = JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
        });
        AuthService::new(store, keys)
    }

    #[tokio::test]
    async fn active_user_with_right_password_logs_in() {
        let store = Arc::new(MemoryUserStore::default());
        let user = store.insert("a@x.com", "right", Role::Member, true);
        let svc = service(store.clone());

        let identity = svc.authenticate("a@x.com", "right").await.expect("login");
        assert_eq!(identity.id, user.id);
        assert_eq!(identity.role, Role::Member);

        let after = store.get(user.id).expect("user");
        assert!(after.last_login.is_some());
    }

    #[tokio::test]
    async fn last_login_advances_on_each_login() {
        let store = Arc::new(MemoryUserStore::default());
        let user = store.insert("a@x.com", "right", Role::Admin, true);
        let svc = service(store.clone());

        svc.authenticate("a@x.com", "right").await.unwrap();
        let first = store.get(user.id).unwrap().last_login.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        svc.authenticate("a@x.com", "right").await.unwrap();
        let second = store.get(user.id).unwrap().last_login.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let store = Arc::new(MemoryUserStore::default());
        let user = store.insert("a@x.com", "right", Role::Member, true);
        let svc = service(store.clone());

        let wrong = svc.authenticate("a@x.com", "wrong").await.unwrap_err();
        let unknown = svc.authenticate("nobody@x.com", "right").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.public_message(), unknown.public_message());
        assert!(store.get(user.id).unwrap().last_login.is_none());
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        assert!(DUMMY_HASH.starts_with("$argon2"));
        assert!(!verify_password("anything", &DUMMY_HASH).expect("parseable hash"));
    }

    #[tokio::test]
    async fn unknown_email_is_checked_against_dummy_hash() {
        let store = Arc::new(MemoryUserStore::default());
        let svc = service(store);

        let err = svc.authenticate("ghost@x.com", "whatever").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.public_message(), "Invalid email or password");
    }

    #[tokio::test]
    async fn email_is_matched_exactly() {
        let store = Arc::new(MemoryUserStore::default());
        store.insert("a@x.com", "right", Role::Member, true);
        let svc = service(store);

        let err = svc.authenticate("A@X.com", "right").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn inactive_account_is_refused() {
        let store = Arc::new(MemoryUserStore::default());
        let user = store.insert("off@x.com", "right", Role::Admin, false);
        let svc = service(store.clone());

        let err = svc.authenticate("off@x.com", "right").await.unwrap_err();
        assert!(matches!(err, AuthError::InactiveAccount));
        assert!(store.get(user.id).unwrap().last_login.is_none());
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let store = Arc::new(MemoryUserStore::default());
        store.insert("a@x.com", "right", Role::Member, true);
        store.set_failing(true);
        let svc = service(store);

        let err = svc.authenticate("a@x.com", "right").await.unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[tokio::test]
    async fn issued_token_verifies_to_identity() {
        let store = Arc::new(MemoryUserStore::default());
        store.insert("a@x.com", "right", Role::Admin, true);
        let svc = service(store);

        let identity = svc.authenticate("a@x.com", "right").await.unwrap();
        let token = svc.issue_token(&identity).unwrap();
        let claims = svc.verify_token(&token).expect("verified");
        assert_eq!(claims.identity(), identity);
        assert_eq!(svc.decode_token(&token), Some(claims));
    }
}
