//! Session manager: sign-in, registration, sign-out and startup restore.
//!
//! One manager is built at startup and handed to whatever renders the UI.
//! Its state is published through a `watch` channel, so views can observe
//! `is_loading` / `error` while a login or registration is in flight.

use std::sync::Arc;

use quillpad_api_types::RegisterRequest;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::repos::{ApiError, BlogApi, SessionStorage, StorageError};
use crate::application::token::{TokenError, decode_claims};
use crate::domain::session::{AuthSession, User};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Failed to get user information: {0}")]
    Token(#[from] TokenError),
    #[error("Failed to save session: {0}")]
    Storage(#[from] StorageError),
}

/// Observable view of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Option<AuthSession>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(AuthSession::user)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(AuthSession::token)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

pub struct SessionManager {
    api: Arc<dyn BlogApi>,
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    /// Build an unauthenticated manager without touching storage.
    pub fn new(api: Arc<dyn BlogApi>, storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            api,
            storage,
            state,
        }
    }

    /// Build a manager and hydrate it from storage.
    pub fn init(api: Arc<dyn BlogApi>, storage: Arc<dyn SessionStorage>) -> Self {
        let manager = Self::new(api, storage);
        manager.restore();
        manager
    }

    /// Tear down, closing every subscriber. Persisted state is kept.
    pub fn dispose(self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.state.borrow().session.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn api(&self) -> &Arc<dyn BlogApi> {
        &self.api
    }

    /// Exchange credentials for a token and start a session.
    ///
    /// The supplied `username` is recorded as-is; the token only contributes
    /// the user id and email.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        self.begin();
        let result = self.authenticate(username, password).await;
        self.finish(result)
    }

    /// Create an account, then sign into it with the same credentials.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        self.begin();
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let result = match self.api.register(&request).await {
            Ok(_) => {
                info!(username, "account registered");
                self.authenticate(username, password).await
            }
            Err(err) => Err(err.into()),
        };
        self.finish(result)
    }

    /// Drop the session from memory and storage. Safe to call repeatedly.
    pub fn logout(&self) {
        self.clear_persisted();
        self.state.send_modify(|state| state.session = None);
        info!("signed out");
    }

    /// Hydrate from storage, returning whether a session was restored.
    ///
    /// Anything short of a token plus a parseable user record wipes both
    /// entries and leaves the manager signed out.
    pub fn restore(&self) -> bool {
        let token = self.read_entry(TOKEN_KEY).filter(|t| !t.trim().is_empty());
        let user = self.read_entry(USER_KEY);

        if let (Some(token), Some(raw)) = (token, user) {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    info!(username = %user.username, "session restored");
                    let session = AuthSession::new(user, token);
                    self.state.send_modify(|state| state.session = Some(session));
                    return true;
                }
                Err(err) => warn!(error = %err, "stored user record is unreadable"),
            }
        }

        self.clear_persisted();
        self.state.send_modify(|state| state.session = None);
        false
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, SessionError> {
        let token = self.api.login(username, password).await?.access_token;
        let claims = decode_claims(&token)?;
        let user = User {
            id: claims.user_id,
            username: username.to_string(),
            email: claims.email.unwrap_or_default(),
        };

        let user_json = serde_json::to_string(&user).map_err(|err| StorageError::Corrupt {
            path: USER_KEY.to_string(),
            reason: err.to_string(),
        })?;
        self.storage.set(TOKEN_KEY, &token)?;
        self.storage.set(USER_KEY, &user_json)?;

        Ok(AuthSession::new(user, token))
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    fn finish(&self, result: Result<AuthSession, SessionError>) -> Result<User, SessionError> {
        match result {
            Ok(session) => {
                let user = session.user().clone();
                info!(username = %user.username, user_id = %user.id, "signed in");
                self.state.send_modify(|state| {
                    state.session = Some(session);
                    state.is_loading = false;
                    state.error = None;
                });
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "sign-in failed");
                self.clear_persisted();
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.session = None;
                    state.is_loading = false;
                    state.error = Some(message);
                });
                Err(err)
            }
        }
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read session storage");
                None
            }
        }
    }

    fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "failed to clear session storage");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::ApiOperation;
    use crate::application::testing::{FakeApi, status_error, token_for};
    use crate::domain::session::UserId;
    use crate::infra::storage::MemorySessionStorage;

    fn manager(
        api: FakeApi,
        storage: MemorySessionStorage,
    ) -> (SessionManager, Arc<FakeApi>, Arc<MemorySessionStorage>) {
        let api = Arc::new(api);
        let storage = Arc::new(storage);
        let manager = SessionManager::new(api.clone(), storage.clone());
        (manager, api, storage)
    }

    fn assert_consistent(manager: &SessionManager) {
        let snap = manager.snapshot();
        assert_eq!(snap.user().is_some(), snap.token().is_some());
    }

    #[tokio::test]
    async fn login_persists_user_built_from_supplied_username() {
        let (manager, _api, storage) = manager(FakeApi::default(), MemorySessionStorage::new());

        let user = manager.login("ann", "pw").await.expect("login");
        assert_eq!(user.username, "ann");
        assert_eq!(user.id, UserId::Numeric(1));
        assert_eq!(user.email, "ann@example.com");
        assert_consistent(&manager);
        assert!(!manager.is_loading());
        assert!(manager.error().is_none());

        let stored_user: User =
            serde_json::from_str(&storage.get(USER_KEY).expect("get").expect("user"))
                .expect("stored user");
        assert_eq!(stored_user, user);
        assert_eq!(storage.get(TOKEN_KEY).expect("get"), manager.token());
    }

    #[tokio::test]
    async fn undecodable_token_leaves_nothing_behind() {
        let api = FakeApi::default();
        FakeApi::set(&api.token, Ok("not-a-jwt".to_string()));
        let storage = MemorySessionStorage::with_entries([("token", "stale"), ("user", "{}")]);
        let (manager, _api, storage) = manager(api, storage);

        let err = manager.login("ann", "pw").await.expect_err("decode failure");
        assert!(matches!(err, SessionError::Token(TokenError::Segments(1))));
        assert!(manager.current().is_none());
        assert!(storage.is_empty());
        assert!(
            manager
                .error()
                .is_some_and(|msg| msg.starts_with("Failed to get user information"))
        );
        assert_consistent(&manager);
    }

    #[tokio::test]
    async fn api_rejection_surfaces_detail_message() {
        let api = FakeApi::default();
        FakeApi::set(
            &api.token,
            Err(status_error(ApiOperation::Login, 401, "Incorrect username or password")),
        );
        let (manager, _api, _storage) = manager(api, MemorySessionStorage::new());

        manager.login("ann", "bad").await.expect_err("rejected");
        assert_eq!(
            manager.error().as_deref(),
            Some("Incorrect username or password")
        );
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn register_then_login() {
        let (manager, api, _storage) = manager(FakeApi::default(), MemorySessionStorage::new());
        let user = manager
            .register("bob", "bob@example.com", "pw")
            .await
            .expect("register");
        assert_eq!(user.username, "bob");
        assert_eq!(api.calls(), vec!["register", "login"]);
        assert!(manager.current().is_some());
    }

    #[tokio::test]
    async fn register_success_with_login_failure_reports_login() {
        let api = FakeApi::default();
        FakeApi::set(
            &api.token,
            Err(status_error(ApiOperation::Login, 401, "Login failed")),
        );
        let (manager, _api, storage) = manager(api, MemorySessionStorage::new());

        let err = manager
            .register("bob", "bob@example.com", "pw")
            .await
            .expect_err("login should fail");
        assert!(matches!(
            err,
            SessionError::Api(ApiError::Status {
                operation: ApiOperation::Login,
                ..
            })
        ));
        assert!(manager.current().is_none());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn register_failure_skips_login() {
        let api = FakeApi::default();
        FakeApi::set(
            &api.register,
            Err(status_error(ApiOperation::Register, 400, "Username already registered")),
        );
        let (manager, api, _storage) = manager(api, MemorySessionStorage::new());

        manager
            .register("bob", "bob@example.com", "pw")
            .await
            .expect_err("duplicate");
        assert_eq!(api.calls(), vec!["register"]);
        assert_eq!(
            manager.error().as_deref(),
            Some("Username already registered")
        );
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (manager, _api, storage) = manager(FakeApi::default(), MemorySessionStorage::new());
        manager.login("ann", "pw").await.expect("login");

        manager.logout();
        manager.logout();
        assert!(manager.current().is_none());
        assert!(storage.is_empty());
        assert_consistent(&manager);
    }

    #[test]
    fn restore_recovers_persisted_session() {
        let user = r#"{"id":5,"username":"ann","email":"a@x.io"}"#;
        let token = token_for(5, "a@x.io");
        let storage = MemorySessionStorage::with_entries([("token", token.as_str()), ("user", user)]);
        let api: Arc<dyn BlogApi> = Arc::new(FakeApi::default());
        let manager = SessionManager::init(api, Arc::new(storage));

        let restored = manager.user().expect("restored user");
        assert_eq!(restored.username, "ann");
        assert_eq!(manager.token().as_deref(), Some(token.as_str()));
    }

    #[test]
    fn restore_with_corrupt_user_clears_both_keys() {
        let storage = MemorySessionStorage::with_entries([("token", "t.t.t"), ("user", "{oops")]);
        let (manager, _api, storage) = manager(FakeApi::default(), storage);

        assert!(!manager.restore());
        assert!(manager.current().is_none());
        assert!(storage.is_empty());
        assert_consistent(&manager);
    }

    #[test]
    fn restore_with_half_a_session_clears_it() {
        let storage = MemorySessionStorage::with_entries([("token", "t.t.t")]);
        let (manager, _api, storage) = manager(FakeApi::default(), storage);

        assert!(!manager.restore());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn subscribers_observe_loading_transitions() {
        let (manager, _api, _storage) = manager(FakeApi::default(), MemorySessionStorage::new());
        let mut rx = manager.subscribe();

        manager.login("ann", "pw").await.expect("login");
        assert!(rx.has_changed().expect("sender alive"));
        let seen = rx.borrow_and_update().clone();
        assert!(seen.is_authenticated());
        assert!(!seen.is_loading);

        let last = manager.dispose();
        assert!(last.is_authenticated());
        assert!(rx.changed().await.is_err());
    }
}
