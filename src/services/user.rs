//! User service
//!
//! Implements account and session management:
//! - Registration with hashed passwords
//! - Login/logout against server-side sessions
//! - Session validation and periodic cleanup

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::Duration;
use std::sync::Arc;

/// Default session lifetime in days
pub const DEFAULT_SESSION_LIFETIME_DAYS: i64 = 14;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Unknown username or wrong password. The two cases are not distinguished.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Username is already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Whether `err` was caused by a unique constraint in the database
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .filter_map(|e| e.as_database_error())
        .any(|db| db.is_unique_violation())
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_lifetime: Duration,
}

impl UserService {
    /// Create a new user service with the default session lifetime
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self::with_session_lifetime(
            user_repo,
            session_repo,
            Duration::days(DEFAULT_SESSION_LIFETIME_DAYS),
        )
    }

    /// Create a new user service with a custom session lifetime
    pub fn with_session_lifetime(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_lifetime: Duration,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_lifetime,
        }
    }

    /// Register a new user.
    ///
    /// Field validation (username syntax, password confirmation and strength)
    /// happens in the registration form; this only enforces uniqueness.
    ///
    /// # Errors
    ///
    /// - `UserExists` if the username is already taken
    /// - `InternalError` for hashing or database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(input.username));
        }

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;

        // A concurrent registration can win between the check and the insert
        let created = match self
            .user_repo
            .create(&User::new(input.username.clone(), password_hash))
            .await
        {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => {
                return Err(UserServiceError::UserExists(input.username));
            }
            Err(e) => return Err(e.context("Failed to create user").into()),
        };

        tracing::info!(user_id = created.id, username = %created.username, "User registered");
        Ok(created)
    }

    /// Check credentials and open a new session.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown user or a wrong password
    /// - `InternalError` for database errors
    pub async fn login(&self, input: LoginInput) -> Result<(User, Session), UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to get user by username")?
            .ok_or(UserServiceError::InvalidCredentials)?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            tracing::debug!(username = %input.username, "Rejected login with wrong password");
            return Err(UserServiceError::InvalidCredentials);
        }

        let session = self.start_session(user.id).await?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok((user, session))
    }

    /// Open a new session for an existing user
    pub async fn start_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let session = Session::start(user_id, self.session_lifetime);

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        Ok(created)
    }

    /// Logout (invalidate session). Unknown tokens are ignored.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` when the session does not exist or has expired; an
    /// expired session is deleted on the way.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {:#}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?;

        Ok(user)
    }

    /// Count registered users
    pub async fn count(&self) -> Result<i64, UserServiceError> {
        Ok(self.user_repo.count().await.context("Failed to count users")?)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<i64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;

        Ok(count)
    }
}

/// Input for user registration
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

impl RegisterInput {
    /// Create a new registration input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Input for user login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    /// Create a new login input
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use chrono::Utc;

    async fn setup_test_service() -> (DynDatabasePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let service = UserService::new(user_repo, session_repo);

        (pool, service)
    }

    // ========================================================================
    // Registration tests
    // ========================================================================

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (_pool, service) = setup_test_service().await;

        let user = service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .expect("Failed to register");

        assert!(user.id > 0);
        assert_eq!(user.username, "reporter");
        assert!(user.password_hash.starts_with("$argon2id$"));
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_fails() {
        let (_pool, service) = setup_test_service().await;

        service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .expect("Failed to register first user");

        let result = service
            .register(RegisterInput::new("reporter", "another-pass-99"))
            .await;

        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
        assert_eq!(service.count().await.unwrap(), 1);
    }

    /// Lookups never see an existing user, as when another registration
    /// commits between the check and the insert
    struct StaleLookupRepository(Arc<dyn UserRepository>);

    #[async_trait::async_trait]
    impl UserRepository for StaleLookupRepository {
        async fn create(&self, user: &User) -> anyhow::Result<User> {
            self.0.create(user).await
        }

        async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
            self.0.get_by_id(id).await
        }

        async fn get_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }

        async fn count(&self) -> anyhow::Result<i64> {
            self.0.count().await
        }
    }

    #[tokio::test]
    async fn test_register_maps_constraint_violation_to_user_exists() {
        let (pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();

        let racing = UserService::new(
            Arc::new(StaleLookupRepository(SqlxUserRepository::boxed(pool.clone()))),
            SqlxSessionRepository::boxed(pool),
        );
        let result = racing
            .register(RegisterInput::new("reporter", "another-pass-99"))
            .await;

        match result {
            Err(UserServiceError::UserExists(name)) => assert_eq!(name, "reporter"),
            other => panic!("expected UserExists, got {:?}", other.map(|u| u.id)),
        }
        assert_eq!(racing.count().await.unwrap(), 1);
    }

    // ========================================================================
    // Login tests
    // ========================================================================

    #[tokio::test]
    async fn test_login_success_creates_session() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();

        let (user, session) = service
            .login(LoginInput::new("reporter", "news-desk-2024"))
            .await
            .expect("Failed to login");

        assert_eq!(session.user_id, user.id);
        assert!(!session.is_expired());

        let resolved = service
            .validate_session(&session.id)
            .await
            .unwrap()
            .expect("Session should resolve");
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_unknown_user_and_wrong_password_look_the_same() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();

        let unknown = service.login(LoginInput::new("ghost", "news-desk-2024")).await;
        let wrong = service.login(LoginInput::new("reporter", "wrong-password")).await;

        let unknown = unknown.expect_err("unknown user must fail");
        let wrong = wrong.expect_err("wrong password must fail");
        assert!(matches!(unknown, UserServiceError::InvalidCredentials));
        assert!(matches!(wrong, UserServiceError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    // ========================================================================
    // Session tests
    // ========================================================================

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let (_pool, service) = setup_test_service().await;
        service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();
        let (_, session) = service
            .login(LoginInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();

        service.logout(&session.id).await.expect("Failed to logout");

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        // Logging out twice is harmless
        service.logout(&session.id).await.expect("Second logout failed");
    }

    #[tokio::test]
    async fn test_validate_unknown_session() {
        let (_pool, service) = setup_test_service().await;
        assert!(service.validate_session("no-such-token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_removed() {
        let (pool, _) = setup_test_service().await;
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let service = UserService::new(SqlxUserRepository::boxed(pool.clone()), session_repo.clone());

        let user = service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();

        let mut session = Session::start(user.id, Duration::days(1));
        session.expires_at = Utc::now() - Duration::minutes(1);
        session_repo.create(&session).await.unwrap();

        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert!(session_repo.get_by_id(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_sessions() {
        let (pool, _) = setup_test_service().await;
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        let service = UserService::with_session_lifetime(
            SqlxUserRepository::boxed(pool.clone()),
            session_repo.clone(),
            Duration::days(3),
        );

        let user = service
            .register(RegisterInput::new("reporter", "news-desk-2024"))
            .await
            .unwrap();

        let live = service.start_session(user.id).await.unwrap();
        let mut stale = Session::start(user.id, Duration::days(1));
        stale.expires_at = Utc::now() - Duration::hours(2);
        session_repo.create(&stale).await.unwrap();

        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 1);
        assert!(service.validate_session(&live.id).await.unwrap().is_some());
    }
}
