use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::{RecordStore, StoreError};
use shared_models::{User, UserFilter, UserProfile, UserRole};
use shared_utils::{require_text, ValidationError};

use crate::models::{AuthError, LoginRequest, RegisterRequest};
use crate::services::password::PasswordService;

pub struct UserDirectoryService {
    store: RecordStore,
}

impl UserDirectoryService {
    pub fn new(store: &RecordStore) -> Self {
        Self { store: store.clone() }
    }

    /// Register a new account. Usernames are unique and compared exactly.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AuthError> {
        let username = require_text("username", request.username)?;
        let password = require_text("password", request.password)?;
        let role: UserRole = require_text("role", request.role)?
            .parse()
            .map_err(AuthError::InvalidArgument)?;

        debug!("Registering user {} as {}", username, role);

        if self.find_by_username(&username).await?.is_some() {
            warn!("Registration rejected, username {} is taken", username);
            return Err(AuthError::UsernameTaken(username));
        }

        let user = User {
            id: Uuid::new_v4(),
            username,
            password_hash: hash_off_thread(password).await?,
            role,
            created_at: Utc::now(),
        };

        // The store enforces uniqueness on insert; a concurrent register lands here.
        let taken = user.username.clone();
        let user = self.store.users.insert(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::UsernameTaken(taken),
            other => AuthError::Store(other),
        })?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(UserProfile::from(&user))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<UserProfile, AuthError> {
        let username = require_text("username", request.username)?;
        let password = request
            .password
            .filter(|p| !p.is_empty())
            .ok_or(ValidationError::Missing("password"))?;

        let Some(user) = self.find_by_username(&username).await? else {
            warn!("Login failed for unknown user {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_off_thread(password, user.password_hash.clone()).await? {
            warn!("Login failed for user {}: password mismatch", username);
            return Err(AuthError::InvalidCredentials);
        }

        debug!("User {} logged in", user.id);
        Ok(UserProfile::from(&user))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.store.users.list(&UserFilter::by_username(username)).await?;
        Ok(users.into_iter().next())
    }
}

// Argon2 work runs on the blocking pool.
async fn hash_off_thread(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || PasswordService::hash_password(&password))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(AuthError::from)
}

async fn verify_off_thread(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || PasswordService::verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(AuthError::from)
}
