use crate::{
    models::{PublicUser, UserRecord},
    services::{
        credential_store::CredentialStore,
        password::PasswordHasher,
        token_service::{Claims, TokenCodec},
    },
    utils::{AuthFailure, StoreError},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

// Verified against on a sign-in miss so unknown emails cost one bcrypt round too.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            success: true,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issues, validates and rotates session tokens.
///
/// Token writes are plain point updates: two concurrent sign-ins for the
/// same user race and the last write wins, invalidating the refresh token
/// handed to the other caller.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    codec: TokenCodec,
    decoy_hash: Arc<OnceCell<String>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        codec: TokenCodec,
    ) -> Self {
        Self {
            store,
            hasher,
            codec,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// `ttl` defaults to the configured access-token lifetime.
    pub fn issue_access_token(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AuthFailure> {
        let token = match ttl {
            Some(ttl) => self.codec.issue_access_token_with_ttl(subject, ttl)?,
            None => self.codec.issue_access_token(subject)?,
        };
        Ok(token)
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, AuthFailure> {
        Ok(self.codec.issue_refresh_token(subject)?)
    }

    pub fn verify_password(&self, plain: &str, hashed: &str) -> bool {
        self.hasher.verify(plain, hashed)
    }

    pub fn decode(&self, token: &str) -> Option<Claims> {
        self.codec.decode(token)
    }

    /// bcrypt is CPU bound, keep it off the async workers.
    async fn hash_blocking(&self, plain: &str) -> Result<String, AuthFailure> {
        let hasher = Arc::clone(&self.hasher);
        let plain = plain.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| AuthFailure::Hashing(e.to_string()))?
            .map_err(AuthFailure::Hashing)
    }

    async fn verify_blocking(&self, plain: &str, hashed: &str) -> Result<bool, AuthFailure> {
        let sessions = self.clone();
        let plain = plain.to_string();
        let hashed = hashed.to_string();
        tokio::task::spawn_blocking(move || sessions.verify_password(&plain, &hashed))
            .await
            .map_err(|e| AuthFailure::Hashing(e.to_string()))
    }

    /// Hash of a throwaway password at the configured cost, built once.
    async fn decoy_hash(&self) -> Result<&str, AuthFailure> {
        let hashed = self
            .decoy_hash
            .get_or_try_init(|| self.hash_blocking(DECOY_PASSWORD))
            .await?;
        Ok(hashed.as_str())
    }

    // User registration
    pub async fn register(&self, request: &RegisterRequest) -> Result<PublicUser, AuthFailure> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);

        if name.is_empty() {
            return Err(AuthFailure::InvalidRequest("Name is required".to_string()));
        }
        if !email.contains('@') {
            return Err(AuthFailure::InvalidRequest("A valid email is required".to_string()));
        }
        if request.password.is_empty() {
            return Err(AuthFailure::InvalidRequest("Password is required".to_string()));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthFailure::DuplicateRegistration);
        }

        let password_hash = self.hash_blocking(&request.password).await?;
        let mut record = UserRecord::new(name.to_string(), email.clone(), password_hash);

        // The unique index catches a concurrent registration that slipped
        // past the lookup above.
        let id = match self.store.insert(record.clone()).await {
            Ok(id) => id,
            Err(StoreError::DuplicateKey) => return Err(AuthFailure::DuplicateRegistration),
            Err(e) => return Err(e.into()),
        };
        record.id = Some(id);

        log::info!("✅ User registered successfully: {}", email);

        Ok(PublicUser::from(&record))
    }

    /// Password sign-in. Supersedes any previously issued refresh token.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AuthFailure> {
        let email = normalize_email(email);

        let user = match self.store.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let decoy = self.decoy_hash().await?;
                self.verify_blocking(password, decoy).await?;
                return Err(AuthFailure::InvalidCredentials);
            }
        };

        if !self.verify_blocking(password, &user.password_hash).await? {
            return Err(AuthFailure::InvalidCredentials);
        }

        let id = user
            .id
            .ok_or_else(|| StoreError::InvalidId(format!("user {} has no id", user.email)))?;

        let access_token = self.issue_access_token(&user.email, None)?;
        let refresh_token = self.issue_refresh_token(&user.email)?;

        self.store.update_refresh_token(&id, &refresh_token).await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mints a new access token. The refresh token is returned unchanged.
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AuthFailure> {
        let user = self
            .store
            .find_by_refresh_token(presented)
            .await?
            .ok_or(AuthFailure::TokenNotFound)?;

        let claims = self.decode(presented).ok_or(AuthFailure::TokenInvalid)?;

        if claims.sub != user.email {
            log::warn!("⚠️ Refresh token subject does not match its owner record");
            return Err(AuthFailure::TokenInvalid);
        }

        let access_token = self.issue_access_token(&claims.sub, None)?;

        Ok(TokenPair {
            access_token,
            refresh_token: presented.to_string(),
        })
    }

    // Get current user
    pub async fn current_user(&self, claims: &Claims) -> Result<PublicUser, AuthFailure> {
        let user = self
            .store
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthFailure::TokenInvalid)?;

        Ok(PublicUser::from(&user))
    }
}
