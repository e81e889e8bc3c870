use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::auth::{
    errors::AuthError,
    jwt::{Identity, JwtKeys},
    password::PasswordCodec,
    repo::{DirectoryError, UserDirectory},
    repo_types::User,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const LOGOUT_MESSAGE: &str = "Logged out successfully";

/// Token plus the user it was issued for.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub token: String,
    pub user: Arc<User>,
}

/// Identity resolved by the access gate for a single request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Arc<User>,
    pub identity: Identity,
}

/// Owns the user directory, the signing keys and the password codec.
/// The only component that creates users or issues tokens.
pub struct AuthService {
    users: UserDirectory,
    keys: JwtKeys,
    passwords: PasswordCodec,
}

impl AuthService {
    pub fn new(users: UserDirectory, keys: JwtKeys, passwords: PasswordCodec) -> Self {
        Self {
            users,
            keys,
            passwords,
        }
    }

    pub fn register(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }
        // Length in bytes, not characters.
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        // Cheap early exit before hashing; `create` below is what actually
        // guarantees uniqueness.
        if self.users.find_by_email(email).is_ok() {
            warn!(email, "email already registered");
            return Err(AuthError::UserExists);
        }

        let hash = self
            .passwords
            .hash(password)
            .map_err(|e| AuthError::Internal(e.into()))?;

        let user = self.users.create(email, &hash).map_err(|e| match e {
            DirectoryError::UserExists => {
                warn!(email, "email registered concurrently");
                AuthError::UserExists
            }
            DirectoryError::UserNotFound => AuthError::Internal(anyhow!(e)),
        })?;

        let token = self.issue_for(&user)?;
        info!(user_id = user.id, email = %user.email, "user registered");
        Ok(AuthSuccess { token, user })
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }

        let user = match self.users.find_by_email(email) {
            Ok(u) => u,
            Err(_) => {
                warn!(email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let ok = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| AuthError::Internal(e.into()))?;
        if !ok {
            warn!(email, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_for(&user)?;
        info!(user_id = user.id, email = %user.email, "user logged in");
        Ok(AuthSuccess { token, user })
    }

    /// Tokens are not tracked server side, so there is nothing to revoke.
    pub fn logout(&self, session: Option<&Session>) -> &'static str {
        match session {
            Some(s) => info!(
                user_id = s.user.id,
                token_expires_at = %s.identity.expires_at,
                "user logged out"
            ),
            None => debug!("anonymous logout"),
        }
        LOGOUT_MESSAGE
    }

    pub fn current_user(session: Option<&Session>) -> Result<Arc<User>, AuthError> {
        session
            .map(|s| Arc::clone(&s.user))
            .ok_or(AuthError::Unauthenticated)
    }

    /// Validate a bearer token and resolve its subject to a live user.
    pub fn authenticate(&self, token: &str) -> Result<Session, AuthError> {
        let identity = self.keys.validate(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::Unauthenticated
        })?;
        let user = self.users.find_by_id(identity.user_id).map_err(|_| {
            warn!(user_id = identity.user_id, "token subject no longer exists");
            AuthError::Unauthenticated
        })?;
        debug!(
            user_id = user.id,
            email = %identity.email,
            expires_at = %identity.expires_at,
            "session resolved"
        );
        Ok(Session { user, identity })
    }

    fn issue_for(&self, user: &User) -> Result<String, AuthError> {
        self.keys
            .issue(user.id, &user.email)
            .map_err(|e| AuthError::Internal(e.into()))
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &JwtKeys {
        &self.keys
    }
}
