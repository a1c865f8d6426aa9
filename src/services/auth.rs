//! Authentication and account management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{Claims, LoginUser, RegisterUser, Role, UpdateProfile, User},
    repository::Repository,
};

/// Verified request identity: subject plus the role the users store holds
/// for it right now.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

/// Authoritative role lookup, injected into the access gate so the gate
/// never trusts the role a token was minted with.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn role_of(&self, user_id: Uuid) -> AppResult<Role>;
}

#[async_trait]
impl RoleDirectory for Repository {
    async fn role_of(&self, user_id: Uuid) -> AppResult<Role> {
        self.users.get_role(user_id).await
    }
}

/// Credential verification plus the role-ordered authorization policy.
///
/// Verification re-resolves the caller's role through the directory on every
/// call, so a role change takes effect on the subject's next request rather
/// than at token expiry.
#[derive(Clone)]
pub struct AccessGate<D> {
    jwt_secret: String,
    directory: D,
}

impl<D: RoleDirectory> AccessGate<D> {
    pub fn new(jwt_secret: String, directory: D) -> Self {
        Self {
            jwt_secret,
            directory,
        }
    }

    /// Verify a bearer token and resolve the caller's current role.
    pub async fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let claims = Claims::from_token(token, &self.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))?;

        let role = match self.directory.role_of(claims.user_id).await {
            Ok(role) => role,
            // A token for a deleted account is no credential at all
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication("Unknown subject".to_string()))
            }
            Err(err) => return Err(err),
        };

        Ok(AuthenticatedUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
        })
    }
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account. New accounts start as plain members; roles
    /// are granted separately by an admin.
    pub async fn register(&self, request: RegisterUser) -> AppResult<(String, User)> {
        if self.repository.users.email_exists(&request.email, None).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.username, &request.email, &password_hash, Role::Member)
            .await?;

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    /// Authenticate by email and password and return a fresh token
    pub async fn login(&self, request: LoginUser) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password_hash, &request.password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    /// Mint a signed token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = Claims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Update the caller's own profile
    pub async fn update_profile(&self, user_id: Uuid, profile: UpdateProfile) -> AppResult<User> {
        if let Some(ref email) = profile.email {
            if self.repository.users.email_exists(email, Some(user_id)).await? {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
        self.repository.users.update_profile(user_id, &profile).await
    }

    /// Change a user's role (admin operation)
    pub async fn update_role(&self, user_id: Uuid, role: Role) -> AppResult<User> {
        self.repository.users.update_role(user_id, role).await
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against its stored hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "wrong pony").unwrap());
    }

    struct MemoryDirectory {
        roles: Mutex<HashMap<Uuid, Role>>,
    }

    impl MemoryDirectory {
        fn with(entries: &[(Uuid, Role)]) -> Self {
            Self {
                roles: Mutex::new(entries.iter().copied().collect()),
            }
        }
    }

    #[async_trait]
    impl RoleDirectory for MemoryDirectory {
        async fn role_of(&self, user_id: Uuid) -> AppResult<Role> {
            self.roles
                .lock()
                .unwrap()
                .get(&user_id)
                .copied()
                .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
        }
    }

    fn token_for(user_id: Uuid, role: Role, secret: &str) -> String {
        let now = Utc::now().timestamp();
        Claims {
            sub: "carol".to_string(),
            user_id,
            role,
            exp: now + 3600,
            iat: now,
        }
        .create_token(secret)
        .unwrap()
    }

    #[tokio::test]
    async fn verify_uses_the_directory_role_not_the_embedded_one() {
        let user_id = Uuid::new_v4();
        // Token minted while the account was a member; the directory has
        // since been updated to librarian.
        let gate = AccessGate::new(
            "secret".to_string(),
            MemoryDirectory::with(&[(user_id, Role::Librarian)]),
        );
        let token = token_for(user_id, Role::Member, "secret");

        let authed = gate.verify(&token).await.unwrap();
        assert_eq!(authed.role, Role::Librarian);
    }

    #[tokio::test]
    async fn verify_rejects_tokens_for_deleted_accounts() {
        let gate = AccessGate::new("secret".to_string(), MemoryDirectory::with(&[]));
        let token = token_for(Uuid::new_v4(), Role::Admin, "secret");

        let err = gate.verify(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn verify_rejects_malformed_and_forged_tokens() {
        let user_id = Uuid::new_v4();
        let gate = AccessGate::new(
            "secret".to_string(),
            MemoryDirectory::with(&[(user_id, Role::Member)]),
        );

        let err = gate.verify("not-a-token").await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));

        let forged = token_for(user_id, Role::Admin, "other-secret");
        let err = gate.verify(&forged).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }
}
