//! User account model, roles and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Account roles, ordered by privilege: member < librarian < admin.
///
/// The derived `Ord` follows declaration order, which is what the
/// authorization check relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }

    /// Allow iff the caller's role is at least the required role.
    pub fn authorizes(&self, required: Role) -> bool {
        *self >= required
    }

    /// Authorization gate returning the typed error on denial.
    pub fn require(&self, required: Role) -> AppResult<()> {
        if self.authorizes(required) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "{} privileges required",
                required.as_str()
            )))
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user account from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Update own profile request (for authenticated users)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Update role request (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    pub role: Role,
}

/// JWT claims for authenticated users.
///
/// The embedded role records what was known at issue time; authorization
/// re-resolves the current role from the users store on every request, so a
/// demoted account loses access without waiting for the token to expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and validate a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_order_is_member_librarian_admin() {
        assert!(Role::Member < Role::Librarian);
        assert!(Role::Librarian < Role::Admin);
    }

    #[test]
    fn admin_may_act_as_member() {
        assert!(Role::Admin.authorizes(Role::Member));
    }

    #[test]
    fn member_may_not_act_as_librarian() {
        assert!(!Role::Member.authorizes(Role::Librarian));
        assert!(Role::Member.require(Role::Librarian).is_err());
    }

    #[test]
    fn role_authorizes_itself() {
        assert!(Role::Librarian.authorizes(Role::Librarian));
        assert!(Role::Member.authorizes(Role::Member));
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Member, Role::Librarian, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }

    fn claims(exp_offset_secs: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: "alice".to_string(),
            user_id: Uuid::new_v4(),
            role: Role::Librarian,
            exp: now + exp_offset_secs,
            iat: now,
        }
    }

    #[test]
    fn token_round_trip() {
        let claims = claims(3600);
        let token = claims.create_token("secret").unwrap();
        let decoded = Claims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, "alice");
        assert_eq!(decoded.user_id, claims.user_id);
        assert_eq!(decoded.role, Role::Librarian);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = claims(3600).create_token("secret").unwrap();
        assert!(Claims::from_token(&token, "other-secret").is_err());

        let mut forged = token.clone();
        forged.truncate(token.len() - 2);
        assert!(Claims::from_token(&forged, "secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default validation leeway
        let token = claims(-3600).create_token("secret").unwrap();
        assert!(Claims::from_token(&token, "secret").is_err());
    }
}
