//! Sessions and credentials
//!
//! A [`Session`] is the verified identity of a caller. It is only ever built
//! from a signed token (or directly in tests) and is passed explicitly into
//! every engine call.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::config::{AuthConfig, RegistrationPolicy};
use crate::core::directory::ResourceDirectory;
use crate::core::entity::RecordId;
use crate::core::error::{ServiceError, ServiceResult};
use crate::entities::user::{NewUser, Role, User};

const BAD_LOGIN: &str = "Incorrect username or password";
const BAD_TOKEN: &str = "Could not validate credentials";

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: RecordId,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: RecordId, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub uid: RecordId,
    pub role: Role,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

// =========================================================================
// Password hashing
// =========================================================================

/// Argon2id with default parameters, stored as a PHC string
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt)?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// False for a wrong password and for a stored value that is not a PHC string
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =========================================================================
// Tokens
// =========================================================================

fn signing_secret(auth: &AuthConfig) -> ServiceResult<&[u8]> {
    if auth.secret.is_empty() {
        return Err(ServiceError::Config {
            message: "auth.secret is not set; run 'gearguard init' or set GEARGUARD_SECRET"
                .to_string(),
        });
    }
    Ok(auth.secret.as_bytes())
}

/// Sign a bearer token for a user
pub fn issue_token(auth: &AuthConfig, user: &User) -> ServiceResult<String> {
    let exp = Utc::now() + Duration::minutes(i64::from(auth.token_ttl_minutes));
    let claims = Claims {
        sub: user.username.clone(),
        uid: user.id,
        role: user.role,
        exp: exp.timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_secret(auth)?),
    )
    .map_err(|e| ServiceError::Config {
        message: format!("Failed to sign token: {}", e),
    })
}

/// Check signature and expiry and return the claims
pub fn decode_token(auth: &AuthConfig, token: &str) -> ServiceResult<Claims> {
    let data = decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(signing_secret(auth)?),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        warn!(error = %e, "token rejected");
        ServiceError::unauthenticated(BAD_TOKEN)
    })?;
    Ok(data.claims)
}

// =========================================================================
// AuthService
// =========================================================================

/// Self-registration input
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub team: Option<RecordId>,
    pub department: Option<String>,
    pub company: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

/// Registration, login and token verification
pub struct AuthService<'a> {
    directory: &'a dyn ResourceDirectory,
    auth: &'a AuthConfig,
    policy: &'a RegistrationPolicy,
}

impl<'a> AuthService<'a> {
    pub fn new(
        directory: &'a dyn ResourceDirectory,
        auth: &'a AuthConfig,
        policy: &'a RegistrationPolicy,
    ) -> Self {
        Self {
            directory,
            auth,
            policy,
        }
    }

    /// Create an account; no session is needed
    pub fn register(&self, reg: Registration) -> ServiceResult<User> {
        let username = reg.username.trim();
        if username.is_empty() {
            return Err(ServiceError::validation("Username is required"));
        }
        if reg.password.is_empty() {
            return Err(ServiceError::validation("Password is required"));
        }
        let email = reg.email.trim();
        if !email.contains('@') {
            return Err(ServiceError::validation(format!(
                "Invalid email address: {}",
                email
            )));
        }
        if self.directory.user_by_username(username)?.is_some() {
            return Err(ServiceError::validation(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        if self.directory.user_by_email(email)?.is_some() {
            return Err(ServiceError::validation(format!(
                "Email '{}' is already registered",
                email
            )));
        }
        if let Some(team) = reg.team {
            if self.directory.team(team)?.is_none() {
                return Err(ServiceError::validation(format!("Team {} does not exist", team)));
            }
        }

        let role = self.policy.effective_role(reg.role);
        if role.is_privileged() {
            warn!(username, %role, "self-registration with a privileged role");
        }

        let hashed = hash_password(&reg.password).map_err(|e| ServiceError::Config {
            message: format!("Failed to hash password: {}", e),
        })?;
        let user = self.directory.insert_user(
            &NewUser {
                username: username.to_string(),
                email: email.to_string(),
                role,
                team: reg.team,
                department: reg.department,
                company: reg.company,
            },
            &hashed,
            Utc::now(),
        )?;
        info!(id = user.id, username = %user.username, role = %user.role, "registered user");
        Ok(user)
    }

    /// Exchange a username and password for a signed token
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<LoginToken> {
        let Some((user, hash)) = self.directory.credential_for(username.trim())? else {
            warn!(username, "login failed");
            return Err(ServiceError::unauthenticated(BAD_LOGIN));
        };
        if !verify_password(password, &hash) {
            warn!(username, "login failed");
            return Err(ServiceError::unauthenticated(BAD_LOGIN));
        }
        let access_token = issue_token(self.auth, &user)?;
        info!(username = %user.username, "logged in");
        Ok(LoginToken {
            access_token,
            token_type: "bearer",
            user,
        })
    }

    /// Turn a bearer token into a session
    ///
    /// The subject must still exist; the role is taken from the signed claim.
    pub fn verify(&self, token: &str) -> ServiceResult<Session> {
        let claims = decode_token(self.auth, token)?;
        match self.directory.user(claims.uid)? {
            Some(user) if user.username == claims.sub => {
                Ok(Session::new(user.id, user.username, claims.role))
            }
            _ => {
                warn!(subject = %claims.sub, "token subject no longer exists");
                Err(ServiceError::unauthenticated(BAD_TOKEN))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::directory::SqliteDirectory;

    fn auth() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            token_ttl_minutes: 30,
        }
    }

    fn registration(username: &str, role: Option<Role>) -> Registration {
        Registration {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "hunter2".to_string(),
            role,
            ..Default::default()
        }
    }

    #[test]
    fn test_password_hash_is_salted() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert!(a.starts_with("$argon2id$"));
        assert_ne!(a, b);
        assert!(verify_password("secret", &a));
        assert!(verify_password("secret", &b));
        assert!(!verify_password("Secret", &a));
        assert!(!verify_password("secret", "plain"));
        assert!(!verify_password("secret", "sha256$abcd$ef01"));
    }

    #[test]
    fn test_register_login_verify() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let auth = auth();
        let policy = RegistrationPolicy::default();
        let service = AuthService::new(&dir, &auth, &policy);

        let user = service
            .register(registration("tom", Some(Role::Technician)))
            .unwrap();
        assert_eq!(user.role, Role::Technician);

        let token = service.login("tom", "hunter2").unwrap();
        assert_eq!(token.token_type, "bearer");

        let session = service.verify(&token.access_token).unwrap();
        assert_eq!(session, Session::new(user.id, "tom", Role::Technician));
    }

    #[test]
    fn test_bad_credentials_share_one_message() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let auth = auth();
        let policy = RegistrationPolicy::default();
        let service = AuthService::new(&dir, &auth, &policy);
        service.register(registration("tom", None)).unwrap();

        let wrong_password = service.login("tom", "nope").unwrap_err();
        let unknown_user = service.login("ghost", "hunter2").unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert_eq!(wrong_password.kind().as_str(), "unauthenticated");
    }

    #[test]
    fn test_closed_policy_pins_role() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let auth = auth();
        let policy = RegistrationPolicy {
            allow_role_selection: false,
            default_role: Role::Employee,
        };
        let service = AuthService::new(&dir, &auth, &policy);
        let user = service.register(registration("eve", Some(Role::Admin))).unwrap();
        assert_eq!(user.role, Role::Employee);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let auth = auth();
        let policy = RegistrationPolicy::default();
        let service = AuthService::new(&dir, &auth, &policy);
        service.register(registration("tom", None)).unwrap();

        let mut again = registration("tom", None);
        again.email = "other@example.com".to_string();
        let err = service.register(again).unwrap_err();
        assert_eq!(err.kind().as_str(), "validation_error");
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let dir = SqliteDirectory::open_in_memory().unwrap();
        let auth = auth();
        let policy = RegistrationPolicy::default();
        let service = AuthService::new(&dir, &auth, &policy);
        let user = service.register(registration("tom", None)).unwrap();

        let other = AuthConfig {
            secret: "other".to_string(),
            token_ttl_minutes: 30,
        };
        let forged = issue_token(&other, &user).unwrap();
        let err = service.verify(&forged).unwrap_err();
        assert_eq!(err.kind().as_str(), "unauthenticated");
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let empty = AuthConfig {
            secret: String::new(),
            token_ttl_minutes: 30,
        };
        let err = decode_token(&empty, "x.y.z").unwrap_err();
        assert_eq!(err.kind().as_str(), "config_error");
    }
}
