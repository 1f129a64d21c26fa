//! HS256 JWT adapter for the `SessionValidator` port.
//!
//! Tokens are issued elsewhere with a shared secret. Claims carry the
//! subject id (`sub`, or `userId` for tokens minted by the legacy issuer),
//! the role, and the expiry. Issuer is checked when configured.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedSubject, Role, UserId};
use crate::ports::SessionValidator;

/// Settings for the JWT validator.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp`, in seconds.
    pub leeway_secs: u64,
}

/// Claims this adapter understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabClaims {
    #[serde(alias = "userId")]
    pub sub: String,
    pub role: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

pub struct JwtSessionValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Self { key, validation }
    }

    fn decode_claims(&self, token: &str) -> Result<LabClaims, AuthError> {
        decode::<LabClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubject, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = self.decode_claims(token)?;

        let id = UserId::new(claims.sub).map_err(|_| {
            tracing::warn!("Token has empty subject");
            AuthError::InvalidToken
        })?;
        let role: Role = claims.role.parse().map_err(|_| {
            tracing::warn!(role = %claims.role, "Token carries unknown role");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedSubject::new(id, role))
    }
}
