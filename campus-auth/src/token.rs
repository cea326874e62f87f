// Stateless session tokens.

use anyhow::Result;
use campus_core::errors::CampusError;
use campus_core::{PrincipalContext, Role, TenantId};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::options::JwtOptions;

/// Claims embedded in every session token.
///
/// `tid` is fixed at issuance and becomes the only source of tenant
/// context for any request presenting the token; a tenant header on the
/// same request is ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    pub tid: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Signs and verifies self-contained session tokens. Nothing is persisted
/// server-side; expiry is the only way a token dies.
#[derive(Clone)]
pub struct SessionTokens {
    options: JwtOptions,
}

impl SessionTokens {
    pub fn new(options: JwtOptions) -> Self {
        Self { options }
    }

    fn secret(&self) -> Result<&str> {
        self.options
            .secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                CampusError::not_authenticated("JWT secret is not configured").into_anyhow()
            })
    }

    /// Issue a token for a verified principal.
    pub fn issue(&self, principal: &PrincipalContext) -> Result<String> {
        let secret = self.secret()?;
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: principal.principal_id.clone(),
            role: principal.role,
            tid: principal.tenant_id.0.clone(),
            iss: self.options.issuer.clone(),
            aud: self.options.audience.clone(),
            iat: now,
            exp: now + self.options.access_token_expires_in.as_secs() as i64,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| CampusError::not_authenticated(e.to_string()).into_anyhow())
    }

    /// Verify signature, expiry, issuer and audience, returning the
    /// decoded principal. Every failure mode collapses into one generic
    /// authentication rejection.
    pub fn verify(&self, token: &str) -> Result<PrincipalContext> {
        let secret = self.secret()?;

        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_issuer(&[self.options.issuer.as_str()]);
        validation.set_audience(&[self.options.audience.as_str()]);

        let decoded = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|_| {
            CampusError::not_authenticated("Invalid or expired access token").into_anyhow()
        })?;

        let claims = decoded.claims;
        Ok(PrincipalContext {
            principal_id: claims.sub,
            role: claims.role,
            tenant_id: TenantId(claims.tid),
        })
    }
}
