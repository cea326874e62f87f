// Authentication options and configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main authentication configuration.
///
/// Everything here is externally supplied; business logic never hardcodes
/// a secret, a TTL or the tenant header name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthOptions {
    /// Header carrying the tenant code at the login boundary. Ignored on
    /// every request that presents a token.
    pub tenant_header: String,
    /// Session token configuration.
    pub jwt: JwtOptions,
    /// Password policy applied wherever a credential is set.
    pub password: PasswordPolicy,
}

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            tenant_header: "x-college-id".to_string(),
            jwt: JwtOptions::default(),
            password: PasswordPolicy::default(),
        }
    }
}

impl AuthOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.tenant_header.trim().is_empty() {
            return Err("tenant_header must not be empty".to_string());
        }
        match &self.jwt.secret {
            Some(secret) if !secret.trim().is_empty() => {}
            _ => return Err("jwt.secret must be configured".to_string()),
        }
        if self.password.min_length == 0 {
            return Err("password.min_length must be at least 1".to_string());
        }
        Ok(())
    }

    /// Defaults plus environment overrides:
    /// CAMPUS_JWT_SECRET, CAMPUS_TENANT_HEADER, CAMPUS_TOKEN_TTL
    /// (humantime, e.g. "1h"), CAMPUS_PASSWORD_MIN_LENGTH.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(secret) = std::env::var("CAMPUS_JWT_SECRET") {
            options.jwt.secret = Some(secret);
        }
        if let Ok(header) = std::env::var("CAMPUS_TENANT_HEADER") {
            options.tenant_header = header.to_lowercase();
        }
        if let Ok(ttl) = std::env::var("CAMPUS_TOKEN_TTL") {
            if let Ok(duration) = humantime_serde::re::humantime::parse_duration(&ttl) {
                options.jwt.access_token_expires_in = duration;
            }
        }
        if let Ok(min) = std::env::var("CAMPUS_PASSWORD_MIN_LENGTH") {
            if let Ok(min) = min.parse() {
                options.password.min_length = min;
            }
        }
        options
    }
}

/// Session-token configuration. HMAC (HS256) with a shared secret.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtOptions {
    pub secret: Option<String>,
    pub issuer: String,
    pub audience: String,
    /// Token lifetime. There is no revocation store: a token stays valid
    /// until this elapses, which is why the default is short.
    #[serde(with = "humantime_serde")]
    pub access_token_expires_in: Duration,
}

impl Default for JwtOptions {
    fn default() -> Self {
        Self {
            secret: None,
            issuer: "campus".to_string(),
            audience: "campus-api".to_string(),
            access_token_expires_in: Duration::from_secs(60 * 60),
        }
    }
}

/// Minimum credential quality and hashing cost.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub cost: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            cost: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_need_a_secret() {
        let options = AuthOptions::default();
        assert!(options.validate().is_err());

        let mut options = AuthOptions::default();
        options.jwt.secret = Some("s3cret".to_string());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn ttl_round_trips_through_humantime() {
        let mut options = AuthOptions::default();
        options.jwt.secret = Some("s3cret".to_string());
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["jwt"]["access_token_expires_in"], "1h");
        let back: AuthOptions = serde_json::from_value(json).unwrap();
        assert_eq!(back, options);
    }
}
