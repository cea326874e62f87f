//! # Errors
//!
//! A structured error set for the campus backend:
//! - consistent status codes + class names
//! - can be carried through anyhow::Error (for the request pipeline)
//! - transport-agnostic (the server crate decides how to serialize)
//!
//! Every gate in the system (tenant resolver, session validator, role
//! guard, scoped enforcer) fails closed: ambiguity or missing data maps to
//! one of these rejections, never to an implicit allow.

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for campus core APIs.
pub type CampusResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes for the identity/isolation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,         // 400
    MissingTenant,      // 400, login boundary only
    WeakCredential,     // 400, password below policy
    InvalidCredentials, // 401, unknown identifier and wrong password alike
    NotAuthenticated,   // 401, bad/expired/missing token
    AccountDisabled,    // 403
    Forbidden,          // 403, role not permitted
    NotFound,           // 404
    Conflict,           // 409
    TenantRequired,     // 500, internal invariant violation
    Atomicity,          // 500, bootstrap partial failure
    GeneralError,       // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::MissingTenant => 400,
            ErrorKind::WeakCredential => 400,
            ErrorKind::InvalidCredentials => 401,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::AccountDisabled => 403,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::TenantRequired => 500,
            ErrorKind::Atomicity => 500,
            ErrorKind::GeneralError => 500,
        }
    }

    /// Error `name` (e.g. "InvalidCredentials")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::MissingTenant => "MissingTenant",
            ErrorKind::WeakCredential => "WeakCredential",
            ErrorKind::InvalidCredentials => "InvalidCredentials",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::AccountDisabled => "AccountDisabled",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::TenantRequired => "TenantRequired",
            ErrorKind::Atomicity => "Atomicity",
            ErrorKind::GeneralError => "GeneralError",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::MissingTenant => "missing-tenant",
            ErrorKind::WeakCredential => "weak-credential",
            ErrorKind::InvalidCredentials => "invalid-credentials",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::AccountDisabled => "account-disabled",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::TenantRequired => "tenant-required",
            ErrorKind::Atomicity => "atomicity",
            ErrorKind::GeneralError => "general-error",
        }
    }
}

/// A structured campus error that can live inside `anyhow::Error`.
///
/// Fields:
/// - name
/// - message
/// - code (HTTP status)
/// - class_name
/// - data (optional)
/// - source (internal only, never serialized)
#[derive(Debug)]
pub struct CampusError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl CampusError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error` so it flows through the pipeline.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to a `CampusError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&CampusError> {
        err.downcast_ref::<CampusError>()
    }

    /// Turn any error into a CampusError:
    /// - if it's already a CampusError, keep it (lossless)
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> CampusError {
        match err.downcast::<CampusError>() {
            Ok(campus) => campus,
            Err(other) => {
                CampusError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A safe version suitable for returning to clients:
    /// - keep kind/message/code/class_name/data
    /// - drop the inner `source` (stack/secret details)
    pub fn sanitize_for_client(&self) -> CampusError {
        CampusError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    /// Client-facing JSON payload.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn missing_tenant(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingTenant, msg)
    }
    pub fn weak_credential(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::WeakCredential, msg)
    }
    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn account_disabled(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountDisabled, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn tenant_required(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::TenantRequired, msg)
    }
    pub fn atomicity(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Atomicity, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for CampusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for CampusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_json_has_stable_shape() {
        let err = CampusError::invalid_credentials("Invalid login");
        let json = err.to_json();
        assert_eq!(json["name"], "InvalidCredentials");
        assert_eq!(json["code"], 401);
        assert_eq!(json["className"], "invalid-credentials");
        assert_eq!(json["message"], "Invalid login");
    }

    #[test]
    fn normalize_keeps_campus_errors_lossless() {
        let err = CampusError::forbidden("nope").into_anyhow();
        let back = CampusError::normalize(err);
        assert_eq!(back.kind, ErrorKind::Forbidden);
        assert_eq!(back.message, "nope");
    }

    #[test]
    fn normalize_wraps_foreign_errors_as_general() {
        let err = anyhow::anyhow!("boom");
        let back = CampusError::normalize(err);
        assert_eq!(back.kind, ErrorKind::GeneralError);
        assert_eq!(back.code(), 500);
    }

    #[test]
    fn sanitize_drops_the_source() {
        let err = CampusError::atomicity("partial bootstrap")
            .with_source(anyhow::anyhow!("db timeout"));
        let safe = err.sanitize_for_client();
        assert!(safe.source.is_none());
        assert_eq!(safe.kind, ErrorKind::Atomicity);
    }
}
