//! campus-auth: credential verification and session issuance.
//!
//! Everything between "who is calling" and "which tenant may they touch":
//! password hashing, stateless signed session tokens, the login flow and
//! the atomic tenant bootstrap.

pub mod bootstrap;
pub mod hasher;
pub mod login;
pub mod options;
pub mod token;

pub use bootstrap::{AdminAttrs, Bootstrap, TenantAttrs};
pub use hasher::PasswordHasher;
pub use login::{strip_password, Authenticator, Credentials, Session};
pub use options::{AuthOptions, JwtOptions, PasswordPolicy};
pub use token::{SessionClaims, SessionTokens};
