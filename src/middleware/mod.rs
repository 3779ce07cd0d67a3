pub mod auth;
pub mod logger;

pub use auth::{CurrentUser, IdentityVerifier, auth_middleware};
pub use logger::{REQUEST_ID_HEADER, RequestId, logger};
