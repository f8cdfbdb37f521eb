//! Token models: redacted secrets and the credential pair issued by the token endpoint.

pub mod credential;
pub mod secret;
