/// Authentication and authorization utilities
///
/// - `password`: Argon2id password hashing and verification
/// - `jwt`: Bearer token issuance and validation
/// - `middleware`: Request auth context for Axum handlers
/// - `authorization`: Membership and ownership checks

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
