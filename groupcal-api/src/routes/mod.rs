/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Banner and health check endpoints
/// - `auth`: Registration, login, and token refresh
/// - `users`: Authenticated profile endpoints
/// - `groups`: Group creation, listing, membership, rename
/// - `events`: Event creation and filtered listing

pub mod auth;
pub mod events;
pub mod groups;
pub mod health;
pub mod users;
