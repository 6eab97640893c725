/// Database models and store operations
///
/// - `user`: User accounts
/// - `group`: Calendar groups and invite codes
/// - `membership`: Group-user join table (the visibility relation)
/// - `event`: Dated events and the query filter

pub mod event;
pub mod group;
pub mod membership;
pub mod user;
