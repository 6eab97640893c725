/// API middleware
///
/// - `security`: security response headers

pub mod security;
