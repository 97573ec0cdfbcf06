//! Dispatch correlation ids

use uuid::Uuid;

/// Generate a new request ID using UUID v4
///
/// Every dispatch gets one; it is recorded on the dispatch span so provider
/// and routing logs for the same request can be correlated.
///
/// # Examples
///
/// ```
/// use conduit::logging::generate_request_id;
///
/// let request_id = generate_request_id();
/// assert!(!request_id.is_empty());
/// ```
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
