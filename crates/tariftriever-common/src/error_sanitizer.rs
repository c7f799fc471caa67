//! Error sanitization utilities for security
//!
//! Provides utilities to sanitize error messages before returning them to users,
//! preventing information disclosure while maintaining debugging capabilities.

use crate::CorrelationId;
use tracing::error;

/// Log the detailed error and return a generic message carrying the reference id
pub fn sanitize_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    correlation_id: &CorrelationId,
) -> String {
    error!(
        correlation_id = %correlation_id,
        error = %error,
        context = %context,
        "Internal error occurred"
    );

    format!("Operation failed (ref: {correlation_id})")
}

/// Same as [`sanitize_error`] but with a caller supplied user facing message
pub fn sanitize_with_message<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
    correlation_id: &CorrelationId,
) -> String {
    error!(
        correlation_id = %correlation_id,
        error = %error,
        context = %context,
        "Internal error occurred"
    );

    format!("{user_message} (ref: {correlation_id})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_error() {
        let id = CorrelationId::new();
        let error = "Database connection failed: password incorrect";
        let result = sanitize_error(error, "database_connection", &id);
        assert_eq!(result, format!("Operation failed (ref: {id})"));
        assert!(!result.contains("password"));
    }

    #[test]
    fn test_sanitize_with_message() {
        let id = CorrelationId::new();
        let error = "File not found: /secret/catalog.json";
        let result = sanitize_with_message(error, "catalog_reload", "Catalog reload failed", &id);
        assert!(result.starts_with("Catalog reload failed (ref: "));
        assert!(!result.contains("/secret"));
    }
}
