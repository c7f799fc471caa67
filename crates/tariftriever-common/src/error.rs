//! Common error handling utilities and patterns
//!
//! A small trait plus a conversion macro so crate-specific error enums get the
//! same `From` impls for I/O and JSON failures without repeating them.

/// Common error variants that appear across multiple crates
pub trait CommonError: std::error::Error + Send + Sync + 'static {
    /// Create an I/O error variant
    fn io_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Create a parsing error variant
    fn parse_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;

    /// Create a generic "other" error variant
    fn other_error(msg: impl Into<String>) -> Self
    where
        Self: Sized;
}

/// Implement `From<std::io::Error>` and `From<anyhow::Error>` through [`CommonError`].
///
/// The `with_serde` form also maps `serde_json::Error` onto the parse variant.
#[macro_export]
macro_rules! impl_common_conversions {
    ($error_type:ident) => {
        impl From<std::io::Error> for $error_type {
            fn from(e: std::io::Error) -> Self {
                <$error_type as $crate::CommonError>::io_error(e.to_string())
            }
        }

        impl From<anyhow::Error> for $error_type {
            fn from(e: anyhow::Error) -> Self {
                <$error_type as $crate::CommonError>::other_error(e.to_string())
            }
        }
    };

    ($error_type:ident, with_serde) => {
        $crate::impl_common_conversions!($error_type);

        impl From<serde_json::Error> for $error_type {
            fn from(e: serde_json::Error) -> Self {
                <$error_type as $crate::CommonError>::parse_error(format!("JSON: {e}"))
            }
        }
    };
}
