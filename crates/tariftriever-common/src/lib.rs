//! Common utilities and patterns shared across Tariftriever crates
//!
//! Correlation ids, one-time environment setup, tracing initialisation and
//! error sanitisation live here so every crate reports failures the same way.

pub mod correlation;
pub mod error;
pub mod error_sanitizer;
pub mod init;
pub mod language;
pub mod logging;

pub use correlation::CorrelationId;
pub use error::CommonError;
pub use init::initialize_environment;
pub use language::{InvalidLanguage, Language};
pub use logging::{LogFormat, init_tracing};
