//! Global initialization utilities for the application

use std::sync::Once;

static INIT: Once = Once::new();

/// Load `.env` from the current directory (or any parent) once per process.
///
/// Safe to call multiple times - will only run once. Missing files are ignored.
pub fn initialize_environment() {
    INIT.call_once(|| {
        dotenvy::dotenv().ok();
    });
}
