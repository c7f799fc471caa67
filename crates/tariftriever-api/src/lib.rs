//! HTTP surface of the tariff code resolver

pub mod bootstrap;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub mod test_utils;

pub use bootstrap::{BootstrapError, BootstrapResult, initialize_app_state};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use middleware::{RequestContext, correlation_id_middleware};
pub use server::serve;
pub use state::AppState;
