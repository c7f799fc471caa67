//! Request correlation
//!
//! Honors an inbound `X-Correlation-ID` header (when it is a UUID), otherwise
//! mints a new id. The id is exposed to handlers as [`RequestContext`] and
//! echoed on every response.

use crate::error::CORRELATION_ID_HEADER;
use axum::{extract::Request, middleware::Next, response::Response};
use tariftriever_common::CorrelationId;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
}

impl RequestContext {
    /// Correlation id from an optional context, or a fresh one
    pub fn correlation_id_or_new(context: Option<&Self>) -> CorrelationId {
        context.map_or_else(CorrelationId::new, |ctx| ctx.correlation_id.clone())
    }
}

pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = request
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or_else(CorrelationId::new, CorrelationId::from);

    request.extensions_mut().insert(RequestContext {
        correlation_id: correlation_id.clone(),
    });

    let mut response = next.run(request).await;
    if !response.headers().contains_key(CORRELATION_ID_HEADER)
        && let Ok(value) = correlation_id.to_string().parse()
    {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
    response
}
