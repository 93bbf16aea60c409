//! Error boundary for handlers: failures are logged with the handler name
//! and its arguments, then passed through unchanged.

use std::fmt::Debug;
use std::future::Future;

use tracing::{error, warn};

use crate::error::ApiError;
use crate::metrics;

pub async fn logged<A, T, F>(handler: &'static str, args: A, fut: F) -> Result<T, ApiError>
where
    A: Debug,
    F: Future<Output = Result<T, ApiError>>,
{
    let result = fut.await;
    if let Err(e) = &result {
        metrics::record_error(handler);
        if e.status.is_server_error() {
            error!(handler, ?args, status = e.status.as_u16(), detail = %e.detail, "Handler failed");
        } else {
            warn!(handler, ?args, status = e.status.as_u16(), detail = %e.detail, "Request rejected");
        }
    }
    result
}
