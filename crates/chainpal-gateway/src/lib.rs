//! HTTP gateway for Chainpal.
//!
//! Serves the streamed chat endpoint, wallet-keyed chat history, and the
//! market data endpoints the client widgets call. Everything except
//! `/health` (and `/metrics` with the `metrics` feature) lives under `/api`.

pub mod boundary;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, start_gateway};
pub use state::GatewayState;
