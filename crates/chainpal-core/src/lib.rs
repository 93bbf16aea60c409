//! Core types, config, errors, and chat persistence for Chainpal.

pub mod config;
pub mod error;
pub mod store;
pub mod transcript;
pub mod types;
