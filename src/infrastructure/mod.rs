//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Alloy-based Ethereum provider implementations
//! - The axum HTTP front end

pub mod ethereum;
pub mod http;
