//! callgate: evaluate read-only contract calls over HTTP
//!
//! `GET /{address}/{signature}/{params...}` validates the signature, ABI
//! encodes the parameters behind the function selector, runs the payload
//! through `eth_call` and returns the raw result.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod service;

pub use domain::abi::{AbiError, CallPayload, FunctionSignature, ParamType};
pub use service::{CallError, CallOutcome, CallService};
