//! ABI domain models and operations
//!
//! Signature grammar, parameter types and calldata encoding. Everything in
//! here is synchronous and side-effect free; the transport lives in
//! `infrastructure::ethereum`.

mod encoder;
mod error;
mod signature;
mod types;

pub use encoder::{encode, encode_call, CallPayload};
pub use error::AbiError;
pub use signature::{parse, parse_signature, selector, validate};
pub use types::{FunctionSignature, ParamType};
