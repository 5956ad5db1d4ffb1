//! ABI error taxonomy

/// Errors produced while validating, parsing or encoding a call.
///
/// Every variant is terminal for the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    /// The signature does not match the `name(type,...)` grammar.
    #[error("invalid signature `{signature}`: {reason}")]
    InvalidSignature { signature: String, reason: String },

    /// The signature has no usable parameter list.
    #[error("malformed signature `{0}`: missing or misplaced parentheses")]
    Parse(String),

    #[error("argument count mismatch: expected {expected} arguments, got {got}")]
    ArgumentCountMismatch { expected: usize, got: usize },

    /// A numeric (or address) parameter received something that is not a number.
    #[error("argument {index} ({ty}): `{literal}` is not a valid number: {reason}")]
    InvalidNumericLiteral {
        index: usize,
        ty: String,
        literal: String,
        reason: String,
    },

    /// A non-numeric parameter (bytes, bool, array shape) could not be read.
    #[error("argument {index} ({ty}): invalid value `{literal}`: {reason}")]
    InvalidLiteral {
        index: usize,
        ty: String,
        literal: String,
        reason: String,
    },

    /// A declared type token cannot be resolved to an ABI type.
    #[error("cannot resolve type `{ty}`: {reason}")]
    Encoding { ty: String, reason: String },
}

impl AbiError {
    /// Short machine-readable name, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiError::InvalidSignature { .. } => "InvalidSignature",
            AbiError::Parse(_) => "ParseError",
            AbiError::ArgumentCountMismatch { .. } => "ArgumentCountMismatch",
            AbiError::InvalidNumericLiteral { .. } => "InvalidNumericLiteral",
            AbiError::InvalidLiteral { .. } => "InvalidLiteral",
            AbiError::Encoding { .. } => "EncodingError",
        }
    }
}
