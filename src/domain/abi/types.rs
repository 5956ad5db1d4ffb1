//! Parameter types accepted in a call signature

use std::fmt;
use std::str::FromStr;

use super::signature::Grammar;
use super::AbiError;

/// An ABI parameter type from the elementary subset we accept.
///
/// No tuples; arrays may nest (`uint8[2][]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `int<N>`, N in 8..=256 step 8
    Int(usize),
    /// `uint<N>`, N in 8..=256 step 8
    Uint(usize),
    Address,
    Bool,
    String,
    /// Dynamic `bytes`
    Bytes,
    /// `bytes<N>`, N in 1..=32
    FixedBytes(usize),
    /// `T[]`
    Array(Box<ParamType>),
    /// `T[N]`
    FixedArray(Box<ParamType>, usize),
}

/// Canonical form: `uint` and `int` always carry their width.
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::String => f.write_str("string"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(len) => write!(f, "bytes{len}"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
            ParamType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut grammar = Grammar::new(token);
        grammar
            .param_type()
            .and_then(|ty| grammar.finish().map(|()| ty))
            .map_err(|e| AbiError::Encoding {
                ty: token.to_string(),
                reason: e.to_string(),
            })
    }
}

/// A validated function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Input parameter types, in declaration order
    pub inputs: Vec<ParamType>,
}

impl FunctionSignature {
    /// Canonical signature string, e.g. `transfer(address,uint256)`
    pub fn canonical(&self) -> String {
        let inputs = self
            .inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, inputs)
    }

    /// 4-byte function selector, hashed over [`canonical`](Self::canonical).
    ///
    /// `f(uint)` therefore yields the selector of `f(uint256)`, which differs
    /// from `selector("f(uint)")` on the raw text.
    pub fn selector(&self) -> [u8; 4] {
        super::selector(&self.canonical())
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector()))
    }
}

impl FromStr for FunctionSignature {
    type Err = AbiError;

    fn from_str(signature: &str) -> Result<Self, Self::Err> {
        super::parse_signature(signature)
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
