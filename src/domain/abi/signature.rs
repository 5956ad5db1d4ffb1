//! Function signature grammar
//!
//! A signature is `name(type,type,...)` with no whitespace and no return
//! clause. The grammar is a small recursive-descent parser:
//!
//! ```text
//! signature  := identifier "(" [ type { "," type } ] ")"
//! type       := elementary { "[" [ length ] "]" }
//! elementary := ("int" | "uint") [ width ] | "bytes" [ width ]
//!             | "address" | "bool" | "string"
//! ```

use std::fmt;

use alloy::primitives::keccak256;

use super::{AbiError, FunctionSignature, ParamType};

/// Check whether a signature is well formed.
pub fn validate(signature: &str) -> bool {
    parse_signature(signature).is_ok()
}

/// Validate a signature and resolve its parameter types.
pub fn parse_signature(signature: &str) -> Result<FunctionSignature, AbiError> {
    Grammar::new(signature)
        .function()
        .map_err(|e| AbiError::InvalidSignature {
            signature: signature.to_string(),
            reason: e.to_string(),
        })
}

/// Split a signature into its name and raw type tokens.
///
/// Uses the first `(` and the first `)`; the tokens themselves are not
/// checked here.
pub fn parse(signature: &str) -> Result<(String, Vec<String>), AbiError> {
    let open = signature
        .find('(')
        .ok_or_else(|| AbiError::Parse(signature.to_string()))?;
    let close = signature
        .find(')')
        .filter(|close| *close > open)
        .ok_or_else(|| AbiError::Parse(signature.to_string()))?;

    let name = signature[..open].to_string();
    let params = &signature[open + 1..close];
    let types = if params.is_empty() {
        Vec::new()
    } else {
        params.split(',').map(str::to_string).collect()
    };

    Ok((name, types))
}

/// First 4 bytes of keccak256 of the signature string, hashed as given.
///
/// Use [`FunctionSignature::selector`] for the selector of the canonical form.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

#[derive(Debug)]
pub(super) struct SyntaxError {
    offset: usize,
    message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

pub(super) struct Grammar<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Grammar<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(super) fn function(&mut self) -> Result<FunctionSignature, SyntaxError> {
        let name = self.identifier()?.to_string();
        self.expect(b'(')?;

        let mut inputs = Vec::new();
        if !self.eat(b')') {
            loop {
                inputs.push(self.param_type()?);
                if self.eat(b',') {
                    continue;
                }
                self.expect(b')')?;
                break;
            }
        }

        self.finish()?;
        Ok(FunctionSignature { name, inputs })
    }

    pub(super) fn param_type(&mut self) -> Result<ParamType, SyntaxError> {
        let mut ty = self.elementary()?;

        while self.eat(b'[') {
            if self.eat(b']') {
                ty = ParamType::Array(Box::new(ty));
                continue;
            }
            let start = self.pos;
            let len = self
                .number()?
                .ok_or_else(|| self.unexpected("array length or `]`"))?;
            if len == 0 {
                return Err(self.error_at(start, "array length must be at least 1"));
            }
            self.expect(b']')?;
            ty = ParamType::FixedArray(Box::new(ty), len);
        }

        Ok(ty)
    }

    /// Require that the whole input has been consumed.
    pub(super) fn finish(&self) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn elementary(&mut self) -> Result<ParamType, SyntaxError> {
        let start = self.pos;
        let keyword = self.take_while(|b| b.is_ascii_lowercase());
        let width_at = self.pos;
        let width = self.number()?;

        let ty = match (keyword, width) {
            ("int", None) => ParamType::Int(256),
            ("uint", None) => ParamType::Uint(256),
            ("int", Some(bits)) | ("uint", Some(bits)) => {
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    return Err(self.error_at(
                        width_at,
                        format!("integer width {bits} is not a multiple of 8 in 8..=256"),
                    ));
                }
                if keyword == "int" {
                    ParamType::Int(bits)
                } else {
                    ParamType::Uint(bits)
                }
            }
            ("bytes", None) => ParamType::Bytes,
            ("bytes", Some(len)) => {
                if !(1..=32).contains(&len) {
                    return Err(self.error_at(
                        width_at,
                        format!("bytes width {len} is outside 1..=32"),
                    ));
                }
                ParamType::FixedBytes(len)
            }
            ("address" | "bool" | "string", Some(_)) => {
                return Err(self.error_at(width_at, format!("`{keyword}` takes no width")));
            }
            ("address", None) => ParamType::Address,
            ("bool", None) => ParamType::Bool,
            ("string", None) => ParamType::String,
            ("", _) => return Err(self.error_at(start, "expected a type")),
            (other, _) => {
                return Err(self.error_at(start, format!("unsupported type `{other}`")));
            }
        };

        Ok(ty)
    }

    fn identifier(&mut self) -> Result<&'a str, SyntaxError> {
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
            _ => return Err(self.unexpected("function name")),
        }
        Ok(self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_'))
    }

    /// Decimal number without leading zeros, if one starts here.
    fn number(&mut self) -> Result<Option<usize>, SyntaxError> {
        let start = self.pos;
        let digits = self.take_while(|b| b.is_ascii_digit());
        if digits.is_empty() {
            return Ok(None);
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(self.error_at(start, format!("leading zero in `{digits}`")));
        }
        digits
            .parse::<usize>()
            .map(Some)
            .map_err(|_| self.error_at(start, format!("number `{digits}` is too large")))
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), SyntaxError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}`", expected as char)))
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = match self.input[self.pos..].chars().next() {
            Some(c) => format!("`{c}`"),
            None => "end of input".to_string(),
        };
        self.error_at(self.pos, format!("expected {expected}, found {found}"))
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            offset,
            message: message.into(),
        }
    }
}
