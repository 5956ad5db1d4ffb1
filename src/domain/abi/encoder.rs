//! ABI encoder for function calldata
//!
//! Raw parameters arrive as plain strings. Each one is converted according
//! to its declared type, then the whole list is packed with the standard
//! head/tail scheme behind the 4-byte selector.

use std::fmt;

use alloy::primitives::{Address, Bytes, FixedBytes, Sign, I256, U256};
use alloy_dyn_abi::DynSolValue;

use super::{AbiError, FunctionSignature, ParamType};

/// Selector followed by the packed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPayload(Bytes);

impl CallPayload {
    /// The 4-byte function selector
    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&self.0[..4]);
        selector
    }

    /// Packed arguments, without the selector
    pub fn arguments(&self) -> &[u8] {
        &self.0[4..]
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }
}

impl fmt::Display for CallPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

/// Encode a call to `signature` with the given raw parameters.
pub fn encode_call<S: AsRef<str>>(
    signature: &FunctionSignature,
    params: &[S],
) -> Result<CallPayload, AbiError> {
    let values = parse_arguments(&signature.inputs, params)?;

    let mut calldata = signature.selector().to_vec();
    if !values.is_empty() {
        calldata.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
    }

    Ok(CallPayload(calldata.into()))
}

/// Pack raw parameters for the given type tokens, without a selector.
pub fn encode<T, S>(types: &[T], params: &[S]) -> Result<Vec<u8>, AbiError>
where
    T: AsRef<str>,
    S: AsRef<str>,
{
    let types = types
        .iter()
        .map(|token| token.as_ref().parse::<ParamType>())
        .collect::<Result<Vec<_>, _>>()?;

    let values = parse_arguments(&types, params)?;
    if values.is_empty() {
        return Ok(Vec::new());
    }
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Why a single literal was refused
enum Rejection {
    Numeric(String),
    Malformed(String),
}

/// Parse argument values according to their types
fn parse_arguments<S: AsRef<str>>(
    types: &[ParamType],
    params: &[S],
) -> Result<Vec<DynSolValue>, AbiError> {
    if types.len() != params.len() {
        return Err(AbiError::ArgumentCountMismatch {
            expected: types.len(),
            got: params.len(),
        });
    }

    types
        .iter()
        .zip(params)
        .enumerate()
        .map(|(i, (ty, param))| {
            let literal = param.as_ref();
            parse_value(ty, literal).map_err(|rejection| match rejection {
                Rejection::Numeric(reason) => AbiError::InvalidNumericLiteral {
                    index: i + 1,
                    ty: ty.to_string(),
                    literal: literal.to_string(),
                    reason,
                },
                Rejection::Malformed(reason) => AbiError::InvalidLiteral {
                    index: i + 1,
                    ty: ty.to_string(),
                    literal: literal.to_string(),
                    reason,
                },
            })
        })
        .collect()
}

/// Parse a single value according to its type
fn parse_value(ty: &ParamType, arg: &str) -> Result<DynSolValue, Rejection> {
    match ty {
        ParamType::String => Ok(DynSolValue::String(arg.to_string())),

        ParamType::Bytes => Ok(DynSolValue::Bytes(parse_hex(arg)?)),

        ParamType::FixedBytes(size) => {
            let bytes = parse_hex(arg)?;
            if bytes.len() != *size {
                return Err(Rejection::Malformed(format!(
                    "expected {} bytes, got {}",
                    size,
                    bytes.len()
                )));
            }
            Ok(DynSolValue::FixedBytes(FixedBytes::right_padding_from(&bytes), *size))
        }

        ParamType::Uint(bits) => {
            let value = parse_unsigned(arg)?;
            if value.bit_len() > *bits {
                return Err(Rejection::Numeric(format!("does not fit in {bits} bits")));
            }
            Ok(DynSolValue::Uint(value, *bits))
        }

        ParamType::Int(bits) => Ok(DynSolValue::Int(parse_signed(arg, *bits)?, *bits)),

        ParamType::Address => Ok(DynSolValue::Address(parse_address(arg)?)),

        ParamType::Bool => {
            let value = match arg {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(Rejection::Malformed(
                        "expected true, false, 1 or 0".to_string(),
                    ))
                }
            };
            Ok(DynSolValue::Bool(value))
        }

        ParamType::Array(inner) => {
            let values = split_array(arg)?
                .into_iter()
                .map(|elem| parse_value(inner, elem))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::Array(values))
        }

        ParamType::FixedArray(inner, size) => {
            let elements = split_array(arg)?;
            if elements.len() != *size {
                return Err(Rejection::Malformed(format!(
                    "expected {} elements, got {}",
                    size,
                    elements.len()
                )));
            }
            let values = elements
                .into_iter()
                .map(|elem| parse_value(inner, elem))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(DynSolValue::FixedArray(values))
        }
    }
}

/// Hex with an optional `0x` prefix
fn parse_hex(arg: &str) -> Result<Vec<u8>, Rejection> {
    let digits = strip_hex_prefix(arg).unwrap_or(arg);
    hex::decode(digits).map_err(|e| Rejection::Malformed(format!("invalid hex: {e}")))
}

/// Base-10 by default, base-16 with a `0x` prefix
fn parse_unsigned(arg: &str) -> Result<U256, Rejection> {
    let (digits, radix) = match strip_hex_prefix(arg) {
        Some(digits) => (digits, 16u32),
        None => (arg, 10u32),
    };

    // Empty input must not read as zero
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(Rejection::Numeric(if radix == 16 {
            "expected hexadecimal digits".to_string()
        } else {
            "expected decimal digits".to_string()
        }));
    }

    U256::from_str_radix(digits, u64::from(radix))
        .map_err(|e| Rejection::Numeric(e.to_string()))
}

fn parse_signed(arg: &str, bits: usize) -> Result<I256, Rejection> {
    let (sign, digits) = match arg.strip_prefix('-') {
        Some(rest) => (Sign::Negative, rest),
        None => (Sign::Positive, arg),
    };
    let magnitude = parse_unsigned(digits)?;

    // Two's complement range: [-2^(bits-1), 2^(bits-1) - 1]
    let limit = U256::from(1u8) << (bits - 1);
    let in_range = match sign {
        Sign::Negative => magnitude <= limit,
        Sign::Positive => magnitude < limit,
    };
    if !in_range {
        return Err(Rejection::Numeric(format!("does not fit in int{bits}")));
    }

    I256::checked_from_sign_and_abs(sign, magnitude)
        .ok_or_else(|| Rejection::Numeric(format!("does not fit in int{bits}")))
}

/// `0x` followed by 40 hex digits, or a decimal below 2^160
fn parse_address(arg: &str) -> Result<Address, Rejection> {
    if let Some(digits) = strip_hex_prefix(arg) {
        if digits.len() != 40 {
            return Err(Rejection::Numeric(format!(
                "expected 40 hex digits, got {}",
                digits.len()
            )));
        }
        let bytes = hex::decode(digits)
            .map_err(|e| Rejection::Numeric(format!("invalid hex: {e}")))?;
        return Ok(Address::from_slice(&bytes));
    }

    let value = parse_unsigned(arg)?;
    if value.bit_len() > 160 {
        return Err(Rejection::Numeric("does not fit in 160 bits".to_string()));
    }
    Ok(Address::from_word(value.to_be_bytes::<32>().into()))
}

fn strip_hex_prefix(arg: &str) -> Option<&str> {
    arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X"))
}

/// Split `[a,b,[c,d]]` into its top-level elements.
fn split_array(arg: &str) -> Result<Vec<&str>, Rejection> {
    let inner = arg
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            Rejection::Malformed("array must be enclosed in brackets: [val1,val2,...]".to_string())
        })?;

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut elements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Rejection::Malformed("unbalanced brackets".to_string()))?;
            }
            ',' if depth == 0 => {
                elements.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Rejection::Malformed("unbalanced brackets".to_string()));
    }
    elements.push(inner[start..].trim());

    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::parse_signature;

    fn word(data: &[u8], index: usize) -> &[u8] {
        &data[index * 32..(index + 1) * 32]
    }

    #[test]
    fn test_encode_transfer() {
        let sig = parse_signature("transfer(address,uint256)").unwrap();
        let args = ["0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0", "1000000"];

        let payload = encode_call(&sig, &args).unwrap();

        assert_eq!(payload.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(payload.arguments().len(), 64);
        assert!(payload.to_string().starts_with("0xa9059cbb"));
    }

    #[test]
    fn test_encode_no_args() {
        let sig = parse_signature("totalSupply()").unwrap();
        let payload = encode_call::<&str>(&sig, &[]).unwrap();
        // Should be just 4 bytes (selector)
        assert_eq!(payload.as_bytes().len(), 4);
    }

    #[test]
    fn test_uint_is_left_padded() {
        let encoded = encode(&["uint256"], &["1000"]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert!(encoded[..30].iter().all(|b| *b == 0));
        assert_eq!(&encoded[30..], &[0x03, 0xe8]);
    }

    #[test]
    fn test_address_is_right_aligned() {
        let encoded = encode(&["address"], &["0x0000000000000000000000000000000000000001"]).unwrap();
        assert_eq!(encoded.len(), 32);
        assert!(encoded[..31].iter().all(|b| *b == 0));
        assert_eq!(encoded[31], 1);

        let encoded = encode(&["address"], &["0xffffffffffffffffffffffffffffffffffffffff"]).unwrap();
        assert!(encoded[..12].iter().all(|b| *b == 0));
        assert!(encoded[12..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_address_accepts_decimal() {
        let hex = encode(&["address"], &["0x00000000000000000000000000000000000000ff"]).unwrap();
        let dec = encode(&["address"], &["255"]).unwrap();
        assert_eq!(hex, dec);
    }

    #[test]
    fn test_string_round_trip() {
        let text = "hello, calldata";
        let encoded = encode(&["string"], &[text]).unwrap();

        let offset = U256::from_be_slice(word(&encoded, 0)).to::<usize>();
        assert_eq!(offset, 32);
        let len = U256::from_be_slice(&encoded[offset..offset + 32]).to::<usize>();
        assert_eq!(len, text.len());
        let data = &encoded[offset + 32..offset + 32 + len];
        assert_eq!(data, text.as_bytes());
        // Tail is padded to a whole word
        assert_eq!(encoded.len(), 32 + 32 + 32);
    }

    #[test]
    fn test_static_head_before_dynamic_tail() {
        let encoded = encode(&["uint8", "string", "bool"], &["7", "abc", "true"]).unwrap();

        assert_eq!(word(&encoded, 0)[31], 7);
        let offset = U256::from_be_slice(word(&encoded, 1)).to::<usize>();
        assert_eq!(offset, 96);
        assert_eq!(word(&encoded, 2)[31], 1);
        assert_eq!(U256::from_be_slice(word(&encoded, 3)), U256::from(3));
        assert_eq!(&word(&encoded, 4)[..3], b"abc");
    }

    #[test]
    fn test_bytes_are_hex_decoded() {
        let with_prefix = encode(&["bytes"], &["0xdeadbeef"]).unwrap();
        let without = encode(&["bytes"], &["deadbeef"]).unwrap();
        assert_eq!(with_prefix, without);
        assert_eq!(U256::from_be_slice(word(&with_prefix, 1)), U256::from(4));
        assert_eq!(&word(&with_prefix, 2)[..4], &[0xde, 0xad, 0xbe, 0xef]);

        let fixed = encode(&["bytes4"], &["0x01020304"]).unwrap();
        assert_eq!(&fixed[..4], &[1, 2, 3, 4]);
        assert!(fixed[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_fixed_bytes_length_must_match() {
        let err = encode(&["bytes4"], &["0x0102"]).unwrap_err();
        assert_eq!(err.kind(), "InvalidLiteral");
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        let err = encode(&["bytes"], &["0xzz"]).unwrap_err();
        assert!(matches!(err, AbiError::InvalidLiteral { index: 1, .. }));
    }

    #[test]
    fn test_non_numeric_literal_is_rejected() {
        let err = encode(&["uint256"], &["abc"]).unwrap_err();
        match err {
            AbiError::InvalidNumericLiteral { index, ty, literal, .. } => {
                assert_eq!(index, 1);
                assert_eq!(ty, "uint256");
                assert_eq!(literal, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            encode(&["uint256"], &[""]),
            Err(AbiError::InvalidNumericLiteral { .. })
        ));
        assert!(matches!(
            encode(&["uint256"], &["-1"]),
            Err(AbiError::InvalidNumericLiteral { .. })
        ));
        assert!(matches!(
            encode(&["address"], &["vitalik"]),
            Err(AbiError::InvalidNumericLiteral { .. })
        ));
    }

    #[test]
    fn test_width_overflow_is_rejected() {
        assert!(encode(&["uint8"], &["255"]).is_ok());
        assert!(matches!(
            encode(&["uint8"], &["256"]),
            Err(AbiError::InvalidNumericLiteral { .. })
        ));
        assert!(encode(&["int8"], &["-128"]).is_ok());
        assert!(encode(&["int8"], &["127"]).is_ok());
        assert!(encode(&["int8"], &["128"]).is_err());
        assert!(encode(&["int8"], &["-129"]).is_err());
    }

    #[test]
    fn test_negative_int_is_sign_extended() {
        let encoded = encode(&["int256"], &["-1"]).unwrap();
        assert!(encoded.iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_hex_numbers() {
        let hex = encode(&["uint256"], &["0x3e8"]).unwrap();
        let dec = encode(&["uint256"], &["1000"]).unwrap();
        assert_eq!(hex, dec);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(encode(&["bool"], &["true"]).unwrap()[31], 1);
        assert_eq!(encode(&["bool"], &["0"]).unwrap()[31], 0);
        assert!(matches!(
            encode(&["bool"], &["yes"]),
            Err(AbiError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_arrays() {
        let dynamic = encode(&["uint256[]"], &["[1,2,3]"]).unwrap();
        // offset, length, three elements
        assert_eq!(dynamic.len(), 5 * 32);
        assert_eq!(U256::from_be_slice(word(&dynamic, 1)), U256::from(3));
        assert_eq!(U256::from_be_slice(word(&dynamic, 4)), U256::from(3));

        let fixed = encode(&["uint8[2]"], &["[4, 5]"]).unwrap();
        assert_eq!(fixed.len(), 64);
        assert_eq!(word(&fixed, 1)[31], 5);

        let nested = encode(&["uint8[2][]"], &["[[1,2],[3,4]]"]).unwrap();
        assert_eq!(U256::from_be_slice(word(&nested, 1)), U256::from(2));

        let empty = encode(&["address[]"], &["[]"]).unwrap();
        assert_eq!(empty.len(), 64);
    }

    #[test]
    fn test_array_shape_errors() {
        assert!(matches!(
            encode(&["uint8[2]"], &["[1,2,3]"]),
            Err(AbiError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            encode(&["uint8[]"], &["1,2"]),
            Err(AbiError::InvalidLiteral { .. })
        ));
        assert!(matches!(
            encode(&["uint8[][]"], &["[[1,2]"]),
            Err(AbiError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let err = encode(&["address", "uint256"], &["0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0"])
            .unwrap_err();
        assert_eq!(err, AbiError::ArgumentCountMismatch { expected: 2, got: 1 });

        let err = encode(&["uint256"], &["1", "2"]).unwrap_err();
        assert_eq!(err, AbiError::ArgumentCountMismatch { expected: 1, got: 2 });
    }

    #[test]
    fn test_unresolvable_type() {
        let err = encode(&["uint7"], &["1"]).unwrap_err();
        assert!(matches!(err, AbiError::Encoding { .. }));

        let err = encode(&["tuple"], &["1"]).unwrap_err();
        assert!(matches!(err, AbiError::Encoding { .. }));
    }

    #[test]
    fn test_balance_of_payload() {
        let sig = parse_signature("balanceOf(address)").unwrap();
        let payload = encode_call(&sig, &["0x0000000000000000000000000000000000000001"]).unwrap();
        assert_eq!(
            payload.to_string(),
            "0x70a082310000000000000000000000000000000000000000000000000000000000000001"
        );
    }
}
