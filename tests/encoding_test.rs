//! Encoding behaviour through the public library API

use callgate::domain::abi::{encode, encode_call, parse, parse_signature, selector, validate};
use callgate::{AbiError, ParamType};

#[test]
fn test_every_integer_width() {
    for bits in (8..=256).step_by(8) {
        assert!(validate(&format!("f(uint{bits})")), "uint{bits}");
        assert!(validate(&format!("f(int{bits})")), "int{bits}");
    }
    for bits in [1, 4, 7, 9, 12, 100, 255, 257, 264] {
        assert!(!validate(&format!("f(uint{bits})")), "uint{bits}");
        assert!(!validate(&format!("f(int{bits})")), "int{bits}");
    }
}

#[test]
fn test_every_bytes_width() {
    for len in 1..=32 {
        assert!(validate(&format!("f(bytes{len})")), "bytes{len}");
    }
    assert!(!validate("f(bytes0)"));
    assert!(!validate("f(bytes33)"));
}

#[test]
fn test_parse_then_resolve() {
    let (name, tokens) = parse("transfer(address,uint256)").unwrap();
    assert_eq!(name, "transfer");
    assert_eq!(tokens, ["address", "uint256"]);

    let types = tokens
        .iter()
        .map(|token| token.parse::<ParamType>())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(types, [ParamType::Address, ParamType::Uint(256)]);
}

#[test]
fn test_payload_matches_selector_and_words() {
    let signature = parse_signature("transfer(address,uint256)").unwrap();
    let payload = encode_call(
        &signature,
        &["0x0000000000000000000000000000000000000001", "1000"],
    )
    .unwrap();

    assert_eq!(payload.selector(), selector("transfer(address,uint256)"));
    let args = encode(&["address", "uint256"], &["0x0000000000000000000000000000000000000001", "1000"])
        .unwrap();
    assert_eq!(payload.arguments(), args.as_slice());

    let last = &payload.as_bytes()[payload.as_bytes().len() - 32..];
    assert_eq!(&last[30..], &[0x03, 0xe8]);
    assert!(last[..30].iter().all(|b| *b == 0));
}

#[test]
fn test_dynamic_string_recovers_exact_bytes() {
    let text = "a string that is longer than one thirty-two byte word";
    let signature = parse_signature("setName(string)").unwrap();
    let payload = encode_call(&signature, &[text]).unwrap();
    let args = payload.arguments();

    let read_word = |at: usize| {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&args[at + 24..at + 32]);
        u64::from_be_bytes(buf) as usize
    };

    let offset = read_word(0);
    let len = read_word(offset);
    assert_eq!(&args[offset + 32..offset + 32 + len], text.as_bytes());
    // Tail padded to whole words
    assert_eq!(args.len() % 32, 0);
    assert!(args[offset + 32 + len..].iter().all(|b| *b == 0));
}

#[test]
fn test_mismatched_lengths_never_truncate() {
    let signature = parse_signature("transfer(address,uint256)").unwrap();
    assert_eq!(
        encode_call(&signature, &["1", "2", "3"]).unwrap_err(),
        AbiError::ArgumentCountMismatch { expected: 2, got: 3 }
    );
    assert_eq!(
        encode_call::<&str>(&signature, &[]).unwrap_err(),
        AbiError::ArgumentCountMismatch { expected: 2, got: 0 }
    );
}

#[test]
fn test_non_numeric_is_not_zero() {
    let err = encode(&["uint256"], &["abc"]).unwrap_err();
    assert_eq!(err.kind(), "InvalidNumericLiteral");
}
