//! Call pipeline: validate, encode, call
//!
//! Holds the one shared resource, the provider handle. Everything else is
//! built per request and dropped afterwards.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes};

use crate::domain::abi::{self, AbiError, CallPayload, FunctionSignature};
use crate::infrastructure::ethereum::{CallRequest, EthereumProvider};

/// Errors surfaced by [`CallService`]
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Contract address is malformed or the zero address
    #[error("invalid contract address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The node (or the connection to it) failed
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),
}

impl CallError {
    /// Short machine-readable name, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::InvalidAddress { .. } => "InvalidAddress",
            CallError::Abi(e) => e.kind(),
            CallError::Transport(_) => "TransportError",
        }
    }
}

/// An encoded call, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub contract: Address,
    pub signature: FunctionSignature,
    pub payload: CallPayload,
}

/// A completed call and the node's answer
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub contract: Address,
    pub signature: FunctionSignature,
    pub payload: CallPayload,
    pub result: Bytes,
}

impl CallOutcome {
    pub fn result_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.result))
    }
}

/// Evaluates read-only contract calls against one node
#[derive(Clone)]
pub struct CallService {
    provider: Arc<dyn EthereumProvider>,
    from: Address,
}

impl CallService {
    pub fn new(provider: Arc<dyn EthereumProvider>) -> Self {
        Self {
            provider,
            from: Address::ZERO,
        }
    }

    /// Sender used in the call object
    pub fn with_from(mut self, from: Address) -> Self {
        self.from = from;
        self
    }

    pub fn endpoint_name(&self) -> String {
        self.provider.endpoint_name()
    }

    /// Validate and encode without touching the network.
    pub fn prepare<S: AsRef<str>>(
        &self,
        contract: &str,
        signature: &str,
        params: &[S],
    ) -> Result<PreparedCall, CallError> {
        let contract = parse_contract_address(contract)?;
        let signature = abi::parse_signature(signature)?;
        let payload = abi::encode_call(&signature, params)?;

        Ok(PreparedCall {
            contract,
            signature,
            payload,
        })
    }

    /// Encode the call and run it through `eth_call`.
    pub async fn evaluate<S: AsRef<str>>(
        &self,
        contract: &str,
        signature: &str,
        params: &[S],
    ) -> Result<CallOutcome, CallError> {
        let prepared = self.prepare(contract, signature, params)?;

        let request = CallRequest::new(prepared.contract, prepared.payload.as_bytes().clone())
            .from(self.from);
        let result = self
            .provider
            .call(request)
            .await
            .map_err(CallError::Transport)?;

        Ok(CallOutcome {
            contract: prepared.contract,
            signature: prepared.signature,
            payload: prepared.payload,
            result,
        })
    }
}

/// Parse a contract address, refusing the zero address.
pub fn parse_contract_address(raw: &str) -> Result<Address, CallError> {
    let invalid = |reason: &str| CallError::InvalidAddress {
        address: raw.to_string(),
        reason: reason.to_string(),
    };

    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.len() != 40 {
        return Err(invalid("expected 40 hex digits"));
    }

    let address: Address = digits.parse().map_err(|_| invalid("not hexadecimal"))?;
    if address == Address::ZERO {
        return Err(invalid("the zero address cannot be called"));
    }
    Ok(address)
}
