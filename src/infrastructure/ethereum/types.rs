//! Wire types for the `eth_call` request

use alloy::primitives::{Address, Bytes, U256, U64};
use serde::Serialize;

/// The call object sent as the first `eth_call` parameter.
///
/// Only populated fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
}

impl CallRequest {
    /// A call to `to` carrying `data`
    pub fn new(to: Address, data: Bytes) -> Self {
        Self {
            to: Some(to),
            data: (!data.is_empty()).then_some(data),
            ..Default::default()
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}
