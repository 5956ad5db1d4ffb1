//! Ethereum infrastructure - Alloy provider implementations

mod provider;
pub(crate) mod types;

pub use provider::{
    create_provider, normalize_http_endpoint, AlloyProvider, EthereumProvider, ProviderConfig,
};
pub use types::CallRequest;
