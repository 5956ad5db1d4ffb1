//! Ethereum provider abstraction and Alloy implementations
//!
//! Calls go through `raw_request` so the call object reaches the node exactly
//! as `CallRequest` serializes it.

use std::path::PathBuf;

use alloy::network::Ethereum;
use alloy::primitives::Bytes;
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use anyhow::{Context, Result};

use super::types::CallRequest;

/// Block tag every call is evaluated against
const CALL_BLOCK_TAG: &str = "latest";

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }
}

/// Abstract Ethereum provider trait
///
/// The HTTP front end only ever needs `eth_call`; keeping it behind a trait
/// lets tests swap in a canned node.
#[async_trait::async_trait]
pub trait EthereumProvider: Send + Sync + 'static {
    /// Execute `eth_call(request, "latest")` and return the raw result
    async fn call(&self, request: CallRequest) -> Result<Bytes>;

    /// Get client version (for node detection)
    async fn client_version(&self) -> Result<String>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// Enum-based provider that stores the concrete provider for each transport
pub enum AlloyProvider {
    Http {
        provider: FilledProvider,
        endpoint: String,
    },
    WebSocket {
        provider: FilledProvider,
        endpoint: String,
    },
    #[cfg(unix)]
    Ipc {
        provider: FilledProvider,
        endpoint: String,
    },
}

/// Create a provider from configuration
pub async fn create_provider(config: ProviderConfig) -> Result<Box<dyn EthereumProvider>> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            let provider = ProviderBuilder::new().connect_http(rpc_url);
            Ok(Box::new(AlloyProvider::Http {
                provider,
                endpoint: url,
            }))
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(&url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(Box::new(AlloyProvider::WebSocket {
                provider,
                endpoint: url,
            }))
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc_path = path.to_string_lossy().to_string();
            let ipc = IpcConnect::new(ipc_path);
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            let display = path.display().to_string();
            Ok(Box::new(AlloyProvider::Ipc {
                provider,
                endpoint: display,
            }))
        }
    }
}

// Macro to reduce code duplication for provider method implementations
macro_rules! impl_provider_method {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            AlloyProvider::Http { provider, .. } => provider.$method($($arg),*).await,
            AlloyProvider::WebSocket { provider, .. } => provider.$method($($arg),*).await,
            #[cfg(unix)]
            AlloyProvider::Ipc { provider, .. } => provider.$method($($arg),*).await,
        }
    };
}

#[async_trait::async_trait]
impl EthereumProvider for AlloyProvider {
    async fn call(&self, request: CallRequest) -> Result<Bytes> {
        let params = (&request, CALL_BLOCK_TAG);
        let result: std::result::Result<Bytes, _> =
            impl_provider_method!(self, raw_request, "eth_call".into(), params);
        result.context("eth_call failed")
    }

    async fn client_version(&self) -> Result<String> {
        Ok(impl_provider_method!(self, get_client_version)?)
    }

    fn endpoint_name(&self) -> String {
        match self {
            AlloyProvider::Http { endpoint, .. } => endpoint.clone(),
            AlloyProvider::WebSocket { endpoint, .. } => endpoint.clone(),
            #[cfg(unix)]
            AlloyProvider::Ipc { endpoint, .. } => endpoint.clone(),
        }
    }
}

/// Prepend `http://` when an HTTP endpoint is given without a scheme.
pub fn normalize_http_endpoint(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_http_endpoint() {
        assert_eq!(normalize_http_endpoint("localhost:8545"), "http://localhost:8545");
        assert_eq!(normalize_http_endpoint(" https://rpc.example "), "https://rpc.example");
    }

    #[test]
    fn test_display() {
        let ws = ProviderConfig::WebSocket("ws://localhost:8545".into());
        assert_eq!(ws.display(), "ws://localhost:8545");
    }

    #[tokio::test]
    async fn test_http_provider_is_lazy() {
        // Building an HTTP provider does not touch the network
        let provider = create_provider(ProviderConfig::Http("http://127.0.0.1:1".into()))
            .await
            .unwrap();
        assert_eq!(provider.endpoint_name(), "http://127.0.0.1:1");
    }

    #[tokio::test]
    async fn test_unreachable_node_is_an_error() {
        let provider = create_provider(ProviderConfig::Http("http://127.0.0.1:1".into()))
            .await
            .unwrap();
        let request = CallRequest::new(
            alloy::primitives::Address::repeat_byte(0x11),
            Bytes::from(vec![0x18, 0x16, 0x0d, 0xdd]),
        );
        assert!(provider.call(request).await.is_err());
    }
}
