//! Ethereum RPC plumbing: providers for reading from and writing to a node,
//! request instrumentation and error classification.

pub mod errors;
mod instrumentation;

#[cfg(any(test, feature = "test-util"))]
use alloy::providers::mock::Asserter;
use {
    alloy::{
        network::{EthereumWallet, TxSigner},
        primitives::Signature,
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::client::{ClientBuilder, RpcClient},
    },
    instrumentation::InstrumentationLayer,
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// Creates a read-only provider. Every request gets logged with `label`.
pub fn provider(url: &Url, label: &str) -> AlloyProvider {
    ProviderBuilder::new()
        .connect_client(client(url, label))
        .erased()
}

/// Creates a provider that signs and sends transactions with `signer`.
///
/// Nonce, gas and chain id of outgoing transactions are filled in by the
/// provider.
pub fn provider_with_signer<S>(url: &Url, label: &str, signer: S) -> AlloyProvider
where
    S: TxSigner<Signature> + Send + Sync + 'static,
{
    let wallet = EthereumWallet::new(signer);
    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(client(url, label))
        .erased()
}

fn client(url: &Url, label: &str) -> RpcClient {
    ClientBuilder::default()
        .layer(InstrumentationLayer {
            label: label.to_owned(),
        })
        .http(url.clone())
}

/// Provider backed by a mocked transport. Responses have to be queued on the
/// returned [`Asserter`] in the order the requests will be issued.
#[cfg(any(test, feature = "test-util"))]
pub fn mock_provider() -> (AlloyProvider, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new()
        .connect_mocked_client(asserter.clone())
        .erased();
    (provider, asserter)
}
