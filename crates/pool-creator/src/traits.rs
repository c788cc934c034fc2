//! Trait definitions for the blockchain boundary.
//!
//! The pool creation flow only talks to the chain through [`PoolChain`] so
//! it can be unit tested against mocks.

use {
    crate::{
        fee::FeeBps,
        tokens::{PairedAmounts, TokenPair},
    },
    alloy::primitives::{Address, TxHash, U256},
    anyhow::Result,
    std::time::Duration,
};

/// ERC-20 metadata needed to interpret user amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// How long to wait for a transaction to be considered final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Number of blocks including the one the transaction was mined in.
    pub confirmations: u64,
    pub timeout: Duration,
}

impl Default for Confirmation {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Outcome of a successfully mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Address of the pool if the transaction emitted a `PoolCreated` event.
    pub pool: Option<Address>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PoolChain: Send + Sync {
    /// Address of the AMM contract. It is also the spender of all token
    /// approvals.
    fn amm(&self) -> Address;

    /// Account that signs transactions, `None` for read-only connections.
    fn signer(&self) -> Option<Address>;

    /// Fee the AMM applies when the user does not pick one.
    async fn default_fee_bps(&self) -> Result<FeeBps>;

    /// Looks up an already deployed pool for the pair and fee.
    async fn existing_pool(&self, pair: &TokenPair, fee: FeeBps) -> Result<Option<Address>>;

    async fn token_info(&self, token: Address) -> Result<TokenInfo>;

    async fn balance(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Sends an ERC-20 `approve` transaction without waiting for it.
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash>;

    /// Sends the `createPool` transaction without waiting for it.
    async fn submit_create_pool(&self, amounts: &PairedAmounts, fee: FeeBps) -> Result<TxHash>;

    /// Waits until `tx` is mined with enough confirmations. Reverted
    /// transactions are reported as errors.
    async fn wait_for_confirmation(&self, tx: TxHash, confirmation: Confirmation)
    -> Result<Receipt>;
}
