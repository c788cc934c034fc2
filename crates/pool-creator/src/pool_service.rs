use {
    crate::{
        amount::{TokenAmount, display_units},
        fee::{FeeBps, FeeTier},
        tokens::{PairedAmounts, TokenPair, checksummed, normalize_address, sort_token_addresses},
        traits::{Confirmation, PoolChain, Receipt, TokenInfo},
    },
    alloy::primitives::{Address, TxHash, U256},
    anyhow::{Context, Result, bail, ensure},
    std::fmt,
};

/// Everything the user enters to create a pool. Tokens may be given in any
/// order.
#[derive(Debug, Clone)]
pub struct CreatePoolRequest {
    pub token_a: String,
    pub amount_a: TokenAmount,
    pub token_b: String,
    pub amount_b: TokenAmount,
    pub fee: FeeTier,
}

/// A validated pool creation, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPool {
    pub owner: Address,
    pub amounts: PairedAmounts,
    /// Metadata of `token0` and `token1`, in pair order.
    pub tokens: [TokenInfo; 2],
    pub fee: FeeBps,
}

impl fmt::Display for PreparedPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [token0, token1] = &self.tokens;
        writeln!(f, "owner: {}", checksummed(&self.owner))?;
        writeln!(
            f,
            "token0: {} {} ({})",
            display_units(self.amounts.amount0, token0.decimals),
            token0.symbol,
            checksummed(&token0.address),
        )?;
        writeln!(
            f,
            "token1: {} {} ({})",
            display_units(self.amounts.amount1, token1.decimals),
            token1.symbol,
            checksummed(&token1.address),
        )?;
        writeln!(f, "fee: {}", self.fee)
    }
}

pub struct PoolCreator<C> {
    chain: C,
    confirmation: Confirmation,
    unlimited_approval: bool,
}

impl<C: PoolChain> PoolCreator<C> {
    pub fn new(chain: C, confirmation: Confirmation) -> Self {
        Self {
            chain,
            confirmation,
            unlimited_approval: false,
        }
    }

    /// Approve `U256::MAX` instead of the exact deposit.
    pub fn with_unlimited_approval(mut self, unlimited: bool) -> Self {
        self.unlimited_approval = unlimited;
        self
    }

    /// Validates the request against the chain without sending anything.
    pub async fn prepare(&self, request: &CreatePoolRequest) -> Result<PreparedPool> {
        let token_a = normalize_address(&request.token_a).context("token A")?;
        let token_b = normalize_address(&request.token_b).context("token B")?;
        // Fails early for identical or zero tokens.
        let pair = sort_token_addresses(token_a, token_b)?;
        let owner = self
            .chain
            .signer()
            .context("creating a pool requires a private key")?;

        let info_a = self.chain.token_info(token_a).await?;
        let info_b = self.chain.token_info(token_b).await?;
        let amount_a = request
            .amount_a
            .to_base_units(info_a.decimals)
            .with_context(|| format!("amount of {}", info_a.symbol))?;
        let amount_b = request
            .amount_b
            .to_base_units(info_b.decimals)
            .with_context(|| format!("amount of {}", info_b.symbol))?;

        let amounts = TokenPair::sort_amounts((token_a, amount_a), (token_b, amount_b))?;
        debug_assert_eq!(amounts.pair, pair);
        let tokens = if pair.token0() == token_a {
            [info_a, info_b]
        } else {
            [info_b, info_a]
        };

        let fee = request
            .fee
            .resolve(|| self.chain.default_fee_bps())
            .await
            .context("resolve fee tier")?;
        tracing::debug!(%pair, %fee, tier = %request.fee, "resolved pool parameters");

        if let Some(pool) = self.chain.existing_pool(&pair, fee).await? {
            bail!("pool {pool} already exists for {pair} with fee {fee}");
        }

        for ((token, amount), info) in amounts.entries().into_iter().zip(&tokens) {
            let balance = self.chain.balance(token, owner).await?;
            ensure!(
                balance >= amount,
                "insufficient {} balance: have {}, need {}",
                info.symbol,
                display_units(balance, info.decimals),
                display_units(amount, info.decimals),
            );
        }

        Ok(PreparedPool {
            owner,
            amounts,
            tokens,
            fee,
        })
    }

    /// Makes sure the AMM may pull both deposits, approving where the current
    /// allowance falls short. Each approval is awaited before moving on.
    pub async fn ensure_approvals(&self, prepared: &PreparedPool) -> Result<Vec<TxHash>> {
        let spender = self.chain.amm();
        let mut approvals = Vec::new();
        for ((token, amount), info) in prepared.amounts.entries().into_iter().zip(&prepared.tokens)
        {
            let allowance = self
                .chain
                .allowance(token, prepared.owner, spender)
                .await?;
            if allowance >= amount {
                tracing::debug!(token = %info.symbol, %allowance, "allowance sufficient");
                continue;
            }

            let approved = if self.unlimited_approval {
                U256::MAX
            } else {
                amount
            };
            let tx = self
                .chain
                .approve(token, spender, approved)
                .await
                .with_context(|| format!("approve {}", info.symbol))?;
            tracing::info!(token = %info.symbol, %approved, ?tx, "sent approval");
            self.chain
                .wait_for_confirmation(tx, self.confirmation)
                .await
                .with_context(|| format!("approval of {}", info.symbol))?;
            approvals.push(tx);
        }
        Ok(approvals)
    }

    /// Approves both tokens if needed and submits the pool creation.
    ///
    /// Returns as soon as the transaction is sent, use [`Self::confirm`] to
    /// wait for it.
    pub async fn create_pool(&self, prepared: &PreparedPool) -> Result<TxHash> {
        self.ensure_approvals(prepared)
            .await
            .context("approve tokens")?;
        let tx = self
            .chain
            .submit_create_pool(&prepared.amounts, prepared.fee)
            .await?;
        tracing::info!(pair = %prepared.amounts.pair, fee = %prepared.fee, ?tx, "submitted pool creation");
        Ok(tx)
    }

    pub async fn confirm(&self, tx: TxHash) -> Result<Receipt> {
        let receipt = self
            .chain
            .wait_for_confirmation(tx, self.confirmation)
            .await?;
        tracing::info!(?tx, block = ?receipt.block_number, pool = ?receipt.pool, "pool creation confirmed");
        Ok(receipt)
    }
}
