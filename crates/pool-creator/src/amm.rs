use {
    crate::{
        fee::FeeBps,
        tokens::{PairedAmounts, TokenPair},
        traits::{Confirmation, PoolChain, Receipt, TokenInfo},
    },
    alloy::{
        primitives::{Address, TxHash, U256},
        providers::{PendingTransactionBuilder, Provider},
        rpc::types::TransactionReceipt,
    },
    anyhow::{Context, Result, anyhow},
    contracts::{IERC20, IPoolFactory},
    ethrpc::{AlloyProvider, errors::ContractErrorExt},
};

/// [`PoolChain`] implementation backed by a node connection.
pub struct Amm {
    provider: AlloyProvider,
    factory: IPoolFactory::Instance,
    signer: Option<Address>,
}

impl Amm {
    /// `signer` has to match the wallet the provider was built with, pass
    /// `None` for read-only providers.
    pub fn new(provider: AlloyProvider, address: Address, signer: Option<Address>) -> Self {
        Self {
            factory: IPoolFactory::Instance::new(address, provider.clone()),
            provider,
            signer,
        }
    }

    fn erc20(&self, token: Address) -> IERC20::Instance {
        IERC20::Instance::new(token, self.provider.clone())
    }

    fn sender(&self) -> Result<Address> {
        self.signer
            .context("sending transactions requires a private key")
    }

    /// Turns a mined receipt into a [`Receipt`], failing for reverts. Only
    /// `PoolCreated` events emitted by the AMM itself are trusted.
    fn decode_receipt(&self, receipt: &TransactionReceipt) -> Result<Receipt> {
        let tx = receipt.transaction_hash;
        if !receipt.status() {
            return Err(anyhow!(
                "transaction {tx} reverted in block {:?}",
                receipt.block_number
            ));
        }

        let amm = self.amm();
        let pool = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == amm)
            .find_map(|log| {
                log.log_decode::<IPoolFactory::IPoolFactory::PoolCreated>()
                    .ok()
            })
            .map(|log| log.inner.data.pool);

        Ok(Receipt {
            tx_hash: tx,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            pool,
        })
    }
}

fn approve_call(spender: Address, amount: U256) -> IERC20::IERC20::approveCall {
    IERC20::IERC20::approveCall { spender, amount }
}

/// Arguments follow the sorted pair so `amountA` always belongs to `tokenA`.
fn create_pool_call(
    amounts: &PairedAmounts,
    fee: FeeBps,
) -> IPoolFactory::IPoolFactory::createPoolCall {
    IPoolFactory::IPoolFactory::createPoolCall {
        tokenA: amounts.pair.token0(),
        tokenB: amounts.pair.token1(),
        amountA: amounts.amount0,
        amountB: amounts.amount1,
        feeBps: fee.into(),
    }
}

#[async_trait::async_trait]
impl PoolChain for Amm {
    fn amm(&self) -> Address {
        *self.factory.address()
    }

    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn default_fee_bps(&self) -> Result<FeeBps> {
        let raw = self
            .factory
            .defaultFeeBps()
            .call()
            .await
            .map_err(|err| err.describe("read the default fee"))?;
        FeeBps::try_from(raw)
            .with_context(|| format!("AMM {} reports an unusable default fee", self.amm()))
    }

    async fn existing_pool(&self, pair: &TokenPair, fee: FeeBps) -> Result<Option<Address>> {
        let pool = self
            .factory
            .getPool(pair.token0(), pair.token1(), fee.into())
            .call()
            .await
            .map_err(|err| err.describe("look up the pool"))?;
        Ok((!pool.is_zero()).then_some(pool))
    }

    async fn token_info(&self, token: Address) -> Result<TokenInfo> {
        let erc20 = self.erc20(token);
        let decimals = erc20
            .decimals()
            .call()
            .await
            .map_err(|err| err.describe("read token decimals"))
            .with_context(|| format!("{token} does not look like an ERC-20 token"))?;
        // Some tokens predate the standard and return `bytes32` symbols, the
        // symbol is only used for display.
        let symbol = match erc20.symbol().call().await {
            Ok(symbol) => symbol,
            Err(err) => {
                tracing::debug!(?token, ?err, "could not read token symbol");
                token.to_string()
            }
        };
        Ok(TokenInfo {
            address: token,
            symbol,
            decimals,
        })
    }

    async fn balance(&self, token: Address, owner: Address) -> Result<U256> {
        self.erc20(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|err| err.describe("read token balance"))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.erc20(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|err| err.describe("read token allowance"))
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxHash> {
        let pending = self
            .erc20(token)
            .call_builder(&approve_call(spender, amount))
            .from(self.sender()?)
            .send()
            .await
            .map_err(|err| err.describe("approve token"))?;
        Ok(*pending.tx_hash())
    }

    async fn submit_create_pool(&self, amounts: &PairedAmounts, fee: FeeBps) -> Result<TxHash> {
        let pending = self
            .factory
            .call_builder(&create_pool_call(amounts, fee))
            .from(self.sender()?)
            .send()
            .await
            .map_err(|err| err.describe("create the pool"))?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(
        &self,
        tx: TxHash,
        confirmation: Confirmation,
    ) -> Result<Receipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx)
            .with_required_confirmations(confirmation.confirmations)
            .with_timeout(Some(confirmation.timeout))
            .get_receipt()
            .await
            .with_context(|| format!("waiting for transaction {tx}"))?;

        self.decode_receipt(&receipt)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{B256, Bytes, address},
            rpc::types::Log,
            sol_types::{SolCall, SolEvent, SolValue},
        },
        ethrpc::mock_provider,
        serde_json::json,
    };

    const AMM: Address = address!("0x1000000000000000000000000000000000000001");

    fn encoded(value: impl SolValue) -> Bytes {
        value.abi_encode().into()
    }

    #[tokio::test]
    async fn reads_default_fee() {
        let (provider, asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);

        asserter.push_success(&encoded(U256::from(30)));
        assert_eq!(amm.default_fee_bps().await.unwrap(), FeeBps::new(30).unwrap());
    }

    #[tokio::test]
    async fn rejects_out_of_range_default_fee() {
        let (provider, asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);

        asserter.push_success(&encoded(U256::ZERO));
        assert!(amm.default_fee_bps().await.is_err());
    }

    #[tokio::test]
    async fn zero_pool_address_means_no_pool() {
        let (provider, asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);
        let pair = crate::tokens::sort_token_addresses(
            Address::repeat_byte(1),
            Address::repeat_byte(2),
        )
        .unwrap();
        let fee = FeeBps::new(30).unwrap();

        asserter.push_success(&encoded(Address::ZERO));
        assert_eq!(amm.existing_pool(&pair, fee).await.unwrap(), None);

        let pool = Address::repeat_byte(0xaa);
        asserter.push_success(&encoded(pool));
        assert_eq!(amm.existing_pool(&pair, fee).await.unwrap(), Some(pool));
    }

    #[tokio::test]
    async fn reads_token_info() {
        let (provider, asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);
        let token = Address::repeat_byte(0x11);

        asserter.push_success(&encoded(U256::from(6)));
        asserter.push_success(&encoded("USDC".to_string()));
        assert_eq!(
            amm.token_info(token).await.unwrap(),
            TokenInfo {
                address: token,
                symbol: "USDC".into(),
                decimals: 6,
            }
        );
    }

    #[tokio::test]
    async fn sending_requires_a_signer() {
        let (provider, _asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);

        let err = amm
            .approve(Address::repeat_byte(1), AMM, U256::from(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("private key"));
    }

    fn pair() -> TokenPair {
        crate::tokens::sort_token_addresses(Address::repeat_byte(2), Address::repeat_byte(1))
            .unwrap()
    }

    fn pool_created(emitter: Address, pool: Address) -> Log {
        let pair = pair();
        let event = IPoolFactory::IPoolFactory::PoolCreated {
            token0: pair.token0(),
            token1: pair.token1(),
            feeBps: U256::from(30),
            pool,
        };
        Log {
            inner: alloy::primitives::Log {
                address: emitter,
                data: event.encode_log_data(),
            },
            ..Default::default()
        }
    }

    fn mined(success: bool, logs: Vec<Log>) -> TransactionReceipt {
        let status = if success { "0x1" } else { "0x0" };
        serde_json::from_value(json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": logs,
            "logsBloom": format!("0x{}", "0".repeat(512)),
            "transactionHash": B256::repeat_byte(0xcc),
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0xbb),
            "blockNumber": "0x7",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x1",
            "from": Address::repeat_byte(0xab),
            "to": AMM,
            "contractAddress": null,
        }))
        .unwrap()
    }

    #[test]
    fn reverted_receipt_is_an_error() {
        let (provider, _asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);

        let pool = Address::repeat_byte(0x77);
        let err = amm
            .decode_receipt(&mined(false, vec![pool_created(AMM, pool)]))
            .unwrap_err();
        assert!(err.to_string().contains("reverted in block Some(7)"), "{err:?}");
    }

    #[test]
    fn decodes_pool_from_amm_event() {
        let (provider, _asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);
        let pool = Address::repeat_byte(0x77);

        let receipt = amm
            .decode_receipt(&mined(true, vec![pool_created(AMM, pool)]))
            .unwrap();
        assert_eq!(
            receipt,
            Receipt {
                tx_hash: B256::repeat_byte(0xcc),
                block_number: Some(7),
                gas_used: 21_000,
                pool: Some(pool),
            }
        );
    }

    #[test]
    fn ignores_pool_events_from_other_contracts() {
        let (provider, _asserter) = mock_provider();
        let amm = Amm::new(provider, AMM, None);
        let impostor = Address::repeat_byte(0x66);

        let receipt = amm
            .decode_receipt(&mined(
                true,
                vec![pool_created(impostor, Address::repeat_byte(0x77))],
            ))
            .unwrap();
        assert_eq!(receipt.pool, None);

        let receipt = amm.decode_receipt(&mined(true, vec![])).unwrap();
        assert_eq!(receipt.pool, None);
    }

    #[test]
    fn create_pool_calldata_uses_sorted_pair() {
        let amounts = TokenPair::sort_amounts(
            (Address::repeat_byte(2), U256::from(200)),
            (Address::repeat_byte(1), U256::from(100)),
        )
        .unwrap();
        let calldata = create_pool_call(&amounts, FeeBps::new(30).unwrap()).abi_encode();

        let decoded = IPoolFactory::IPoolFactory::createPoolCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.tokenA, Address::repeat_byte(1));
        assert_eq!(decoded.tokenB, Address::repeat_byte(2));
        assert_eq!(decoded.amountA, U256::from(100));
        assert_eq!(decoded.amountB, U256::from(200));
        assert_eq!(decoded.feeBps, U256::from(30));
        assert_eq!(
            calldata[..4],
            IPoolFactory::IPoolFactory::createPoolCall::SELECTOR
        );
    }

    #[test]
    fn approve_calldata() {
        let calldata = approve_call(AMM, U256::MAX).abi_encode();

        assert_eq!(calldata[..4], IERC20::IERC20::approveCall::SELECTOR);
        assert_eq!(&calldata[16..36], AMM.as_slice());
        assert_eq!(U256::from_be_slice(&calldata[36..68]), U256::MAX);
    }
}
