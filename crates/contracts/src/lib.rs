//! Bindings for the onchain contracts the pool creator talks to.

/// Generates `alloy` bindings for a Solidity interface.
///
/// The generated items live in a private module and get re-exported from a
/// public module of the same name as the interface, next to an `Instance`
/// alias bound to the type erased provider.
#[macro_export]
macro_rules! bindings {
    ($contract:ident { $($body:tt)* }) => {
        paste::paste! {
            #[allow(non_snake_case)]
            mod [<$contract Private>] {
                alloy::sol! {
                    #[allow(missing_docs)]
                    #[sol(rpc)]
                    interface $contract {
                        $($body)*
                    }
                }
            }

            #[allow(non_snake_case)]
            pub mod $contract {
                use alloy::providers::DynProvider;

                pub use super::[<$contract Private>]::*;
                pub type Instance = $contract::[<$contract Instance>]<DynProvider>;
            }
        }
    };
}

bindings!(IPoolFactory {
    event PoolCreated(
        address indexed token0,
        address indexed token1,
        uint256 feeBps,
        address pool
    );

    function defaultFeeBps() external view returns (uint256);

    function getPool(address tokenA, address tokenB, uint256 feeBps)
        external
        view
        returns (address);

    function createPool(
        address tokenA,
        address tokenB,
        uint256 amountA,
        uint256 amountB,
        uint256 feeBps
    ) external returns (address pool);
});

bindings!(IERC20 {
    function decimals() external view returns (uint8);
    function symbol() external view returns (string);
    function balanceOf(address owner) external view returns (uint256);
    function allowance(address owner, address spender) external view returns (uint256);
    function approve(address spender, uint256 amount) external returns (bool);
});

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{Address, U256, keccak256},
            sol_types::{SolCall, SolEvent},
        },
    };

    fn selector(signature: &str) -> [u8; 4] {
        keccak256(signature.as_bytes())[..4].try_into().unwrap()
    }

    #[test]
    fn pool_factory_selectors() {
        assert_eq!(
            IPoolFactory::IPoolFactory::defaultFeeBpsCall::SELECTOR,
            selector("defaultFeeBps()")
        );
        assert_eq!(
            IPoolFactory::IPoolFactory::createPoolCall::SELECTOR,
            selector("createPool(address,address,uint256,uint256,uint256)")
        );
        assert_eq!(
            IPoolFactory::IPoolFactory::PoolCreated::SIGNATURE_HASH,
            keccak256("PoolCreated(address,address,uint256,address)")
        );
    }

    #[test]
    fn create_pool_calldata_keeps_argument_order() {
        let token_a = Address::repeat_byte(0x01);
        let token_b = Address::repeat_byte(0x02);
        let call = IPoolFactory::IPoolFactory::createPoolCall {
            tokenA: token_a,
            tokenB: token_b,
            amountA: U256::from(10),
            amountB: U256::from(20),
            feeBps: U256::from(30),
        };
        let calldata = call.abi_encode();

        assert_eq!(calldata.len(), 4 + 5 * 32);
        assert_eq!(&calldata[16..36], token_a.as_slice());
        assert_eq!(&calldata[48..68], token_b.as_slice());
        assert_eq!(U256::from_be_slice(&calldata[132..164]), U256::from(30));
    }

    #[test]
    fn erc20_approve_selector() {
        assert_eq!(
            IERC20::IERC20::approveCall::SELECTOR,
            selector("approve(address,uint256)")
        );
    }
}
