//! Token address handling.
//!
//! Pools are keyed by an *ordered* token pair: the token with the lower
//! 160-bit value always comes first. Anything that builds a pool goes through
//! [`sort_token_addresses`] so the same two tokens always map to the same
//! pair, no matter which order the user supplied them in.

use {
    alloy::primitives::{Address, U256},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

const ADDRESS_HEX_LEN: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address {0:?} is missing the 0x prefix")]
    MissingPrefix(String),
    #[error("address {0:?} has {1} hex digits, expected 40")]
    InvalidLength(String, usize),
    #[error("address {0:?} contains non-hex characters")]
    InvalidHex(String),
    #[error("address {0:?} does not match its EIP-55 checksum")]
    InvalidChecksum(String),
    #[error("the zero address is not a token")]
    ZeroAddress,
    #[error("both tokens are the same address {0}")]
    IdenticalAddresses(Address),
}

/// Validates a user supplied address and returns it in canonical form.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are accepted
/// as long as they are well formed. Mixed-case inputs must be a correct
/// EIP-55 checksum.
pub fn normalize_address(input: &str) -> Result<Address, AddressError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AddressError::MissingPrefix(trimmed.to_owned()))?;
    if hex.len() != ADDRESS_HEX_LEN {
        return Err(AddressError::InvalidLength(trimmed.to_owned(), hex.len()));
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex(trimmed.to_owned()));
    }

    let address =
        Address::from_str(hex).map_err(|_| AddressError::InvalidHex(trimmed.to_owned()))?;

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && checksummed(&address)[2..] != *hex {
        return Err(AddressError::InvalidChecksum(trimmed.to_owned()));
    }

    Ok(address)
}

/// EIP-55 representation of an address.
pub fn checksummed(address: &Address) -> String {
    address.to_checksum(None)
}

/// Orders two token addresses so that the lower one comes first.
pub fn sort_token_addresses(a: Address, b: Address) -> Result<TokenPair, AddressError> {
    if a == b {
        return Err(AddressError::IdenticalAddresses(a));
    }
    if a.is_zero() || b.is_zero() {
        return Err(AddressError::ZeroAddress);
    }
    let (token0, token1) = if a < b { (a, b) } else { (b, a) };
    Ok(TokenPair { token0, token1 })
}

/// Like [`sort_token_addresses`] but for raw user input.
pub fn sort_token_strings(a: &str, b: &str) -> Result<TokenPair, AddressError> {
    sort_token_addresses(normalize_address(a)?, normalize_address(b)?)
}

/// Two distinct tokens in canonical order (`token0 < token1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPair {
    token0: Address,
    token1: Address,
}

impl TokenPair {
    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.token0 == *token || self.token1 == *token
    }

    /// Returns the counterpart of `token` if it is part of the pair.
    pub fn other(&self, token: &Address) -> Option<Address> {
        if self.token0 == *token {
            Some(self.token1)
        } else if self.token1 == *token {
            Some(self.token0)
        } else {
            None
        }
    }

    /// Sorts two `(token, amount)` entries. Each amount stays with its token.
    pub fn sort_amounts(
        a: (Address, U256),
        b: (Address, U256),
    ) -> Result<PairedAmounts, AddressError> {
        let pair = sort_token_addresses(a.0, b.0)?;
        let (amount0, amount1) = if pair.token0 == a.0 {
            (a.1, b.1)
        } else {
            (b.1, a.1)
        };
        Ok(PairedAmounts {
            pair,
            amount0,
            amount1,
        })
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}

/// A token pair together with the deposit for each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairedAmounts {
    pub pair: TokenPair,
    pub amount0: U256,
    pub amount1: U256,
}

impl PairedAmounts {
    /// `(token, amount)` entries in pair order.
    pub fn entries(&self) -> [(Address, U256); 2] {
        [
            (self.pair.token0, self.amount0),
            (self.pair.token1, self.amount1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    const CHECKSUMMED: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn normalizes_lower_and_upper_case() {
        let expected = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        for input in [
            CHECKSUMMED,
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED",
            "  0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed\n",
            "0X5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
        ] {
            let normalized = normalize_address(input).unwrap();
            assert_eq!(normalized, expected);
            assert_eq!(checksummed(&normalized), CHECKSUMMED);
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(matches!(
            normalize_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            Err(AddressError::MissingPrefix(_))
        ));
        assert!(matches!(
            normalize_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea"),
            Err(AddressError::InvalidLength(_, 38))
        ));
        assert!(matches!(
            normalize_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaedaa"),
            Err(AddressError::InvalidLength(_, 42))
        ));
        assert!(matches!(
            normalize_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaeg"),
            Err(AddressError::InvalidHex(_))
        ));
        assert!(matches!(normalize_address(""), Err(AddressError::MissingPrefix(_))));
    }

    #[test]
    fn rejects_bad_checksum() {
        assert_eq!(
            normalize_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            Err(AddressError::InvalidChecksum(
                "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD".to_owned()
            ))
        );
    }

    #[test]
    fn sorting_is_symmetric() {
        let low = address!("0x1111111111111111111111111111111111111111");
        let high = address!("0xf000000000000000000000000000000000000000");

        let forward = sort_token_addresses(low, high).unwrap();
        let backward = sort_token_addresses(high, low).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.token0(), low);
        assert_eq!(forward.token1(), high);
        assert_eq!(forward.other(&low), Some(high));
        assert_eq!(forward.other(&Address::repeat_byte(0x22)), None);
        assert!(forward.contains(&high));
    }

    #[test]
    fn sorting_ignores_case() {
        let a = sort_token_strings(
            "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        )
        .unwrap();
        let b = sort_token_strings(
            "0xFB6916095CA1DF60BB79CE92CE3EA74C37C5D359",
            CHECKSUMMED,
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(checksummed(&a.token0()), CHECKSUMMED);
    }

    #[test]
    fn rejects_identical_and_zero_addresses() {
        let token = Address::repeat_byte(0x42);
        assert_eq!(
            sort_token_addresses(token, token),
            Err(AddressError::IdenticalAddresses(token))
        );
        assert_eq!(
            sort_token_strings(
                "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
                "0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED"
            ),
            Err(AddressError::IdenticalAddresses(
                normalize_address(CHECKSUMMED).unwrap()
            ))
        );
        assert_eq!(
            sort_token_addresses(Address::ZERO, token),
            Err(AddressError::ZeroAddress)
        );
    }

    #[test]
    fn amounts_follow_their_tokens() {
        let low = Address::repeat_byte(0x01);
        let high = Address::repeat_byte(0x02);

        let sorted =
            TokenPair::sort_amounts((high, U256::from(7)), (low, U256::from(3))).unwrap();
        assert_eq!(sorted.pair.token0(), low);
        assert_eq!(sorted.amount0, U256::from(3));
        assert_eq!(sorted.amount1, U256::from(7));
        assert_eq!(
            sorted.entries(),
            [(low, U256::from(3)), (high, U256::from(7))]
        );

        let unchanged =
            TokenPair::sort_amounts((low, U256::from(3)), (high, U256::from(7))).unwrap();
        assert_eq!(sorted, unchanged);
    }
}
