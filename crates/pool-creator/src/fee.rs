use {
    crate::amount::trim_fraction,
    alloy::primitives::{
        U256,
        utils::{ParseUnits, parse_units},
    },
    std::{fmt, future::Future, str::FromStr},
    thiserror::Error,
};

/// 100% expressed in basis points.
pub const MAX_FEE_BPS: u16 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error("fee of {0} bps is outside of the valid range 1..=10000")]
    OutOfRange(U256),
    #[error("unknown fee tier {0:?}")]
    Unknown(String),
}

/// Swap fee charged by a pool in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeBps(u16);

impl FeeBps {
    pub fn new(bps: u64) -> Result<Self, FeeError> {
        Self::try_from(U256::from(bps))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn as_percentage(self) -> f64 {
        f64::from(self.0) / 100.
    }
}

impl TryFrom<U256> for FeeBps {
    type Error = FeeError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        match u16::try_from(value) {
            Ok(bps) if (1..=MAX_FEE_BPS).contains(&bps) => Ok(Self(bps)),
            _ => Err(FeeError::OutOfRange(value)),
        }
    }
}

impl From<FeeBps> for U256 {
    fn from(value: FeeBps) -> Self {
        U256::from(value.0)
    }
}

impl fmt::Display for FeeBps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bps ({}%)", self.0, self.as_percentage())
    }
}

/// Fee tier picked by the user when creating a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeTier {
    /// Use whatever the AMM contract reports as its default fee.
    #[default]
    Default,
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
    Custom(FeeBps),
}

impl FeeTier {
    /// The fixed fee of this tier, `None` for [`FeeTier::Default`].
    pub fn fixed(self) -> Option<FeeBps> {
        match self {
            Self::Default => None,
            Self::Lowest => Some(FeeBps(1)),
            Self::Low => Some(FeeBps(5)),
            Self::Medium => Some(FeeBps(30)),
            Self::High => Some(FeeBps(100)),
            Self::Custom(fee) => Some(fee),
        }
    }

    /// Returns the tier's fee, only calling `default` when the tier defers to
    /// the contract.
    pub async fn resolve<F, Fut, E>(self, default: F) -> Result<FeeBps, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FeeBps, E>>,
    {
        match self.fixed() {
            Some(fee) => Ok(fee),
            None => default().await,
        }
    }
}

impl FromStr for FeeTier {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "default" => return Ok(Self::Default),
            "lowest" => return Ok(Self::Lowest),
            "low" => return Ok(Self::Low),
            "medium" => return Ok(Self::Medium),
            "high" => return Ok(Self::High),
            _ => (),
        }

        if let Some(percentage) = s.strip_suffix('%') {
            let percentage = trim_fraction(percentage.trim());
            let unknown = || FeeError::Unknown(s.to_owned());
            // 1 bps is 0.01%, so two fractional digits is the finest
            // representable fee.
            let fractional_digits = percentage.split_once('.').map_or(0, |(_, f)| f.len());
            if percentage.is_empty() || fractional_digits > 2 {
                return Err(unknown());
            }
            let bps = match parse_units(percentage, 2) {
                Ok(ParseUnits::U256(bps)) => bps,
                Ok(ParseUnits::I256(_)) | Err(_) => return Err(unknown()),
            };
            return FeeBps::try_from(bps).map(Self::Custom);
        }

        let bps: u64 = s.parse().map_err(|_| FeeError::Unknown(s.to_owned()))?;
        FeeBps::new(bps).map(Self::Custom)
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed() {
            Some(fee) => write!(f, "{fee}"),
            None => f.write_str("contract default"),
        }
    }
}
