use {
    alloy::primitives::{
        U256,
        utils::{ParseUnits, format_units, parse_units},
    },
    std::{fmt, str::FromStr},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("invalid amount {0:?}")]
    Invalid(String),
    #[error("amount {input:?} cannot be represented with {decimals} decimals")]
    Precision { input: String, decimals: u8 },
    #[error("amount must be greater than zero")]
    Zero,
}

/// A deposit amount as entered by the user.
///
/// Decimal input is denominated in whole tokens and needs the token's
/// `decimals` to be turned into base units. Input with a `wei` suffix or a
/// `raw:` prefix is already in base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAmount {
    Units(String),
    Raw(U256),
}

impl TokenAmount {
    pub fn to_base_units(&self, decimals: u8) -> Result<U256, AmountError> {
        let amount = match self {
            Self::Raw(amount) => *amount,
            Self::Units(input) => {
                let exact = trim_fraction(input);
                let fractional_digits = exact.split_once('.').map_or(0, |(_, f)| f.len());
                if fractional_digits > usize::from(decimals) {
                    return Err(AmountError::Precision {
                        input: input.clone(),
                        decimals,
                    });
                }
                match parse_units(exact, decimals) {
                    Ok(ParseUnits::U256(amount)) => amount,
                    // Negative amounts are parsed into the signed variant.
                    Ok(ParseUnits::I256(_)) | Err(_) => {
                        return Err(AmountError::Invalid(input.clone()));
                    }
                }
            }
        };
        if amount.is_zero() {
            return Err(AmountError::Zero);
        }
        Ok(amount)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let raw = s
            .strip_prefix("raw:")
            .or_else(|| s.strip_suffix("wei"))
            .map(str::trim);
        if let Some(raw) = raw {
            return U256::from_str_radix(raw, 10)
                .map(Self::Raw)
                .map_err(|_| AmountError::Invalid(s.to_owned()));
        }

        let valid = !s.is_empty()
            && s.chars().all(|c| c.is_ascii_digit() || c == '.')
            && s.chars().filter(|c| *c == '.').count() <= 1
            && s != ".";
        if !valid {
            return Err(AmountError::Invalid(s.to_owned()));
        }
        Ok(Self::Units(s.to_owned()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Units(units) => f.write_str(units),
            Self::Raw(raw) => write!(f, "{raw}wei"),
        }
    }
}

/// Human readable representation of `amount` base units.
/// Drops trailing zeros of the fractional part, they do not add precision.
pub(crate) fn trim_fraction(input: &str) -> &str {
    if input.contains('.') {
        input.trim_end_matches('0').trim_end_matches('.')
    } else {
        input
    }
}

pub fn display_units(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| format!("{amount}wei"))
}
