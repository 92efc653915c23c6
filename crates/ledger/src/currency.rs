use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO currency code attached to an account and its money values.
///
/// Amounts are stored as an `i64` number of **minor units** (see `Money`).
/// `minor_units()` tells how many decimal digits separate major from minor
/// units: ZAR has 2, so `R 10.50` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Zar,
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Zar => "ZAR",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Symbol used when rendering amounts for humans.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Zar => "R",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Zar | Currency::Eur | Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ZAR" => Ok(Currency::Zar),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(LedgerError::Validation(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
