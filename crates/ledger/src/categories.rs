//! Closed vocabularies stored as strings in the database.
//!
//! Each enum round-trips through `as_str()` / `TryFrom<&str>` so the column
//! values stay stable even if variant names change.

use serde::{Deserialize, Serialize};

use crate::LedgerError;

macro_rules! str_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = LedgerError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($value => Ok(Self::$variant),)+
                    other => Err(LedgerError::Validation(format!(
                        concat!("invalid ", $label, ": {}"),
                        other
                    ))),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::try_from(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use str_enum;

str_enum! {
    /// Area of life an account, transaction or goal belongs to.
    ///
    /// Accounts use it as their type.
    LifeCategory, "life category" {
        Personal => "personal",
        Work => "work",
        TechBusiness => "tech_business",
        BrandBusiness => "brand_business",
    }
}

impl LifeCategory {
    /// Business lines whose income counts as revenue.
    #[must_use]
    pub fn is_business(self) -> bool {
        matches!(self, Self::TechBusiness | Self::BrandBusiness)
    }
}

str_enum! {
    /// What kind of place an account is.
    AccountCategory, "account category" {
        Checking => "checking",
        Savings => "savings",
        Investment => "investment",
        Debt => "debt",
    }
}

str_enum! {
    TransactionCategory, "transaction category" {
        Income => "income",
        Expense => "expense",
        Transfer => "transfer",
        Investment => "investment",
        Adjustment => "adjustment",
    }
}

str_enum! {
    /// Informational recurrence marker. The ledger never schedules anything from it.
    Recurrence, "recurrence" {
        Weekly => "weekly",
        Monthly => "monthly",
        Yearly => "yearly",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_storage_strings() {
        for category in LifeCategory::ALL {
            assert_eq!(LifeCategory::try_from(category.as_str()).unwrap(), *category);
        }
        for category in TransactionCategory::ALL {
            assert_eq!(
                category.as_str().parse::<TransactionCategory>().unwrap(),
                *category
            );
        }
    }

    #[test]
    fn rejects_unknown_values() {
        let err = AccountCategory::try_from("crypto").unwrap_err();
        assert_eq!(
            err,
            LedgerError::Validation("invalid account category: crypto".to_string())
        );
    }

    #[test]
    fn only_business_lines_count_as_revenue() {
        assert!(LifeCategory::TechBusiness.is_business());
        assert!(LifeCategory::BrandBusiness.is_business());
        assert!(!LifeCategory::Personal.is_business());
        assert!(!LifeCategory::Work.is_business());
    }
}
