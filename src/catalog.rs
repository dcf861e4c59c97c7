//! The compiled-in catalog of prepaid credit packages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PayboxError;

/// Identifier of a credit package. Serializes as the lowercase key the
/// create-transaction endpoint expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKey {
    #[default]
    Starter,
    Pro,
    Business,
}

/// One entry of the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    pub key: PlanKey,
    /// Display name shown in the selector.
    pub name: &'static str,
    /// Price in cents, kept exact.
    pub price_cents: u32,
}

/// Every plan offered to the user, in display order.
pub static PRICING: [Plan; 3] = [
    Plan {
        key: PlanKey::Starter,
        name: "Starter pack",
        price_cents: 10_00,
    },
    Plan {
        key: PlanKey::Pro,
        name: "Pro pack",
        price_cents: 25_00,
    },
    Plan {
        key: PlanKey::Business,
        name: "Business pack",
        price_cents: 50_00,
    },
];

impl PlanKey {
    /// The wire/DOM form of the key.
    pub fn as_str(self) -> &'static str {
        match self {
            PlanKey::Starter => "starter",
            PlanKey::Pro => "pro",
            PlanKey::Business => "business",
        }
    }

    /// Catalog entry for this key.
    pub fn plan(self) -> &'static Plan {
        // PRICING is indexed in declaration order of the enum
        &PRICING[self as usize]
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanKey {
    type Err = PayboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PRICING
            .iter()
            .map(|plan| plan.key)
            .find(|key| key.as_str() == s)
            .ok_or_else(|| PayboxError::UnknownPlan(s.to_string()))
    }
}

impl Plan {
    /// Price as a decimal amount, e.g. `10.0` for 1000 cents.
    pub fn price(&self) -> f64 {
        f64::from(self.price_cents) / 100.0
    }

    /// `$10.00`
    pub fn display_price(&self) -> String {
        format!("${}.{:02}", self.price_cents / 100, self.price_cents % 100)
    }

    /// Selector label, e.g. `Starter pack – $10.00`.
    pub fn label(&self) -> String {
        format!("{} – {}", self.name, self.display_price())
    }
}
