use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PlanType {
    DigitalExplorer,
    PrintEdition,
}

impl PlanType {
    pub fn product_title(&self) -> &'static str {
        match self {
            PlanType::DigitalExplorer => "Digital Explorer Annual Subscription",
            PlanType::PrintEdition => "Print Edition Annual Subscription",
        }
    }

    /// Only the print edition ships a physical magazine.
    pub fn requires_shipping(&self) -> bool {
        matches!(self, PlanType::PrintEdition)
    }

    /// Amount in paise used when the payment event carries no usable amount.
    pub fn fallback_amount_minor(&self) -> i64 {
        match self {
            PlanType::DigitalExplorer => 150_000,
            PlanType::PrintEdition => 240_000,
        }
    }
}

impl Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let plan_type = match self {
            PlanType::DigitalExplorer => "Digital Explorer",
            PlanType::PrintEdition => "Print Edition",
        };
        write!(f, "{}", plan_type)
    }
}

/// Buyer details extracted from a verified payment event. Immutable input to
/// the reconciliation workflow; `phone` stays free-form here and is only sent
/// onward through `phones::format_phone_for_storefront`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyerData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan_type: PlanType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

impl BuyerData {
    pub fn first_name(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or(&self.name)
            .to_string()
    }

    pub fn last_name(&self) -> String {
        self.name
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
