use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccountType {
    Taxable,
    TaxDeferred,
}

/// What happens to the net dividend each month.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PayoutMode {
    /// Reinvest `percent` (0-100) of the net dividend.
    Reinvest { percent: f64 },
    /// Pay out up to `monthly_amount`; anything above it is reinvested.
    Withdraw { monthly_amount: f64 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Granularity {
    Monthly,
    Yearly,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub total_shares: f64,
    pub avg_cost_basis: f64,
    pub holding_months: u32,
    pub avg_monthly_dividend_per_share: f64,
    pub federal_tax_rate: f64,
    pub state_tax_rate: f64,
    pub account_type: AccountType,
    pub payout: PayoutMode,
    pub reinvestment_share_price: f64,
    pub monthly_dca: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRecord {
    pub month: u32,
    pub year: u32,
    pub shares: f64,
    pub net_dividend: f64,
    pub reinvested: f64,
    pub dca_added: f64,
    pub tax_owed: f64,
}

/// Label of a reporting row. Serializes as a bare number, or `"Total"`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Period {
    Month(u32),
    Year(u32),
    Total,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month(n) | Period::Year(n) => write!(f, "{n}"),
            Period::Total => f.write_str("Total"),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Period::Month(n) | Period::Year(n) => serializer.serialize_u32(*n),
            Period::Total => serializer.serialize_str("Total"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    pub period: Period,
    pub shares: f64,
    pub net_dividends: f64,
    pub reinvested: f64,
    pub dca_added: f64,
    pub taxes_owed: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub final_shares: f64,
    pub total_net_dividends: f64,
    pub total_reinvested: f64,
    pub total_dca: f64,
    pub total_taxes: f64,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub months: Vec<MonthRecord>,
    pub summary: ProjectionSummary,
}
