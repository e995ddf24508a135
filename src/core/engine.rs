use tracing::debug;

use super::error::SimulationError;
use super::types::{
    AccountType, MonthRecord, PayoutMode, Projection, ProjectionSummary, SimulationConfig,
};

pub const MAX_HOLDING_MONTHS: u32 = 240;

#[derive(Debug, Clone, Copy)]
struct MonthFlow {
    tax: f64,
    net_dividend: f64,
    reinvested: f64,
    new_shares: f64,
}

#[derive(Debug, Default)]
struct RunningTotals {
    net_dividends: f64,
    reinvested: f64,
    dca: f64,
    taxes: f64,
}

impl RunningTotals {
    fn add(&mut self, record: &MonthRecord) {
        self.net_dividends += record.net_dividend;
        self.reinvested += record.reinvested;
        self.dca += record.dca_added;
        self.taxes += record.tax_owed;
    }

    fn into_summary(self, final_shares: f64) -> ProjectionSummary {
        ProjectionSummary {
            final_shares,
            total_net_dividends: self.net_dividends,
            total_reinvested: self.reinvested,
            total_dca: self.dca,
            total_taxes: self.taxes,
        }
    }
}

/// Year bucket of a 1-based month: months 1..=12 are year 1, 13..=24 year 2.
pub fn year_of_month(month: u32) -> u32 {
    month.div_ceil(12)
}

/// Checks every input before a single month is simulated.
pub fn validate(config: &SimulationConfig) -> Result<(), SimulationError> {
    non_negative("total_shares", config.total_shares)?;
    non_negative("avg_cost_basis", config.avg_cost_basis)?;
    non_negative(
        "avg_monthly_dividend_per_share",
        config.avg_monthly_dividend_per_share,
    )?;
    non_negative("monthly_dca", config.monthly_dca)?;

    if !(1..=MAX_HOLDING_MONTHS).contains(&config.holding_months) {
        return Err(SimulationError::invalid(
            "holding_months",
            format!("must be between 1 and {MAX_HOLDING_MONTHS}"),
        ));
    }

    percentage("federal_tax_rate", config.federal_tax_rate)?;
    percentage("state_tax_rate", config.state_tax_rate)?;
    if config.federal_tax_rate + config.state_tax_rate > 100.0 {
        return Err(SimulationError::invalid(
            "federal_tax_rate",
            "plus state tax rate must not exceed 100",
        ));
    }

    match config.payout {
        PayoutMode::Reinvest { percent } => percentage("reinvest_percent", percent)?,
        PayoutMode::Withdraw { monthly_amount } => {
            non_negative("monthly_withdrawal", monthly_amount)?
        }
    }

    if !config.reinvestment_share_price.is_finite() || config.reinvestment_share_price <= 0.0 {
        return Err(SimulationError::invalid(
            "reinvestment_share_price",
            "must be > 0",
        ));
    }

    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SimulationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::invalid(field, "must be a finite value >= 0"));
    }
    Ok(())
}

fn percentage(field: &'static str, value: f64) -> Result<(), SimulationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(SimulationError::invalid(field, "must be between 0 and 100"));
    }
    Ok(())
}

fn month_flow(config: &SimulationConfig, shares: f64) -> MonthFlow {
    let gross_dividend = shares * config.avg_monthly_dividend_per_share;
    let tax = match config.account_type {
        AccountType::TaxDeferred => 0.0,
        AccountType::Taxable => {
            gross_dividend * (config.federal_tax_rate + config.state_tax_rate) / 100.0
        }
    };
    let net_dividend = gross_dividend - tax;

    // Withdraw mode reinvests whatever the target payout leaves behind.
    let reinvested = match config.payout {
        PayoutMode::Reinvest { percent } => net_dividend * percent / 100.0,
        PayoutMode::Withdraw { monthly_amount } => (net_dividend - monthly_amount).max(0.0),
    };
    let new_shares = (reinvested + config.monthly_dca) / config.reinvestment_share_price;

    MonthFlow {
        tax,
        net_dividend,
        reinvested,
        new_shares,
    }
}

/// Runs the month-by-month fold and keeps the running totals alongside the
/// emitted records.
pub fn run_projection(config: &SimulationConfig) -> Result<Projection, SimulationError> {
    validate(config)?;
    debug!(
        holding_months = config.holding_months,
        total_shares = config.total_shares,
        payout = ?config.payout,
        account_type = ?config.account_type,
        "running dividend projection"
    );

    let mut shares = config.total_shares;
    let mut totals = RunningTotals::default();
    let mut months = Vec::with_capacity(config.holding_months as usize);

    for month in 1..=config.holding_months {
        let flow = month_flow(config, shares);
        shares += flow.new_shares;
        if !shares.is_finite() || !flow.net_dividend.is_finite() || !flow.tax.is_finite() {
            return Err(SimulationError::invalid(
                "total_shares",
                format!("projection overflows f64 in month {month}"),
            ));
        }

        let record = MonthRecord {
            month,
            year: year_of_month(month),
            shares,
            net_dividend: flow.net_dividend,
            reinvested: flow.reinvested,
            dca_added: config.monthly_dca,
            tax_owed: flow.tax,
        };
        totals.add(&record);
        months.push(record);
    }

    let summary = totals.into_summary(shares);
    debug!(
        final_shares = summary.final_shares,
        total_net_dividends = summary.total_net_dividends,
        "projection finished"
    );
    Ok(Projection { months, summary })
}

pub fn simulate(config: &SimulationConfig) -> Result<Vec<MonthRecord>, SimulationError> {
    run_projection(config).map(|projection| projection.months)
}
