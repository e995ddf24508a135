use super::error::SimulationError;
use super::types::{AggregatedRow, Granularity, MonthRecord, Period, ProjectionSummary};

/// Re-buckets month records into reporting rows.
///
/// Yearly groups follow each record's own `year` field, so a run that stops
/// mid-year ends with a short final group. `Total` needs at least one record
/// to know the closing share count.
pub fn aggregate(
    records: &[MonthRecord],
    granularity: Granularity,
) -> Result<Vec<AggregatedRow>, SimulationError> {
    match granularity {
        Granularity::Monthly => Ok(records
            .iter()
            .map(|record| AggregatedRow {
                period: Period::Month(record.month),
                shares: record.shares,
                net_dividends: record.net_dividend,
                reinvested: record.reinvested,
                dca_added: record.dca_added,
                taxes_owed: record.tax_owed,
            })
            .collect()),
        Granularity::Yearly => Ok(records
            .chunk_by(|a, b| a.year == b.year)
            .filter_map(|group| fold_group(Period::Year(group[0].year), group))
            .collect()),
        Granularity::Total => fold_group(Period::Total, records)
            .map(|row| vec![row])
            .ok_or(SimulationError::EmptyAggregationInput),
    }
}

/// Closing shares and running sums over the whole sequence.
pub fn summarize(records: &[MonthRecord]) -> Result<ProjectionSummary, SimulationError> {
    let row = fold_group(Period::Total, records).ok_or(SimulationError::EmptyAggregationInput)?;
    Ok(ProjectionSummary {
        final_shares: row.shares,
        total_net_dividends: row.net_dividends,
        total_reinvested: row.reinvested,
        total_dca: row.dca_added,
        total_taxes: row.taxes_owed,
    })
}

fn fold_group(period: Period, group: &[MonthRecord]) -> Option<AggregatedRow> {
    let last = group.last()?;
    let mut row = AggregatedRow {
        period,
        shares: last.shares,
        net_dividends: 0.0,
        reinvested: 0.0,
        dca_added: 0.0,
        taxes_owed: 0.0,
    };
    for record in group {
        row.net_dividends += record.net_dividend;
        row.reinvested += record.reinvested;
        row.dca_added += record.dca_added;
        row.taxes_owed += record.tax_owed;
    }
    Some(row)
}
