use crate::core::{AggregatedRow, Granularity, ProjectionSummary};

const COLUMNS: [&str; 6] = [
    "Period",
    "Shares",
    "Net Dividends",
    "Reinvested",
    "DCA Added",
    "Taxes Owed",
];

/// Two decimals with comma thousands separators, e.g. `12,345.60`.
pub fn format_shares(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

pub fn format_money(value: f64) -> String {
    let formatted = format_shares(value);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${formatted}"),
    }
}

fn view_label(view: Granularity) -> &'static str {
    match view {
        Granularity::Monthly => "Monthly",
        Granularity::Yearly => "Yearly",
        Granularity::Total => "Total",
    }
}

pub fn render_report(
    summary: &ProjectionSummary,
    rows: &[AggregatedRow],
    view: Granularity,
) -> String {
    let mut lines = vec![
        format!("Final Share Count: {}", format_shares(summary.final_shares)),
        format!(
            "Total Dividends Collected: {}",
            format_money(summary.total_net_dividends)
        ),
        format!(
            "Total Reinvested: {}",
            format_money(summary.total_reinvested)
        ),
        format!("Total DCA Added: {}", format_money(summary.total_dca)),
        format!("Total Taxes Owed: {}", format_money(summary.total_taxes)),
        String::new(),
        format!("Projection Table ({})", view_label(view)),
        table_line(COLUMNS.map(String::from)),
    ];

    lines.extend(rows.iter().map(|row| {
        table_line([
            row.period.to_string(),
            format_shares(row.shares),
            format_money(row.net_dividends),
            format_money(row.reinvested),
            format_money(row.dca_added),
            format_money(row.taxes_owed),
        ])
    }));

    lines.join("\n")
}

fn table_line(cells: [String; 6]) -> String {
    let [period, shares, net, reinvested, dca, taxes] = cells;
    format!("{period:>8} {shares:>16} {net:>18} {reinvested:>18} {dca:>16} {taxes:>16}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;

    #[test]
    fn format_shares_groups_thousands() {
        assert_eq!(format_shares(0.0), "0.00");
        assert_eq!(format_shares(999.994), "999.99");
        assert_eq!(format_shares(1_234.5), "1,234.50");
        assert_eq!(format_shares(10_800.0), "10,800.00");
        assert_eq!(format_shares(1_234_567.891), "1,234,567.89");
    }

    #[test]
    fn format_shares_rounds_into_next_group() {
        assert_eq!(format_shares(999.999), "1,000.00");
    }

    #[test]
    fn format_money_prefixes_dollar_sign() {
        assert_eq!(format_money(20_000.0), "$20,000.00");
        assert_eq!(format_money(-5.0), "-$5.00");
        assert_eq!(format_money(-0.001), "$0.00");
    }

    #[test]
    fn render_report_lists_every_row() {
        let summary = ProjectionSummary {
            final_shares: 10_600.0,
            total_net_dividends: 15_000.0,
            total_reinvested: 15_000.0,
            total_dca: 0.0,
            total_taxes: 5_000.0,
        };
        let rows = [
            AggregatedRow {
                period: Period::Year(1),
                shares: 10_300.0,
                net_dividends: 7_000.0,
                reinvested: 7_000.0,
                dca_added: 0.0,
                taxes_owed: 2_500.0,
            },
            AggregatedRow {
                period: Period::Year(2),
                shares: 10_600.0,
                net_dividends: 8_000.0,
                reinvested: 8_000.0,
                dca_added: 0.0,
                taxes_owed: 2_500.0,
            },
        ];

        let report = render_report(&summary, &rows, Granularity::Yearly);
        assert!(report.contains("Final Share Count: 10,600.00"));
        assert!(report.contains("Total Taxes Owed: $5,000.00"));
        assert!(report.contains("Projection Table (Yearly)"));
        assert!(report.contains("Net Dividends"));
        assert!(report.contains("$8,000.00"));
        assert_eq!(report.lines().count(), 10);
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn render_report_aligns_table_columns() {
        let summary = ProjectionSummary::default();
        let rows = [AggregatedRow {
            period: Period::Total,
            shares: 1_234_567.0,
            net_dividends: 98_765.43,
            reinvested: 0.0,
            dca_added: 100.0,
            taxes_owed: 12.5,
        }];

        let report = render_report(&summary, &rows, Granularity::Total);
        let table: Vec<&str> = report.lines().skip(7).collect();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].len(), table[1].len());
        assert!(table[1].trim_start().starts_with("Total"));
    }
}
