use analytics::{MetricsBundle, VarSet};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use stress::StressReport;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

pub fn metrics_table(bundle: &MetricsBundle) -> Table {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec!["Observations".to_string(), bundle.observations.to_string()]);
    table.add_row(vec!["Annual return".to_string(), pct(bundle.annual_return)]);
    table.add_row(vec!["Daily volatility".to_string(), pct(bundle.daily_volatility)]);
    table.add_row(vec!["Annual volatility".to_string(), pct(bundle.annual_volatility)]);
    table.add_row(vec!["Sharpe ratio".to_string(), num(bundle.sharpe_ratio)]);
    table.add_row(vec!["Max drawdown".to_string(), pct(bundle.max_drawdown)]);
    table.add_row(vec!["Beta".to_string(), num(bundle.beta)]);

    let daily = bundle.var.map(|v| v.daily);
    let annual = bundle.var.map(|v| v.annual);
    let rows: [(&str, fn(&VarSet) -> f64); 4] = [
        ("Historical VaR 95%", |v| v.historical_95),
        ("Historical VaR 99%", |v| v.historical_99),
        ("Parametric VaR 95%", |v| v.parametric_95),
        ("Parametric VaR 99%", |v| v.parametric_99),
    ];
    for (label, pick) in rows {
        table.add_row(vec![
            format!("{label} (daily)"),
            pct(daily.as_ref().map(pick)),
        ]);
        table.add_row(vec![
            format!("{label} (annual)"),
            pct(annual.as_ref().map(pick)),
        ]);
    }

    for issue in &bundle.unavailable {
        table.add_row(vec![format!("{} unavailable", issue.metric), issue.reason.clone()]);
    }
    table
}

pub fn correlation_table(bundle: &MetricsBundle) -> Option<Table> {
    let matrix = bundle.correlation_matrix.as_ref()?;
    let assets: Vec<&str> = matrix.assets().collect();
    let mut header = vec![""];
    header.extend(assets.iter().copied());
    let mut table = new_table(header);
    for a in &assets {
        let mut row = vec![a.to_string()];
        row.extend(assets.iter().map(|b| num(matrix.get(a, b))));
        table.add_row(row);
    }
    Some(table)
}

pub fn stress_table(report: &StressReport) -> Table {
    let mut table = new_table(vec![
        "Period",
        "Window",
        "Days",
        "Total return",
        "Max drawdown",
        "Worst day",
    ]);
    for result in report.periods.values() {
        let worst = result.worst_day.map_or_else(
            || "n/a".to_string(),
            |w| format!("{} ({:.2}%)", w.date, w.return_pct),
        );
        table.add_row(vec![
            result.period.name.clone(),
            format!("{} .. {}", result.period.start_date, result.period.end_date),
            result.trading_days.to_string(),
            format!("{:.2}%", result.total_return_pct),
            format!("{:.2}%", result.max_drawdown_pct),
            worst,
        ]);
    }

    let overall = &report.worst_day_overall;
    table.add_row(vec![
        "Worst day overall".to_string(),
        overall.worst_day_date.to_string(),
        "1".to_string(),
        format!("{:.2}%", overall.worst_day_return_pct),
        String::new(),
        format!(
            "{} -> {:.2}",
            num(overall.portfolio_value_before),
            overall.portfolio_value_after
        ),
    ]);
    table
}
