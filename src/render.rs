//! Terminal presentation of a `BatchReport`.

use analytics::{BatchReport, Diversification};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, ContentArrangement, Table};

const NOT_AVAILABLE: &str = "N/A";

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn ratio(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.3}"))
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

fn new_table(header: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn align_numbers(table: &mut Table) {
    let columns = table.column_count();
    for index in 1..columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn metrics_table(report: &BatchReport, benchmark: Option<&str>) -> Table {
    let mut header: Vec<String> = [
        "Symbol",
        "Days",
        "Ann. Return",
        "Ann. Volatility",
        "Sharpe",
        "Sortino",
        "Downside Dev.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let bench = benchmark.unwrap_or("benchmark");
    header.push(format!("Beta vs {bench}"));
    header.push(format!("Alpha vs {bench}"));
    header.push("Final Value".to_string());

    let mut table = new_table(header);
    for symbol in &report.assets {
        let m = &report.metrics[symbol];
        let final_value = report
            .projection
            .values
            .get(symbol)
            .and_then(|values| values.last())
            .map(|p| p.value);
        table.add_row(vec![
            symbol.clone(),
            m.observations.to_string(),
            percent(m.annualized_return),
            percent(m.annualized_volatility),
            ratio(m.sharpe),
            ratio(m.sortino),
            percent(m.downside_deviation),
            ratio(m.beta),
            percent(m.alpha),
            money(final_value),
        ]);
    }
    align_numbers(&mut table);
    table
}

pub fn correlation_table(report: &BatchReport) -> Table {
    let matrix = &report.correlation;
    let mut header = vec![String::new()];
    header.extend(matrix.assets.iter().cloned());

    let mut table = new_table(header);
    for (symbol, row) in matrix.assets.iter().zip(&matrix.values) {
        let mut cells = vec![symbol.clone()];
        cells.extend(row.iter().map(|v| ratio(*v)));
        table.add_row(cells);
    }
    align_numbers(&mut table);
    table
}

pub fn summary_table(report: &BatchReport) -> Table {
    let summary = &report.summary;
    let leader = |l: &Option<analytics::Leader>| match l {
        Some(l) => format!("{} ({})", l.symbol, percent(Some(l.value))),
        None => NOT_AVAILABLE.to_string(),
    };
    let diversification = match report.diversification {
        Some(Diversification::HighlyCorrelated) => "Highly correlated, limited diversification",
        Some(Diversification::ModeratelyCorrelated) => "Moderately correlated",
        Some(Diversification::Diversifying) => "Good diversification potential",
        None => NOT_AVAILABLE,
    };

    let mut table = new_table(vec!["Summary".to_string(), String::new()]);
    table.add_row(vec!["Best annual return".to_string(), leader(&summary.best_annual_return)]);
    table.add_row(vec![
        "Lowest annual volatility".to_string(),
        leader(&summary.lowest_annual_volatility),
    ]);
    table.add_row(vec!["Average Sharpe".to_string(), ratio(summary.average_sharpe)]);
    table.add_row(vec![
        "Average correlation".to_string(),
        ratio(report.average_correlation),
    ]);
    table.add_row(vec!["Diversification".to_string(), diversification.to_string()]);
    table.add_row(vec![
        "Principal per asset".to_string(),
        money(Some(report.projection.principal)),
    ]);
    table
}

pub fn simulation_table(report: &BatchReport) -> Table {
    let mut table = new_table(
        ["Symbol", "Last Price", "Paths", "Horizon", "Mean", "5th pct", "95th pct"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for (symbol, sim) in &report.simulations {
        let terminal = sim.terminal_summary();
        table.add_row(vec![
            symbol.clone(),
            money(Some(sim.last_price)),
            sim.paths.len().to_string(),
            sim.horizon_days.to_string(),
            money(terminal.map(|t| t.mean)),
            money(terminal.map(|t| t.p05)),
            money(terminal.map(|t| t.p95)),
        ]);
    }
    align_numbers(&mut table);
    table
}

pub fn failures_table(report: &BatchReport) -> Table {
    let mut table = new_table(vec!["Skipped symbol".to_string(), "Reason".to_string()]);
    for failure in &report.failures {
        table.add_row(vec![failure.symbol.clone(), failure.reason.clone()]);
    }
    if let Some(failure) = &report.benchmark_failure {
        table.add_row(vec![
            format!("{} (benchmark)", failure.symbol),
            format!("{}; beta and alpha not computed", failure.reason),
        ]);
    }
    table
}

/// Prints every section of the report that has content.
pub fn print_report(report: &BatchReport, benchmark: Option<&str>) {
    println!("Risk and return\n{}", metrics_table(report, benchmark));
    println!("\nCorrelation of daily returns\n{}", correlation_table(report));
    println!("\n{}", summary_table(report));
    if !report.simulations.is_empty() {
        println!("\nMonte Carlo terminal prices\n{}", simulation_table(report));
    }
    if !report.failures.is_empty() || report.benchmark_failure.is_some() {
        println!("\n{}", failures_table(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_values_render_as_not_available() {
        assert_eq!(percent(None), "N/A");
        assert_eq!(ratio(None), "N/A");
        assert_eq!(percent(Some(0.1234)), "12.34%");
        assert_eq!(ratio(Some(1.5)), "1.500");
    }
}
