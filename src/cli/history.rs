use super::ui;
use crate::core::currency::normalize_code;
use crate::core::{HistoryPoint, RateChange, RateSession};
use anyhow::{Result, anyhow};
use comfy_table::{Cell, Table};

#[derive(Debug, Clone, PartialEq)]
struct HistorySummary {
    low: HistoryPoint,
    high: HistoryPoint,
    change: RateChange,
}

fn summarize(points: &[HistoryPoint]) -> Option<HistorySummary> {
    let first = points.first()?;
    let last = points.last()?;
    let low = points.iter().copied().min_by(|a, b| a.rate.total_cmp(&b.rate))?;
    let high = points.iter().copied().max_by(|a, b| a.rate.total_cmp(&b.rate))?;
    Some(HistorySummary {
        low,
        high,
        change: RateChange::between(last.rate, first.rate),
    })
}

pub async fn run(session: &RateSession, base: Option<&str>, target: &str, days: u32) -> Result<()> {
    let base = match base {
        Some(code) => normalize_code(code).ok_or_else(|| anyhow!("Invalid currency code: {code}"))?,
        None => session.base_currency().await,
    };
    let target =
        normalize_code(target).ok_or_else(|| anyhow!("Invalid currency code: {target}"))?;

    let pb = ui::new_spinner(&format!("Fetching {days} days of {base}/{target}"));
    let loaded = session.fetch_history(&base, &target, days).await;
    pb.finish_and_clear();

    if !loaded {
        return Err(anyhow!("No history available for {base}/{target}"));
    }

    let points = session.history().await;
    println!(
        "\n{}",
        ui::style_text(&format!("{base}/{target}, last {days} days"), ui::StyleType::Title)
    );
    println!("{}", build_table(&points));

    if let Some(summary) = summarize(&points) {
        println!(
            "Low {:.4} on {}, high {:.4} on {}, change {}",
            summary.low.rate, summary.low.date, summary.high.rate, summary.high.date,
            summary.change.percent
        );
    }
    Ok(())
}

fn build_table(points: &[HistoryPoint]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Rate")]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.date.to_string()),
            ui::amount_cell(Some(point.rate)),
        ]);
    }
    table
}
