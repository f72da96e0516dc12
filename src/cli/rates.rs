use super::ui;
use crate::core::currency::normalize_code;
use crate::core::{CurrencyRow, RateSession, SessionStatus};
use anyhow::{Result, anyhow};
use comfy_table::{Cell, Table};

pub struct RatesArgs {
    pub base: Option<String>,
    pub amount: f64,
    pub from: Option<String>,
    pub search: String,
}

/// Currency the amount is given in, defaulting to the base.
fn source_currency(from: Option<&str>, base: &str) -> Result<String> {
    match from {
        Some(code) => normalize_code(code).ok_or_else(|| anyhow!("Invalid currency code: {code}")),
        None => Ok(base.to_string()),
    }
}

pub async fn run(session: &RateSession, args: RatesArgs) -> Result<()> {
    let pb = ui::new_spinner("Fetching rates");
    match &args.base {
        Some(base) => session.set_base_currency(base).await,
        None => session.start().await,
    }
    pb.finish_and_clear();

    if session.status().await == SessionStatus::Error {
        let reason = session
            .error()
            .await
            .map_or_else(|| "unknown error".to_string(), |e| e.to_string());
        return Err(anyhow!("Could not load rates: {reason}"));
    }

    let base = session.base_currency().await;
    let from = source_currency(args.from.as_deref(), &base)?;
    let rows = session.rows(args.amount, &from, &args.search).await;
    let favorites = session.favorites().await;

    if let Some(current) = session.current().await {
        println!(
            "\n{} {}",
            ui::style_text(&format!("Rates for 1 {base}"), ui::StyleType::Title),
            ui::style_text(&format!("as of {}", current.date()), ui::StyleType::Subtle)
        );
    }

    if rows.is_empty() {
        println!("No currencies match \"{}\".", args.search);
        return Ok(());
    }

    let table = build_table(&rows, args.amount, &from, |code| favorites.contains(code));
    println!("{table}");
    Ok(())
}

fn build_table(
    rows: &[CurrencyRow],
    amount: f64,
    from: &str,
    is_favorite: impl Fn(&str) -> bool,
) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell(&format!("{amount} {from}")),
        ui::header_cell("Rate"),
        ui::header_cell("1D"),
    ]);

    for row in rows {
        let code = if is_favorite(&row.code) {
            ui::style_text(&format!("★ {}", row.code), ui::StyleType::Favorite)
        } else {
            row.code.clone()
        };
        let name = match row.symbol {
            Some(symbol) => format!("{} ({symbol})", row.name),
            None => row.name.clone(),
        };
        table.add_row(vec![
            Cell::new(code),
            Cell::new(name),
            ui::amount_cell(row.converted),
            ui::amount_cell(row.rate),
            ui::trend_cell(row.trend.as_ref()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateChange;

    #[test]
    fn test_source_currency_is_normalized() {
        assert_eq!(source_currency(Some(" eur "), "USD").unwrap(), "EUR");
        assert_eq!(source_currency(None, "USD").unwrap(), "USD");
        assert!(
            source_currency(Some("euro"), "USD")
                .unwrap_err()
                .to_string()
                .contains("Invalid currency code")
        );
    }

    #[test]
    fn test_build_table_lists_each_row() {
        let rows = vec![
            CurrencyRow {
                code: "USD".to_string(),
                name: "US Dollar".to_string(),
                symbol: Some("$"),
                rate: Some(1.0),
                converted: Some(100.0),
                trend: Some(RateChange::between(1.0, 1.0)),
            },
            CurrencyRow {
                code: "JPY".to_string(),
                name: "Japanese Yen".to_string(),
                symbol: None,
                rate: Some(148.62),
                converted: Some(14862.0),
                trend: None,
            },
        ];

        let rendered = build_table(&rows, 100.0, "USD", |code| code == "USD").to_string();
        assert!(rendered.contains("US Dollar ($)"));
        assert!(rendered.contains("14862.0000"));
        assert!(rendered.contains("+0.00%"));
        assert!(rendered.contains("Japanese Yen"));
    }
}
