use super::ui;
use crate::core::{Aggregator, Transaction};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Renders the aggregated transactions of `account` as a table.
pub fn display_as_table(account: &str, transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();

    table.set_header(vec![
        ui::header_cell("ID"),
        ui::header_cell("Source"),
        ui::header_cell("Account"),
        ui::header_cell("Amount"),
        ui::header_cell("Timestamp"),
    ]);

    for transaction in transactions {
        table.add_row(vec![
            Cell::new(&transaction.id),
            Cell::new(&transaction.source_id),
            Cell::new(&transaction.account),
            ui::amount_cell(transaction.amount),
            Cell::new(transaction.timestamp.value().format("%Y-%m-%d %H:%M:%S")),
        ]);
    }

    let mut output = format!(
        "Account: {}\n\n",
        ui::style_text(account, ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n{}",
        ui::style_text(
            &format!("{} transaction(s)", transactions.len()),
            ui::StyleType::Subtle
        )
    ));
    output
}

pub async fn run(aggregator: &Aggregator, account: &str, json: bool) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Aggregating transactions for {account}..."));
    let result = aggregator.aggregate(account).await;
    spinner.finish_and_clear();

    let transactions =
        result.with_context(|| format!("Failed to aggregate transactions for {account}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
    } else {
        println!("{}", display_as_table(account, &transactions));
    }
    Ok(())
}
