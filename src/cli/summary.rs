use super::{prices, ui};
use crate::core::analytics::{self, InventoryValue};
use crate::core::{Metal, RecordSource, SpotPriceProvider, SpotPriceSnapshot, UserContext};
use anyhow::Result;
use comfy_table::Cell;

/// Renders the dashboard: spot prices next to the inventory totals.
pub fn display_summary(
    user: &UserContext,
    snapshot: Option<&SpotPriceSnapshot>,
    inventory: &InventoryValue,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

    for metal in Metal::SUPPORTED {
        table.add_row(vec![
            Cell::new(format!("{metal} spot (USD/oz)")),
            ui::format_optional_cell(snapshot.and_then(|s| s.price_for(&metal)), |p| {
                ui::format_currency(Some(p))
            }),
        ]);
    }
    table.add_row(vec![
        Cell::new("Coins"),
        Cell::new(inventory.coins.len().to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Total melt value"),
        ui::format_optional_cell(inventory.total_melt_value, |v| {
            ui::format_currency(Some(v))
        }),
    ]);
    table.add_row(vec![
        Cell::new("Weighted premium paid"),
        ui::change_cell(inventory.weighted_premium_paid_percent),
    ]);
    table.add_row(vec![
        Cell::new("Potential resale profit"),
        ui::format_optional_cell(inventory.total_potential_profit, |v| {
            ui::format_currency(Some(v))
        }),
    ]);

    let mut output = format!(
        "Dashboard: {}\n\n",
        ui::style_text(&user.id, ui::StyleType::Title)
    );
    output.push_str(&table.to_string());

    if let Some(snapshot) = snapshot {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!("Prices from {}", snapshot.source),
                ui::StyleType::Subtle
            )
        ));
    }
    output
}

pub async fn run(
    records: &dyn RecordSource,
    user: &UserContext,
    provider: &(dyn SpotPriceProvider + Send + Sync),
) -> Result<()> {
    let coins = records.coins_for(&user.id)?;

    let status = prices::load_prices(provider, false).await;
    if let Some(notice) = status.notice() {
        eprintln!("{notice}");
    }

    let inventory = analytics::calculate_inventory_value(&coins, status.snapshot());
    println!("{}", display_summary(user, status.snapshot(), &inventory));
    Ok(())
}
