use super::{prices, ui};
use crate::core::analytics::{self, InventoryValue, Profitability};
use crate::core::{RecordSource, SpotPriceProvider, UserContext};
use anyhow::Result;
use comfy_table::{Cell, Color};
use tracing::debug;

fn profitability_cell(profitability: Profitability) -> Cell {
    let cell = Cell::new(profitability.to_string());
    match profitability {
        Profitability::Profitable => cell.fg(Color::Green),
        Profitability::Loss => cell.fg(Color::Red),
        Profitability::Neutral => cell.fg(Color::DarkGrey),
    }
}

impl InventoryValue {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Coin"),
            ui::header_cell("Metal"),
            ui::header_cell("Year"),
            ui::header_cell("Weight"),
            ui::header_cell("Purity"),
            ui::header_cell("Paid"),
            ui::header_cell("Melt"),
            ui::header_cell("Premium"),
            ui::header_cell("Resale"),
            ui::header_cell("Margin"),
            ui::header_cell("Status"),
        ]);

        for value in &self.coins {
            let coin = &value.coin;
            table.add_row(vec![
                Cell::new(&coin.name),
                Cell::new(coin.metal_type.to_string()),
                ui::format_optional_cell(coin.year, |y| y.to_string()),
                Cell::new(format!("{} {}", coin.weight, coin.weight_unit)),
                Cell::new(format!("{:.4}", coin.purity)),
                Cell::new(ui::format_currency(Some(coin.purchase_price))),
                ui::format_optional_cell(value.valuation.melt_value, |m| {
                    ui::format_currency(Some(m))
                }),
                ui::change_cell(value.valuation.premium_paid_percent),
                ui::format_optional_cell(coin.resale_market_value, |r| {
                    ui::format_currency(Some(r))
                }),
                ui::change_cell(value.valuation.profit_margin_percent),
                profitability_cell(value.profitability),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Coin Inventory", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let total_style_type = if self.total_melt_value.is_some() {
            ui::StyleType::TotalValue
        } else {
            ui::StyleType::Error
        };
        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Total Melt Value", ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_currency(self.total_melt_value), total_style_type)
        ));
        output
    }
}

pub async fn run(
    records: &dyn RecordSource,
    user: &UserContext,
    provider: &(dyn SpotPriceProvider + Send + Sync),
) -> Result<()> {
    let coins = records.coins_for(&user.id)?;
    if coins.is_empty() {
        println!("No coins in your inventory yet.");
        return Ok(());
    }
    debug!("Valuing {} coins for {}", coins.len(), user.id);

    let status = prices::load_prices(provider, false).await;
    if let Some(notice) = status.notice() {
        eprintln!("{notice}");
    }

    let inventory = analytics::calculate_inventory_value(&coins, status.snapshot());
    println!("{}", inventory.display_as_table());
    Ok(())
}
