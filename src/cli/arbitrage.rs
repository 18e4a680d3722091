use super::ui;
use crate::core::{ArbitrageCoin, RecordSource, UserContext};
use anyhow::Result;
use comfy_table::Cell;

/// Renders the public arbitrage list. Notes are only shown to admins.
pub fn display_arbitrage(listings: &[ArbitrageCoin], user: &UserContext) -> String {
    if listings.is_empty() {
        return "No arbitrage coins published yet.".to_string();
    }

    let mut table = ui::new_styled_table();
    let mut header = vec![
        ui::header_cell("Coin"),
        ui::header_cell("Metal"),
        ui::header_cell("Description"),
        ui::header_cell("Resale Links"),
        ui::header_cell("Published"),
    ];
    if user.admin {
        header.push(ui::header_cell("Notes"));
    }
    table.set_header(header);

    for listing in listings {
        let links = listing
            .resale_links
            .iter()
            .map(|link| format!("{}: {}", link.platform, link.url))
            .collect::<Vec<_>>()
            .join("\n");
        let mut row = vec![
            Cell::new(&listing.name),
            Cell::new(listing.metal_type.to_string()),
            Cell::new(&listing.description),
            ui::format_optional_cell((!links.is_empty()).then_some(links), |l| l),
            Cell::new(listing.published_at.format("%Y-%m-%d").to_string()),
        ];
        if user.admin {
            row.push(ui::format_optional_cell(listing.notes.clone(), |n| n));
        }
        table.add_row(row);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Arbitrage Opportunities", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output
}

pub fn run(records: &dyn RecordSource, user: &UserContext) -> Result<()> {
    let listings = records.arbitrage_coins()?;
    println!("{}", display_arbitrage(&listings, user));
    Ok(())
}
