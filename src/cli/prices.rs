use super::ui;
use crate::core::{Metal, SpotPriceError, SpotPriceProvider, SpotPriceSnapshot};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use tracing::warn;

/// Outcome of asking the provider for prices on behalf of the terminal.
///
/// A failed fetch falls back to the last known snapshot, flagged as stale so
/// the user can tell.
#[derive(Debug)]
pub enum PriceStatus {
    Current(SpotPriceSnapshot),
    Stale(SpotPriceSnapshot, SpotPriceError),
    Unavailable(SpotPriceError),
}

impl PriceStatus {
    pub fn snapshot(&self) -> Option<&SpotPriceSnapshot> {
        match self {
            PriceStatus::Current(snapshot) | PriceStatus::Stale(snapshot, _) => Some(snapshot),
            PriceStatus::Unavailable(_) => None,
        }
    }

    /// A line explaining why prices are stale or missing.
    pub fn notice(&self) -> Option<String> {
        match self {
            PriceStatus::Current(_) => None,
            PriceStatus::Stale(snapshot, e) => Some(ui::style_text(
                &format!(
                    "Error loading spot prices ({}): {}. Showing prices last fetched at {}.",
                    e.status_code(),
                    e,
                    format_time(snapshot.fetched_at)
                ),
                ui::StyleType::Warning,
            )),
            PriceStatus::Unavailable(e) => Some(ui::style_text(
                &format!("Error loading spot prices ({}): {}", e.status_code(), e),
                ui::StyleType::Error,
            )),
        }
    }
}

pub async fn load_prices(
    provider: &(dyn SpotPriceProvider + Send + Sync),
    refresh: bool,
) -> PriceStatus {
    let pb = ui::new_spinner("Fetching spot prices...");
    let result = if refresh {
        provider.refresh_spot_prices().await
    } else {
        provider.get_spot_prices().await
    };
    pb.finish_and_clear();

    match result {
        Ok(snapshot) => PriceStatus::Current(snapshot),
        Err(e) => match provider.last_known().await {
            Some(snapshot) => {
                warn!("Falling back to stale spot prices: {}", e);
                PriceStatus::Stale(snapshot, e)
            }
            None => PriceStatus::Unavailable(e),
        },
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn render_prices(snapshot: &SpotPriceSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metal"),
        ui::header_cell("Symbol"),
        ui::header_cell("Spot (USD/oz)"),
    ]);

    for metal in Metal::SUPPORTED {
        table.add_row(vec![
            Cell::new(metal.to_string()),
            Cell::new(metal.symbol().unwrap_or_default()),
            ui::format_optional_cell(snapshot.price_for(&metal), |p| format!("{p:.2}")),
        ]);
    }

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Spot Prices", ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!(
                "Source: {} · Quoted at {} · Fetched at {}",
                snapshot.source,
                format_time(snapshot.timestamp),
                format_time(snapshot.fetched_at)
            ),
            ui::StyleType::Subtle
        )
    ));
    output
}

pub async fn run(provider: &(dyn SpotPriceProvider + Send + Sync), refresh: bool) -> Result<()> {
    let status = load_prices(provider, refresh).await;
    if let Some(notice) = status.notice() {
        eprintln!("{notice}");
    }
    match status {
        PriceStatus::Current(snapshot) | PriceStatus::Stale(snapshot, _) => {
            println!("{}", render_prices(&snapshot));
            Ok(())
        }
        PriceStatus::Unavailable(e) => Err(e.into()),
    }
}
