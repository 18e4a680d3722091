use super::ui;
use crate::core::records::ValidationIssue;
use crate::core::{RecordSource, UserContext};
use anyhow::{Result, bail};

/// Collects `(record name, issues)` pairs, skipping records without issues.
fn collect<'a, T>(
    records: &'a [T],
    name: impl Fn(&'a T) -> &'a str,
    validate: impl Fn(&T) -> Vec<ValidationIssue>,
) -> Vec<(&'a str, Vec<ValidationIssue>)> {
    records
        .iter()
        .filter_map(|record| {
            let issues = validate(record);
            (!issues.is_empty()).then(|| (name(record), issues))
        })
        .collect()
}

pub fn display_issues(kind: &str, findings: &[(&str, Vec<ValidationIssue>)]) -> String {
    if findings.is_empty() {
        return ui::style_text(&format!("All {kind} look good."), ui::StyleType::TotalValue);
    }

    let mut output = ui::style_text(
        &format!("{} {kind} need attention:", findings.len()),
        ui::StyleType::Warning,
    );
    for (name, issues) in findings {
        let label = if name.trim().is_empty() { "(unnamed)" } else { name };
        output.push_str(&format!("\n\n{}", ui::style_text(label, ui::StyleType::TotalLabel)));
        for issue in issues {
            output.push_str(&format!("\n  - {issue}"));
        }
    }
    output
}

/// Checks coin records, or the arbitrage list when `arbitrage` is set.
///
/// Issues are advisory and never fail the command.
pub fn run(records: &dyn RecordSource, user: &UserContext, arbitrage: bool) -> Result<()> {
    let output = if arbitrage {
        if !user.admin {
            bail!("Admin privileges required to validate arbitrage coins");
        }
        let listings = records.arbitrage_coins()?;
        display_issues(
            "arbitrage coins",
            &collect(&listings, |l| l.name.as_str(), |l| l.validate()),
        )
    } else {
        let coins = records.coins_for(&user.id)?;
        display_issues("coins", &collect(&coins, |c| c.name.as_str(), |c| c.validate()))
    };
    println!("{output}");
    Ok(())
}
