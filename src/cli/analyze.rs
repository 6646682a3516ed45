use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::analyzer::AnalysisResult;
use crate::error::{FinilyticsError, Result};
use crate::fmt::money;
use crate::processor::process_document;

pub fn run(file: &str, json: bool) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let filename = std::path::Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);

    let outcome = process_document(&bytes, filename);

    if json {
        // The envelope carries failures itself, so this path always exits 0.
        let rendered = serde_json::to_string_pretty(&outcome)
            .map_err(|e| FinilyticsError::Other(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    let (Some(file_type), Some(analysis)) = (outcome.file_type, outcome.analysis) else {
        let message = outcome
            .error
            .unwrap_or_else(|| "analysis produced no result".to_string());
        return Err(FinilyticsError::Other(message));
    };

    println!("{} ({} bytes)", filename.bold(), bytes.len());
    println!(
        "Report type: {} \u{2014} {} categories",
        file_type.name(),
        analysis.classifications.len()
    );
    print!("{}", format_analysis(&analysis));
    Ok(())
}

pub fn format_analysis(analysis: &AnalysisResult) -> String {
    let mut out = String::new();

    match (&analysis.period_start, &analysis.period_end) {
        (Some(start), Some(end)) => out.push_str(&format!("Period: {start} to {end}\n")),
        _ => out.push_str("Period: not detected\n"),
    }

    if !analysis.classifications.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Role", "Amount"]);
        for (label, c) in &analysis.classifications {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(c.role.name()),
                Cell::new(money(c.amount)),
            ]);
        }
        out.push_str(&format!("{table}\n"));
    }

    out.push_str(&format!("\n{}\n", "TOTALS".bold()));
    out.push_str(&format!("  Income               {}\n", money(analysis.income).green()));
    out.push_str(&format!("  Cost of sales        {}\n", money(analysis.cost_of_sales)));
    out.push_str(&format!("  Payroll              {}\n", money(analysis.payroll).red()));
    out.push_str(&format!(
        "  Operating expenses   {}\n",
        money(analysis.operating_expenses).red()
    ));
    out.push_str(&format!(
        "  Inventory purchased  {}\n",
        money(analysis.inventory_purchased)
    ));
    out
}
