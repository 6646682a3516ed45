use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::importer::{excel_serial_to_date, parse_date};
use crate::models::{Cell, ColumnKind, FinancialRole, ReportType, Table};

// ---------------------------------------------------------------------------
// Role rules
// ---------------------------------------------------------------------------

/// One classification rule: a category label containing any of the
/// keywords (after lower-casing) takes `role`.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub role: FinancialRole,
    pub keywords: &'static [&'static str],
}

/// Default rules, evaluated in order; first match wins. Labels matching no
/// rule fall back to `OperatingExpense`. Note `CostOfSales` is absent here:
/// only a caller-supplied rule set can produce it.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        role: FinancialRole::Inventory,
        keywords: &["mercancía", "mercancia", "producto", "inventario"],
    },
    RoleRule {
        role: FinancialRole::Payroll,
        keywords: &["nómina", "nomina", "sueldo", "salario"],
    },
    RoleRule {
        role: FinancialRole::Income,
        keywords: &["venta", "ingreso"],
    },
];

pub fn classify_with_rules(rules: &[RoleRule], label: &str) -> FinancialRole {
    let label = label.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| label.contains(k)))
        .map(|rule| rule.role)
        .unwrap_or(FinancialRole::OperatingExpense)
}

// ---------------------------------------------------------------------------
// Analysis result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    #[serde(rename = "rol")]
    pub role: FinancialRole,
    #[serde(rename = "subcategoria")]
    pub subcategory: String,
    #[serde(rename = "monto")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    #[serde(rename = "clasificaciones")]
    pub classifications: BTreeMap<String, Classification>,
    #[serde(rename = "ingresos")]
    pub income: f64,
    #[serde(rename = "costo_ventas")]
    pub cost_of_sales: f64,
    #[serde(rename = "nomina")]
    pub payroll: f64,
    #[serde(rename = "gastos_operativos")]
    pub operating_expenses: f64,
    #[serde(rename = "inventario_comprado")]
    pub inventory_purchased: f64,
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

pub fn analyze(report_type: ReportType, table: &Table) -> AnalysisResult {
    analyze_with_rules(report_type, table, ROLE_RULES)
}

/// Classify every row of `table` and aggregate per-role totals.
///
/// The amount column is the rightmost numeric column (source documents put
/// the running total last); the category column is the leftmost text column
/// that is not date-named. Rows with a blank or "nan" category are skipped.
/// Repeated category labels overwrite earlier entries, so only the last
/// occurrence of a label contributes to the totals.
///
/// The report type is part of the contract for parity with the service this
/// replaces, which only ever logged it.
pub fn analyze_with_rules(
    _report_type: ReportType,
    table: &Table,
    rules: &[RoleRule],
) -> AnalysisResult {
    let amount_col = table
        .columns()
        .iter()
        .rposition(|c| c.kind == ColumnKind::Numeric);
    let category_col = table
        .columns()
        .iter()
        .position(|c| c.kind == ColumnKind::Text && !is_date_named(&c.name));

    let mut classifications = BTreeMap::new();
    if let (Some(cat_idx), Some(amt_idx)) = (category_col, amount_col) {
        for row in table.rows() {
            let label = row[cat_idx].as_text();
            if label.is_empty() || label == "nan" {
                continue;
            }
            let amount = round2(cell_amount(&row[amt_idx]));
            classifications.insert(
                label.clone(),
                Classification {
                    role: classify_with_rules(rules, &label),
                    subcategory: label,
                    amount,
                },
            );
        }
    }

    // Totals come from the final map, so overwritten duplicates never
    // double-count.
    let mut income = 0.0;
    let mut cost_of_sales = 0.0;
    let mut payroll = 0.0;
    let mut operating_expenses = 0.0;
    let mut inventory_purchased = 0.0;
    for c in classifications.values() {
        match c.role {
            FinancialRole::Income => income += c.amount,
            FinancialRole::CostOfSales => cost_of_sales += c.amount,
            FinancialRole::Payroll => payroll += c.amount.abs(),
            FinancialRole::OperatingExpense => operating_expenses += c.amount.abs(),
            FinancialRole::Inventory => inventory_purchased += c.amount.abs(),
        }
    }

    let (period_start, period_end) = detect_period(table);

    AnalysisResult {
        period_start: period_start.map(|d| d.format("%Y-%m-%d").to_string()),
        period_end: period_end.map(|d| d.format("%Y-%m-%d").to_string()),
        classifications,
        income,
        cost_of_sales,
        payroll,
        operating_expenses,
        inventory_purchased,
    }
}

fn cell_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        _ => 0.0,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_date_named(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("fecha") || name.contains("date")
}

/// Min/max over the first date-named column, ignoring anything that does
/// not parse. Numeric cells are treated as Excel serials.
fn detect_period(table: &Table) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Some(idx) = table.columns().iter().position(|c| is_date_named(&c.name)) else {
        return (None, None);
    };
    let mut start: Option<NaiveDate> = None;
    let mut end: Option<NaiveDate> = None;
    for row in table.rows() {
        let parsed = match &row[idx] {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date(s),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Empty => None,
        };
        if let Some(date) = parsed {
            start = Some(start.map_or(date, |s| s.min(date)));
            end = Some(end.map_or(date, |e| e.max(date)));
        }
    }
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a table from (name, cells) column pairs.
    fn table(columns: &[(&str, Vec<Cell>)]) -> Table {
        let names = columns.iter().map(|(n, _)| n.to_string()).collect();
        let height = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
        let rows = (0..height)
            .map(|r| {
                columns
                    .iter()
                    .map(|(_, cells)| cells.get(r).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect();
        Table::new(names, rows)
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(n: f64) -> Cell {
        Cell::Number(n)
    }

    fn classify(label: &str) -> FinancialRole {
        classify_with_rules(ROLE_RULES, label)
    }

    #[test]
    fn test_classify_priority() {
        // "producto" (inventory) outranks "venta" (income)
        assert_eq!(classify("Producto en venta"), FinancialRole::Inventory);
        assert_eq!(classify("Nómina administrativa"), FinancialRole::Payroll);
        assert_eq!(classify("SUELDOS"), FinancialRole::Payroll);
        assert_eq!(classify("Ventas del mes"), FinancialRole::Income);
        assert_eq!(classify("Ingresos varios"), FinancialRole::Income);
        assert_eq!(classify("Renta de local"), FinancialRole::OperatingExpense);
    }

    #[test]
    fn test_classify_handles_accents() {
        assert_eq!(classify("MERCANCÍA"), FinancialRole::Inventory);
        assert_eq!(classify("mercancia general"), FinancialRole::Inventory);
    }

    #[test]
    fn test_last_occurrence_of_repeated_label_wins() {
        let t = table(&[
            ("Categoría", vec![text("Ventas"), text("Nómina"), text("Ventas")]),
            ("Total", vec![num(100.0), num(-50.0), num(30.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.classifications.len(), 2);
        assert_eq!(result.classifications["Ventas"].amount, 30.0);
        assert_eq!(result.classifications["Nómina"].amount, -50.0);
        assert_eq!(result.income, 30.0);
        assert_eq!(result.payroll, 50.0);
    }

    #[test]
    fn test_blank_and_nan_categories_are_skipped() {
        let t = table(&[
            ("Concepto", vec![text("Ventas"), Cell::Empty, text("nan"), text("   ")]),
            ("Monto", vec![num(100.0), num(999.0), num(888.0), num(777.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.classifications.len(), 1);
        assert_eq!(result.income, 100.0);
        assert_eq!(result.operating_expenses, 0.0);
    }

    #[test]
    fn test_no_text_column_yields_empty_result() {
        let t = table(&[
            ("A", vec![num(1.0), num(2.0)]),
            ("B", vec![num(3.0), num(4.0)]),
        ]);
        let result = analyze(ReportType::Inventory, &t);
        assert!(result.classifications.is_empty());
        assert_eq!(result.income, 0.0);
        assert_eq!(result.cost_of_sales, 0.0);
        assert_eq!(result.payroll, 0.0);
        assert_eq!(result.operating_expenses, 0.0);
        assert_eq!(result.inventory_purchased, 0.0);
    }

    #[test]
    fn test_no_numeric_column_yields_empty_result() {
        let t = table(&[("Concepto", vec![text("Ventas"), text("Nómina")])]);
        let result = analyze(ReportType::Other, &t);
        assert!(result.classifications.is_empty());
        assert_eq!(result.income, 0.0);
    }

    #[test]
    fn test_amount_is_rightmost_numeric_column() {
        let t = table(&[
            ("Concepto", vec![text("Ventas")]),
            ("Unidades", vec![num(3.0)]),
            ("Total", vec![num(450.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.classifications["Ventas"].amount, 450.0);
    }

    #[test]
    fn test_missing_amount_cell_counts_as_zero() {
        let t = table(&[
            ("Concepto", vec![text("Ventas"), text("Renta")]),
            ("Total", vec![num(100.0), Cell::Empty]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.classifications["Renta"].amount, 0.0);
        assert_eq!(result.operating_expenses, 0.0);
    }

    #[test]
    fn test_expense_totals_use_absolute_values() {
        let t = table(&[
            (
                "Concepto",
                vec![text("Nómina"), text("Mercancía"), text("Luz"), text("Ventas")],
            ),
            ("Total", vec![num(-800.0), num(-300.0), num(-120.5), num(1500.0)]),
        ]);
        let result = analyze(ReportType::PurchasesExpenses, &t);
        assert_eq!(result.payroll, 800.0);
        assert_eq!(result.inventory_purchased, 300.0);
        assert_eq!(result.operating_expenses, 120.5);
        assert_eq!(result.income, 1500.0);
        assert_eq!(result.cost_of_sales, 0.0);
    }

    #[test]
    fn test_amounts_rounded_to_two_decimals() {
        let t = table(&[
            ("Concepto", vec![text("Ventas")]),
            ("Total", vec![num(10.006)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.classifications["Ventas"].amount, 10.01);
    }

    #[test]
    fn test_period_from_date_column_ignoring_bad_values() {
        let t = table(&[
            (
                "Fecha",
                vec![
                    Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
                    Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
                    text("bad"),
                ],
            ),
            ("Concepto", vec![text("Ventas"), text("Ventas"), text("Ventas")]),
            ("Total", vec![num(1.0), num(2.0), num(3.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.period_start.as_deref(), Some("2024-01-05"));
        assert_eq!(result.period_end.as_deref(), Some("2024-01-31"));
    }

    #[test]
    fn test_period_absent_without_date_named_column() {
        let t = table(&[
            ("Concepto", vec![text("Ventas")]),
            ("Total", vec![num(1.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.period_start, None);
        assert_eq!(result.period_end, None);
    }

    #[test]
    fn test_date_named_column_not_chosen_as_category() {
        // "Fecha" infers as text because of the garbage value; the category
        // column must still be "Concepto".
        let t = table(&[
            ("Fecha", vec![text("bad"), text("worse")]),
            ("Concepto", vec![text("Ventas"), text("Nómina")]),
            ("Total", vec![num(10.0), num(-5.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.income, 10.0);
        assert_eq!(result.payroll, 5.0);
        assert!(result.classifications.contains_key("Ventas"));
    }

    #[test]
    fn test_excel_serial_dates_in_date_column() {
        let t = table(&[
            ("Date", vec![num(45667.0), num(45668.0)]),
            ("Concepto", vec![text("Ventas"), text("Ventas")]),
            ("Total", vec![num(1.0), num(2.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        assert_eq!(result.period_start.as_deref(), Some("2025-01-10"));
        assert_eq!(result.period_end.as_deref(), Some("2025-01-11"));
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let t = table(&[
            ("Fecha", vec![Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())]),
            ("Concepto", vec![text("Ventas")]),
            ("Total", vec![num(42.0)]),
        ]);
        let first = analyze(ReportType::CostOfSales, &t);
        let second = analyze(ReportType::CostOfSales, &t);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_rules_can_reach_cost_of_sales() {
        const COST_RULES: &[RoleRule] = &[RoleRule {
            role: FinancialRole::CostOfSales,
            keywords: &["coste", "costo"],
        }];
        let t = table(&[
            ("Concepto", vec![text("Costo directo"), text("Renta")]),
            ("Total", vec![num(-400.0), num(-100.0)]),
        ]);
        let result = analyze_with_rules(ReportType::CostOfSales, &t, COST_RULES);
        assert_eq!(
            result.classifications["Costo directo"].role,
            FinancialRole::CostOfSales
        );
        // signed sum, unlike the absolute-value expense buckets
        assert_eq!(result.cost_of_sales, -400.0);
        assert_eq!(result.operating_expenses, 100.0);
    }

    #[test]
    fn test_serialized_shape_uses_wire_names() {
        let t = table(&[
            ("Concepto", vec![text("Ventas")]),
            ("Total", vec![num(100.0)]),
        ]);
        let result = analyze(ReportType::Other, &t);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["ingresos"], 100.0);
        assert_eq!(value["clasificaciones"]["Ventas"]["rol"], "INGRESO");
        assert_eq!(value["clasificaciones"]["Ventas"]["subcategoria"], "Ventas");
        assert_eq!(value["clasificaciones"]["Ventas"]["monto"], 100.0);
        assert!(value["period_start"].is_null());
    }
}
