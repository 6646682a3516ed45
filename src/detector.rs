use crate::models::ReportType;

/// Filename keyword sets, tested in priority order; first match wins.
/// A sales-margin report named "costo_compras.xlsx" is cost-of-sales, not
/// purchases, because the cost keywords rank higher.
const DETECTION_RULES: &[(&[&str], ReportType)] = &[
    (&["coste", "costo", "venta", "margen"], ReportType::CostOfSales),
    (&["compra", "proveedor", "gasto"], ReportType::PurchasesExpenses),
    (&["pago", "banco", "transferencia"], ReportType::BankPayments),
    (&["inventario", "stock", "producto"], ReportType::Inventory),
];

/// Infer the report category from a filename. Total: anything matching no
/// keyword set is `Other`.
pub fn detect_report_type(filename: &str) -> ReportType {
    let name = filename.to_lowercase();
    DETECTION_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map(|(_, report_type)| *report_type)
        .unwrap_or(ReportType::Other)
}
