use serde::Serialize;

/// A single decoded cell. Coercion is best-effort: anything that is not a
/// finite number or a recognizable date stays text, blanks become `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Date(chrono::NaiveDate),
    Empty,
}

impl Cell {
    /// The cell as trimmed text, the way the classification loop reads it.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Number(n) => format!("{n}"),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Date,
    Text,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Date => "date",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

/// A decoded document: ordered named columns over a row-major grid.
/// Every row holds exactly one cell per column; short rows are padded with
/// `Empty` and long rows truncated at construction.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(names: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Table {
        let width = names.len();
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        let columns = names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Column {
                name: name.trim().to_string(),
                kind: infer_kind(&rows, idx),
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A column is numeric or date only if every non-empty cell agrees; any
/// mixture degrades to text.
fn infer_kind(rows: &[Vec<Cell>], idx: usize) -> ColumnKind {
    let mut numbers = 0usize;
    let mut dates = 0usize;
    let mut texts = 0usize;
    for row in rows {
        match &row[idx] {
            Cell::Number(_) => numbers += 1,
            Cell::Date(_) => dates += 1,
            Cell::Text(_) => texts += 1,
            Cell::Empty => {}
        }
    }
    if numbers > 0 && dates == 0 && texts == 0 {
        ColumnKind::Numeric
    } else if dates > 0 && numbers == 0 && texts == 0 {
        ColumnKind::Date
    } else {
        ColumnKind::Text
    }
}

/// Coarse document category inferred from the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportType {
    #[serde(rename = "coste_ventas")]
    CostOfSales,
    #[serde(rename = "compras_gastos")]
    PurchasesExpenses,
    #[serde(rename = "pagos_banco")]
    BankPayments,
    #[serde(rename = "inventario")]
    Inventory,
    #[serde(rename = "otro")]
    Other,
}

impl ReportType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::CostOfSales => "coste_ventas",
            Self::PurchasesExpenses => "compras_gastos",
            Self::BankPayments => "pagos_banco",
            Self::Inventory => "inventario",
            Self::Other => "otro",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CostOfSales => "Cost of sales",
            Self::PurchasesExpenses => "Purchases & expenses",
            Self::BankPayments => "Bank payments",
            Self::Inventory => "Inventory",
            Self::Other => "Other",
        }
    }
}

/// The accounting bucket a classified row lands in. Wire names match the
/// upstream service this tool replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinancialRole {
    #[serde(rename = "INGRESO")]
    Income,
    #[serde(rename = "COSTO_VENTAS")]
    CostOfSales,
    #[serde(rename = "NOMINA")]
    Payroll,
    #[serde(rename = "INVENTARIO")]
    Inventory,
    #[serde(rename = "GASTO_OPERATIVO")]
    OperatingExpense,
}

impl FinancialRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::CostOfSales => "Cost of sales",
            Self::Payroll => "Payroll",
            Self::Inventory => "Inventory",
            Self::OperatingExpense => "Operating expense",
        }
    }
}
