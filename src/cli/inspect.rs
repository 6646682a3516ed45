use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::importer::decode_document;

pub fn run(file: &str) -> Result<()> {
    let bytes = std::fs::read(file)?;
    let filename = std::path::Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    let doc = decode_document(&bytes, filename)?;

    println!(
        "{filename} ({} bytes): {} rows x {} columns",
        bytes.len(),
        doc.row_count(),
        doc.column_count()
    );

    let mut table = Table::new();
    table.set_header(vec!["Column", "Type", "Sample"]);
    for (idx, column) in doc.columns().iter().enumerate() {
        let sample = doc
            .rows()
            .iter()
            .map(|row| row[idx].as_text())
            .find(|text| !text.is_empty())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&column.name),
            Cell::new(column.kind.name()),
            Cell::new(sample),
        ]);
    }
    println!("{table}");
    Ok(())
}
