use crate::detector::detect_report_type;
use crate::error::Result;

pub fn run(filename: &str) -> Result<()> {
    let report_type = detect_report_type(filename);
    println!("{filename}: {} ({})", report_type.key(), report_type.name());
    Ok(())
}
