use serde::Serialize;

use crate::analyzer::{analyze, AnalysisResult};
use crate::detector::detect_report_type;
use crate::importer::decode_document;
use crate::models::ReportType;

/// Response envelope for one processed document. Decode-level failures are
/// reported as values (`success == false`), never as errors: the caller
/// always gets something serializable back.
#[derive(Debug, Serialize)]
pub struct ProcessOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<ReportType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessOutcome {
    fn ok(file_type: ReportType, analysis: AnalysisResult) -> Self {
        ProcessOutcome {
            success: true,
            file_type: Some(file_type),
            analysis: Some(analysis),
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        ProcessOutcome {
            success: false,
            file_type: None,
            analysis: None,
            error: Some(message),
        }
    }
}

/// Decode, detect and analyze one uploaded document. Total over its
/// inputs: unsupported extensions and undecodable bytes come back as a
/// failure envelope, per-cell problems are absorbed during analysis.
pub fn process_document(bytes: &[u8], filename: &str) -> ProcessOutcome {
    let table = match decode_document(bytes, filename) {
        Ok(table) => table,
        Err(e) => return ProcessOutcome::failed(e.to_string()),
    };
    let file_type = detect_report_type(filename);
    let analysis = analyze(file_type, &table);
    ProcessOutcome::ok(file_type, analysis)
}
