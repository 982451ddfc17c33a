use course_ranking::builder::Builder;
use serde_json::Value as JSValue;

use crate::report::*;

/// The rows of a sheet, split the way every reader splits them.
#[derive(PartialEq, Debug, Clone)]
pub struct RawSheet {
    pub header: Vec<String>,
    /// The row right below the header. Never a response.
    pub metadata: Option<Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
}

/// Column name for a header cell. Blank headers get a positional name.
pub fn header_name(idx: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        raw.to_string()
    }
}

/// Extracts the field identifier from a metadata cell such as `{"ImportId":"QID124_3"}`.
pub fn parse_field_id(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let js: JSValue = serde_json::from_str(trimmed).ok()?;
    js.get("ImportId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Builds the survey table. The metadata row is only used for the field identifiers.
pub fn assemble_table(sheet: RawSheet, rules: &SurveyRules) -> ReportResult<SurveyTable> {
    let header: Vec<String> = sheet
        .header
        .iter()
        .enumerate()
        .map(|(idx, h)| header_name(idx, h))
        .collect();
    debug!("assemble_table: header: {:?}", header);
    let mut builder = Builder::new(rules)
        .and_then(|b| b.columns(&header))
        .context(RankingSnafu {})?;

    if let Some(metadata) = &sheet.metadata {
        let mut field_ids: Vec<Option<String>> =
            metadata.iter().map(|c| parse_field_id(c)).collect();
        // Metadata rows may be longer than the header with empty trailing cells.
        field_ids.truncate(header.len());
        debug!("assemble_table: field ids: {:?}", field_ids);
        builder.field_ids(&field_ids).context(RankingSnafu {})?;
    } else {
        warn!("assemble_table: no metadata row below the header");
    }

    for row in sheet.rows.iter() {
        builder.add_response(row).context(RankingSnafu {})?;
    }
    Ok(builder.table())
}
