use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::{
    io_common::{assemble_table, RawSheet},
    *,
};

/// Reads a survey export in Excel format.
///
/// The header is the row at `header_row_index` (0-based, counted from the
/// first row of the used range of the worksheet).
pub fn read_excel_file(
    path: &str,
    header_row_index: usize,
    worksheet_name: Option<&str>,
    rules: &SurveyRules,
) -> ReportResult<SurveyTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows().skip(header_row_index);
    let header: Vec<String> = iter
        .next()
        .context(MissingHeaderSnafu {
            row: header_row_index,
            path,
        })?
        .iter()
        .map(read_header_cell)
        .collect();
    debug!("read_excel_file: header: {:?}", header);

    let metadata: Option<Vec<String>> = iter
        .next()
        .map(|row| row.iter().map(read_header_cell).collect());

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        debug!("read_excel_file: idx: {:?} row: {:?}", idx, row);
        rows.push(row.iter().map(read_cell).collect());
    }

    assemble_table(
        RawSheet {
            header,
            metadata,
            rows,
        },
        rules,
    )
}

fn read_header_cell(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Empty => "".to_string(),
        x => x.to_string(),
    }
}

fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Bool(*b),
        // Dates and cell errors are never answers to a numeric question.
        _ => Cell::Empty,
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> ReportResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}
