// Primitives for reading CSV files.

use crate::report::{
    io_common::{assemble_table, RawSheet},
    *,
};

fn to_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

pub fn read_csv_file(
    path: &str,
    header_row_index: usize,
    rules: &SurveyRules,
) -> ReportResult<SurveyTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();

    // Physical rows above the header.
    for idx in 0..header_row_index {
        if let Some(line_r) = records.next() {
            line_r.context(CsvLineParseSnafu { lineno: idx + 1 })?;
        }
    }

    let header: Vec<String> = records
        .next()
        .context(MissingHeaderSnafu {
            row: header_row_index,
            path,
        })?
        .context(CsvLineParseSnafu {
            lineno: header_row_index + 1,
        })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_file: header: {:?}", header);

    let metadata: Option<Vec<String>> = match records.next() {
        Some(line_r) => Some(
            line_r
                .context(CsvLineParseSnafu {
                    lineno: header_row_index + 2,
                })?
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        None => None,
    };

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + header_row_index + 3;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_file: lineno: {:?} row: {:?}", lineno, &line);
        rows.push(line.iter().map(to_cell).collect());
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
