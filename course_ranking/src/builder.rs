pub use crate::config::*;

/// A builder for assembling a survey table row by row.
///
/// The readers use it to turn spreadsheet rows into a [`SurveyTable`].
///
/// ```
/// pub use course_ranking::builder::Builder;
/// pub use course_ranking::SurveyRules;
/// # use course_ranking::RankingErrors;
///
/// let mut builder = Builder::new(&SurveyRules::default())?.columns(&[
///     "Please place each MAcc CORE course into rank order - Audit".to_string(),
///     "Rate each elective on a scale from 1-5 - Data Analytics".to_string(),
/// ])?;
///
/// builder.add_response_simple(&["1".to_string(), "4".to_string()])?;
/// builder.add_response_simple(&["2".to_string(), "".to_string()])?;
///
/// let res = builder.rankings()?;
/// assert_eq!(res.core[0].mean, Some(1.5));
/// assert_eq!(res.elective[0].mean, Some(4.0));
///
/// # Ok::<(), RankingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: SurveyRules,
    pub(crate) _columns: Vec<String>,
    pub(crate) _field_ids: Vec<Option<String>>,
    pub(crate) _rows: Vec<Vec<Cell>>,
}

impl Builder {
    pub fn new(rules: &SurveyRules) -> Result<Builder, RankingErrors> {
        crate::check_rules(rules)?;
        Ok(Builder {
            _rules: rules.clone(),
            _columns: Vec::new(),
            _field_ids: Vec::new(),
            _rows: Vec::new(),
        })
    }

    /// Declares the header. Any row added before is discarded.
    pub fn columns(self, names: &[String]) -> Result<Builder, RankingErrors> {
        if names.is_empty() {
            return Err(RankingErrors::MissingColumns);
        }
        Ok(Builder {
            _rules: self._rules,
            _columns: names.to_vec(),
            _field_ids: vec![None; names.len()],
            _rows: Vec::new(),
        })
    }

    /// Sets the instrument field identifiers, one per column.
    ///
    /// A shorter list leaves the remaining columns without identifier.
    pub fn field_ids(&mut self, ids: &[Option<String>]) -> Result<(), RankingErrors> {
        if ids.len() > self._columns.len() {
            return Err(RankingErrors::MetadataTooLong {
                expected: self._columns.len(),
                found: ids.len(),
            });
        }
        let mut field_ids = ids.to_vec();
        field_ids.resize(self._columns.len(), None);
        self._field_ids = field_ids;
        Ok(())
    }

    /// Adds a response made of text answers.
    pub fn add_response_simple(&mut self, answers: &[String]) -> Result<(), RankingErrors> {
        let cells: Vec<Cell> = answers
            .iter()
            .map(|s| {
                if s.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(s.clone())
                }
            })
            .collect();
        self.add_response(&cells)
    }

    /// Adds a response.
    ///
    /// Short rows are padded with empty cells. Trailing empty cells beyond the
    /// header are dropped; any other extra cell is an error.
    pub fn add_response(&mut self, cells: &[Cell]) -> Result<(), RankingErrors> {
        let width = self._columns.len();
        if width == 0 {
            return Err(RankingErrors::MissingColumns);
        }
        if cells.len() > width && cells[width..].iter().any(|c| *c != Cell::Empty) {
            return Err(RankingErrors::RowTooLong {
                row: self._rows.len() + 1,
                expected: width,
                found: cells.len(),
            });
        }
        let mut row: Vec<Cell> = cells.iter().take(width).cloned().collect();
        row.resize(width, Cell::Empty);
        self._rows.push(row);
        Ok(())
    }

    pub fn table(&self) -> SurveyTable {
        SurveyTable {
            columns: self._columns.clone(),
            field_ids: self._field_ids.clone(),
            rows: self._rows.clone(),
        }
    }

    pub fn rankings(&self) -> Result<RankingResult, RankingErrors> {
        crate::run_rankings(&self.table(), &self._rules)
    }
}
