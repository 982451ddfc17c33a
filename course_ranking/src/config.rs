// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A single value read from the survey spreadsheet.
///
/// Readers map their native cell types into this enum. Only numbers and
/// text that parses as a number contribute to the statistics.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

/// The loaded survey: one column per question, one row per respondent.
///
/// The metadata row found under the header is not a response. When it
/// carries field identifiers, they are kept in `field_ids` (one entry per
/// column).
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyTable {
    pub columns: Vec<String>,
    pub field_ids: Vec<Option<String>>,
    pub rows: Vec<Vec<Cell>>,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl SurveyTable {
    /// All the cells of one column, in row order.
    pub fn column_values(&self, col_idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(col_idx).unwrap_or(&EMPTY_CELL))
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Classification {
    /// Courses ranked against each other. Lower numbers are preferred.
    Core,
    /// Courses rated independently on a 1-5 scale.
    Elective,
}

impl Classification {
    pub const ALL: [Classification; 2] = [Classification::Core, Classification::Elective];

    /// Core rankings sort ascending (rank 1 is the favourite), ratings descending.
    pub fn ascending(&self) -> bool {
        match self {
            Classification::Core => true,
            Classification::Elective => false,
        }
    }

    /// The label of the mean column in the data files and tables.
    pub fn mean_label(&self) -> &'static str {
        match self {
            Classification::Core => "Mean Rank",
            Classification::Elective => "Mean Rating",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Core => write!(f, "Core"),
            Classification::Elective => write!(f, "Elective"),
        }
    }
}

/// A column of the survey selected for aggregation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CourseColumn {
    pub index: usize,
    /// The full question text.
    pub name: String,
    pub classification: Classification,
    pub course: String,
}

/// Statistics for one course.
#[derive(PartialEq, Debug, Clone)]
pub struct CourseSummary {
    pub course: String,
    /// None when no respondent gave a numeric answer.
    pub mean: Option<f64>,
    pub classification: Classification,
    /// Dense, 1-based, unique within the classification.
    pub rank: u32,
    /// Number of numeric answers that went into the mean.
    pub responses: u64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RankingResult {
    pub core: Vec<CourseSummary>,
    pub elective: Vec<CourseSummary>,
    pub num_responses: usize,
}

impl RankingResult {
    pub fn summaries(&self, classification: Classification) -> &[CourseSummary] {
        match classification {
            Classification::Core => &self.core,
            Classification::Elective => &self.elective,
        }
    }
}

/// Errors that prevent the rankings from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RankingErrors {
    /// A classification rule would match every column.
    EmptyRule(Classification),
    /// A response row has more cells than there are columns.
    RowTooLong {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The metadata row has more cells than there are columns.
    MetadataTooLong { expected: usize, found: usize },
    MissingColumns,
}

impl Error for RankingErrors {}

impl Display for RankingErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingErrors::EmptyRule(c) => {
                write!(f, "the {} rule has no pattern and no field mapping", c)
            }
            RankingErrors::RowTooLong {
                row,
                expected,
                found,
            } => write!(
                f,
                "response row {} has {} cells but the header has {} columns",
                row, found, expected
            ),
            RankingErrors::MetadataTooLong { expected, found } => write!(
                f,
                "metadata row has {} cells but the header has {} columns",
                found, expected
            ),
            RankingErrors::MissingColumns => write!(f, "no columns declared for the survey"),
        }
    }
}

// ********* Configuration **********

/// Where courses without any numeric answer go in the ranking.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum UndefinedMeanOrder {
    /// After every defined mean, whatever the sort direction.
    Last,
    /// Before every defined mean, whatever the sort direction.
    First,
}

/// Explicit assignment of one instrument field to a classification.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FieldMapping {
    pub field_id: String,
    /// Overrides the course name derived from the column name.
    pub course: Option<String>,
}

/// How columns are recognized for one classification.
///
/// A column matches when its field identifier is listed in `field_mappings`,
/// or, failing that, when its name contains every string of `contains`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnRule {
    pub contains: Vec<String>,
    pub field_mappings: Vec<FieldMapping>,
}

impl ColumnRule {
    pub fn containing(patterns: &[&str]) -> ColumnRule {
        ColumnRule {
            contains: patterns.iter().map(|s| s.to_string()).collect(),
            field_mappings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contains.is_empty() && self.field_mappings.is_empty()
    }

    pub(crate) fn mapping_for(&self, field_id: Option<&str>) -> Option<&FieldMapping> {
        let fid = field_id?;
        self.field_mappings.iter().find(|m| m.field_id == fid)
    }

    pub(crate) fn matches_name(&self, name: &str) -> bool {
        !self.contains.is_empty() && self.contains.iter().all(|p| name.contains(p.as_str()))
    }
}

pub const CORE_PATTERN: &str = "Please place each MAcc CORE course into rank order";
pub const ELECTIVE_PATTERNS: [&str; 2] = ["Rate ", "on a scale from 1-5"];
pub const COURSE_NAME_SEPARATOR: &str = " - ";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveyRules {
    pub core: ColumnRule,
    pub elective: ColumnRule,
    pub course_name_separator: String,
    pub undefined_means: UndefinedMeanOrder,
}

impl SurveyRules {
    pub fn rule(&self, classification: Classification) -> &ColumnRule {
        match classification {
            Classification::Core => &self.core,
            Classification::Elective => &self.elective,
        }
    }
}

impl Default for SurveyRules {
    /// The rules of the MAcc exit survey.
    fn default() -> Self {
        SurveyRules {
            core: ColumnRule::containing(&[CORE_PATTERN]),
            elective: ColumnRule::containing(&ELECTIVE_PATTERNS),
            course_name_separator: COURSE_NAME_SEPARATOR.to_string(),
            undefined_means: UndefinedMeanOrder::Last,
        }
    }
}
