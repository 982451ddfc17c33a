pub mod builder;
mod config;
pub mod manual;

use log::{debug, info, warn};

use std::cmp::Ordering;

pub use crate::config::*;

/// Derives the course name from a question title.
///
/// The course is the trailing segment after the last separator, trimmed.
/// Without a separator, the title is returned unchanged.
///
/// ```
/// use course_ranking::extract_course_name;
/// assert_eq!(extract_course_name("Q12 - Tax Research", " - "), "Tax Research");
/// assert_eq!(extract_course_name("SimpleColumnName", " - "), "SimpleColumnName");
/// ```
pub fn extract_course_name(column_name: &str, separator: &str) -> String {
    if separator.is_empty() {
        return column_name.to_string();
    }
    match column_name.rsplit_once(separator) {
        Some((_, last)) => last.trim().to_string(),
        None => column_name.to_string(),
    }
}

/// Selects the columns to aggregate, in input order.
///
/// A column goes to at most one classification. Field mappings are checked
/// first (core, then elective), then the name patterns (core, then elective).
pub fn classify_columns(
    table: &SurveyTable,
    rules: &SurveyRules,
) -> Result<Vec<CourseColumn>, RankingErrors> {
    check_rules(rules)?;
    let mut res: Vec<CourseColumn> = Vec::new();
    for (index, name) in table.columns.iter().enumerate() {
        let field_id: Option<&str> = table
            .field_ids
            .get(index)
            .and_then(|fid| fid.as_deref());

        let mapped = Classification::ALL.iter().find_map(|c| {
            rules
                .rule(*c)
                .mapping_for(field_id)
                .map(|m| (*c, m.course.clone()))
        });

        let found: Option<(Classification, Option<String>)> = mapped.or_else(|| {
            Classification::ALL
                .iter()
                .find(|c| rules.rule(**c).matches_name(name))
                .map(|c| (*c, None))
        });

        if let Some((classification, course_override)) = found {
            let course = course_override
                .unwrap_or_else(|| extract_course_name(name, &rules.course_name_separator));
            debug!(
                "classify_columns: column {} {:?} -> {} {:?}",
                index, field_id, classification, course
            );
            res.push(CourseColumn {
                index,
                name: name.clone(),
                classification,
                course,
            });
        }
    }
    Ok(res)
}

pub(crate) fn check_rules(rules: &SurveyRules) -> Result<(), RankingErrors> {
    for c in Classification::ALL {
        if rules.rule(c).is_empty() {
            return Err(RankingErrors::EmptyRule(c));
        }
    }
    Ok(())
}

/// Permissive numeric conversion. Anything that is not a finite number is missing.
pub fn coerce_numeric(cell: &Cell) -> Option<f64> {
    let x = match cell {
        Cell::Number(f) => *f,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        Cell::Bool(_) | Cell::Empty => return None,
    };
    if x.is_finite() {
        Some(x)
    } else {
        None
    }
}

/// The arithmetic mean of the numeric cells and how many there were.
///
/// The mean is undefined (None) when no cell is numeric, or when the values
/// are too large for the mean to be represented.
pub fn mean_of<'a, I>(cells: I) -> (Option<f64>, u64)
where
    I: IntoIterator<Item = &'a Cell>,
{
    let values: Vec<f64> = cells.into_iter().filter_map(coerce_numeric).collect();
    let count = values.len() as u64;
    if count == 0 {
        return (None, 0);
    }
    let sum: f64 = values.iter().sum();
    let mean = if sum.is_finite() {
        sum / count as f64
    } else {
        // The sum overflowed: fall back to a running mean.
        let mut m = 0.0;
        for (idx, x) in values.iter().enumerate() {
            m += (x - m) / (idx + 1) as f64;
        }
        m
    };
    if !mean.is_finite() {
        warn!("mean_of: mean of {} values is not finite", count);
        (None, count)
    } else {
        (Some(mean), count)
    }
}

fn compare_means(
    lhs: Option<f64>,
    rhs: Option<f64>,
    ascending: bool,
    undefined: UndefinedMeanOrder,
) -> Ordering {
    match (lhs, rhs) {
        (Some(x), Some(y)) if ascending => x.total_cmp(&y),
        (Some(x), Some(y)) => y.total_cmp(&x),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match undefined {
            UndefinedMeanOrder::Last => Ordering::Greater,
            UndefinedMeanOrder::First => Ordering::Less,
        },
        (Some(_), None) => match undefined {
            UndefinedMeanOrder::Last => Ordering::Less,
            UndefinedMeanOrder::First => Ordering::Greater,
        },
    }
}

/// Sorts the summaries of one classification and assigns the ranks 1..N.
///
/// The sort is stable: courses with the same mean keep their input order.
pub fn rank_summaries(
    summaries: &mut [CourseSummary],
    ascending: bool,
    undefined: UndefinedMeanOrder,
) {
    summaries.sort_by(|a, b| compare_means(a.mean, b.mean, ascending, undefined));
    for (idx, s) in summaries.iter_mut().enumerate() {
        s.rank = (idx + 1) as u32;
    }
}

fn summarize_column(table: &SurveyTable, col: &CourseColumn) -> CourseSummary {
    let (mean, responses) = mean_of(table.column_values(col.index));
    if mean.is_none() {
        warn!(
            "summarize_column: no numeric answer for {} course {:?} (column {:?})",
            col.classification, col.course, col.name
        );
    }
    CourseSummary {
        course: col.course.clone(),
        mean,
        classification: col.classification,
        // Set when ranking.
        rank: 0,
        responses,
    }
}

/// Classifies, aggregates and ranks the courses of a survey.
///
/// Arguments:
/// * `table` the responses, without the metadata row
/// * `rules` how to recognize the core and elective columns
pub fn run_rankings(
    table: &SurveyTable,
    rules: &SurveyRules,
) -> Result<RankingResult, RankingErrors> {
    info!(
        "Processing {:?} responses over {:?} columns",
        table.rows.len(),
        table.columns.len()
    );
    let course_columns = classify_columns(table, rules)?;

    let mut groups: Vec<Vec<CourseSummary>> = Vec::new();
    for classification in Classification::ALL {
        let mut summaries: Vec<CourseSummary> = course_columns
            .iter()
            .filter(|cc| cc.classification == classification)
            .map(|cc| summarize_column(table, cc))
            .collect();
        if summaries.is_empty() {
            warn!(
                "run_rankings: no column matched the {} rule",
                classification
            );
        }
        rank_summaries(
            &mut summaries,
            classification.ascending(),
            rules.undefined_means,
        );
        for s in summaries.iter() {
            info!(
                "{} {}: {} mean: {:?} ({} answers)",
                classification, s.rank, s.course, s.mean, s.responses
            );
        }
        groups.push(summaries);
    }

    let elective = groups.pop().unwrap_or_default();
    let core = groups.pop().unwrap_or_default();
    Ok(RankingResult {
        core,
        elective,
        num_responses: table.rows.len(),
    })
}
