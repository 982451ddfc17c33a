// Writing the report files.

use crate::report::chart::{chart_title, render_svg};
use crate::report::html::{chart_document, render_index, Section};
use crate::report::*;

pub const CORE_DATA_FILE: &str = "core_courses_ranking.csv";
pub const ELECTIVE_DATA_FILE: &str = "elective_courses_rating.csv";
pub const CORE_CHART_FILE: &str = "core_chart.html";
pub const ELECTIVE_CHART_FILE: &str = "elective_chart.html";
pub const INDEX_FILE: &str = "index.html";

/// Where and how the report is written.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OutputOptions {
    pub directory: PathBuf,
    pub title: String,
    /// Creates the directory (and its parents) when it is missing.
    pub create_directory: bool,
    /// When false, the run fails before writing anything if one of the files exists.
    pub overwrite: bool,
    /// Writes the CSV summaries next to the pages.
    pub write_data_files: bool,
}

pub fn data_file_name(classification: Classification) -> &'static str {
    match classification {
        Classification::Core => CORE_DATA_FILE,
        Classification::Elective => ELECTIVE_DATA_FILE,
    }
}

pub fn chart_file_name(classification: Classification) -> &'static str {
    match classification {
        Classification::Core => CORE_CHART_FILE,
        Classification::Elective => ELECTIVE_CHART_FILE,
    }
}

/// The summaries of one classification as CSV: Course, mean, Rank.
///
/// Undefined means are empty fields.
pub fn summary_csv(
    classification: Classification,
    summaries: &[CourseSummary],
) -> ReportResult<String> {
    let name = data_file_name(classification);
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Course", classification.mean_label(), "Rank"])
        .context(SerializingCsvSnafu { name })?;
    for s in summaries {
        let mean = match s.mean {
            Some(m) => format!("{:?}", m),
            None => String::new(),
        };
        wtr.write_record([s.course.as_str(), mean.as_str(), s.rank.to_string().as_str()])
            .context(SerializingCsvSnafu { name })?;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => whatever!("Error flushing {}: {}", name, e.error()),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("Invalid text in {}: {}", name, e),
    }
}

/// Checks or creates the output directory.
fn prepare_directory(options: &OutputOptions) -> ReportResult<()> {
    let dir = &options.directory;
    if dir.is_dir() {
        return Ok(());
    }
    let path = dir.display().to_string();
    if !options.create_directory {
        return MissingOutputDirSnafu { path }.fail();
    }
    info!("Creating output directory {:?}", path);
    fs::create_dir_all(dir).context(CreatingOutputDirSnafu { path })
}

fn write_file(path: &Path, content: &str) -> ReportResult<()> {
    debug!("write_file: {:?} ({} bytes)", path, content.len());
    fs::write(path, content).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })
}

/// Renders every file of the report and writes them in order: data files,
/// charts, then the index page.
///
/// Returns the paths of the written files.
pub fn write_report(result: &RankingResult, options: &OutputOptions) -> ReportResult<Vec<PathBuf>> {
    let mut files: Vec<(PathBuf, String)> = Vec::new();

    if options.write_data_files {
        for c in Classification::ALL {
            let content = summary_csv(c, result.summaries(c))?;
            files.push((options.directory.join(data_file_name(c)), content));
        }
    }

    let mut sections: Vec<Section> = Vec::new();
    for c in Classification::ALL {
        let svg = render_svg(c, result.summaries(c));
        files.push((
            options.directory.join(chart_file_name(c)),
            chart_document(chart_title(c), &svg),
        ));
        sections.push(Section {
            classification: c,
            svg,
            summaries: result.summaries(c),
            data_file: if options.write_data_files {
                Some(data_file_name(c))
            } else {
                None
            },
            chart_file: chart_file_name(c),
        });
    }
    files.push((
        options.directory.join(INDEX_FILE),
        render_index(&options.title, &sections),
    ));

    prepare_directory(options)?;
    if !options.overwrite {
        for (path, _) in files.iter() {
            if path.exists() {
                return OutputExistsSnafu {
                    path: path.display().to_string(),
                }
                .fail();
            }
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        write_file(&path, &content)?;
        written.push(path);
    }
    info!(
        "write_report: {} files written to {:?}",
        written.len(),
        options.directory
    );
    Ok(written)
}
