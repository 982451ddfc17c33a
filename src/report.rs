use log::{debug, info, warn};

use course_ranking::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::report::config_reader::*;
use crate::report::output::OutputOptions;

pub mod chart;
pub mod config_reader;
pub mod html;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod output;

pub const DEFAULT_INPUT_FILE: &str = "Grad Program Exit Survey Data 2024.xlsx";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "public";
pub const DEFAULT_TITLE: &str = "MAcc Program Course Rankings 2024";
/// The second physical row holds the question text.
pub const DEFAULT_HEADER_ROW_INDEX: usize = 1;

#[derive(Debug, Snafu)]
pub enum ReportError {
    // Loading
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Cannot find worksheet {name:?} in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("No header at row index {row} in {path}"))]
    MissingHeader { row: usize, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Input provider not implemented: {provider:?}"))]
    UnknownProvider { provider: String },

    // Configuration
    #[snafu(display("Error opening configuration {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing configuration {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error reading number in configuration"))]
    ParsingJsonNumber {},

    #[snafu(display("Cannot compute the rankings: {source}"))]
    Ranking { source: RankingErrors },

    // Rendering
    #[snafu(display("Cannot create output directory {path}"))]
    CreatingOutputDir {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Output directory {path} does not exist"))]
    MissingOutputDir { path: String },
    #[snafu(display("Refusing to overwrite {path}"))]
    OutputExists { path: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing {name}"))]
    SerializingCsv { source: csv::Error, name: String },

    // Reference check
    #[snafu(display("Error opening reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between {path} and the reference {reference}"))]
    ReferenceMismatch { path: String, reference: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The type of input file.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Xlsx,
    Csv,
}

impl Provider {
    pub fn from_name(name: &str) -> ReportResult<Provider> {
        match name {
            "xlsx" | "excel" => Ok(Provider::Xlsx),
            "csv" => Ok(Provider::Csv),
            x => UnknownProviderSnafu { provider: x }.fail(),
        }
    }

    /// CSV files are recognized by their extension, everything else is read as Excel.
    pub fn from_path(path: &Path) -> Provider {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Provider::Csv,
            _ => Provider::Xlsx,
        }
    }
}

/// Where and how to read the survey.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InputSource {
    pub path: PathBuf,
    pub provider: Provider,
    pub header_row_index: usize,
    pub excel_worksheet_name: Option<String>,
}

/// Everything a run needs, after merging the configuration file and the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportSettings {
    pub input: InputSource,
    pub output: OutputOptions,
    pub rules: SurveyRules,
    pub reference: Option<PathBuf>,
}

fn resolve(root: &Path, p: &str) -> PathBuf {
    let path = Path::new(p);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Merges the configuration file (if any) and the command line options.
///
/// Command line options take precedence. Relative paths found in the
/// configuration file are relative to the directory of that file.
pub fn settings_from_args(args: &Args) -> ReportResult<ReportSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (ReportConfig::default(), PathBuf::new()),
    };
    info!("config: {:?}", config);

    let input_settings = config.input_settings.clone().unwrap_or_default();
    let output_settings = config.output_settings.clone().unwrap_or_default();

    let path: PathBuf = match (&args.input, &input_settings.file_path) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => resolve(&root, p),
        (None, None) => resolve(&root, DEFAULT_INPUT_FILE),
    };
    let provider = match args.input_type.as_ref().or(input_settings.provider.as_ref()) {
        Some(name) => Provider::from_name(name)?,
        None => Provider::from_path(&path),
    };
    let header_row_index = input_settings
        .header_row_index()?
        .unwrap_or(DEFAULT_HEADER_ROW_INDEX);
    let excel_worksheet_name = args
        .excel_worksheet_name
        .clone()
        .or_else(|| input_settings.excel_worksheet_name.clone());

    let directory: PathBuf = match (&args.out, &output_settings.output_directory) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => resolve(&root, p),
        (None, None) => resolve(&root, DEFAULT_OUTPUT_DIRECTORY),
    };

    let rules = match &config.rules {
        Some(r) => r.survey_rules()?,
        None => SurveyRules::default(),
    };

    Ok(ReportSettings {
        input: InputSource {
            path,
            provider,
            header_row_index,
            excel_worksheet_name,
        },
        output: OutputOptions {
            directory,
            title: output_settings
                .title
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            create_directory: output_settings.create_directory.unwrap_or(true),
            overwrite: output_settings.overwrite.unwrap_or(true),
            write_data_files: output_settings.write_data_files.unwrap_or(true),
        },
        rules,
        reference: args.reference.as_ref().map(PathBuf::from),
    })
}

/// Reads the survey with the reader matching the provider.
pub fn read_survey(input: &InputSource, rules: &SurveyRules) -> ReportResult<SurveyTable> {
    let p = input.path.display().to_string();
    info!("Attempting to read survey file {:?}", p);
    let table = match input.provider {
        Provider::Xlsx => io_xlsx::read_excel_file(
            &p,
            input.header_row_index,
            input.excel_worksheet_name.as_deref(),
            rules,
        ),
        Provider::Csv => io_csv::read_csv_file(&p, input.header_row_index, rules),
    }?;
    info!(
        "read_survey: {} columns, {} responses",
        table.columns.len(),
        table.rows.len()
    );
    Ok(table)
}

/// Compares the generated data files with the files of the same name in the reference directory.
fn check_reference(written: &[PathBuf], reference_dir: &Path) -> ReportResult<()> {
    let mut mismatch: Option<(String, String)> = None;
    for path in written.iter() {
        let name = match path.file_name() {
            Some(n) => n,
            None => continue,
        };
        let ref_path = reference_dir.join(name);
        let p = path.display().to_string();
        let rp = ref_path.display().to_string();
        let expected = fs::read_to_string(&ref_path).context(OpeningReferenceSnafu {
            path: rp.clone(),
        })?;
        let actual = fs::read_to_string(path).context(OpeningReferenceSnafu { path: p.clone() })?;
        debug!("check_reference: {:?} against {:?}", p, rp);
        if expected != actual {
            warn!("Found differences with the reference file {:?}", rp);
            print_diff(expected.as_str(), actual.as_str(), "\n");
            mismatch.get_or_insert((p, rp));
        }
    }
    match mismatch {
        Some((path, reference)) => ReferenceMismatchSnafu { path, reference }.fail(),
        None => Ok(()),
    }
}

/// Runs the whole pipeline and returns the path of the generated page.
pub fn run_report(settings: &ReportSettings) -> ReportResult<PathBuf> {
    info!("settings: {:?}", settings);
    let table = read_survey(&settings.input, &settings.rules)?;

    let result = run_rankings(&table, &settings.rules).context(RankingSnafu {})?;
    debug!("rankings: {:?}", result);

    let written = output::write_report(&result, &settings.output)?;

    if let Some(reference_dir) = &settings.reference {
        let data_files: Vec<PathBuf> = written
            .iter()
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("csv"))
            .cloned()
            .collect();
        if data_files.is_empty() {
            whatever!("No data file written, nothing to compare with the reference");
        }
        check_reference(&data_files, reference_dir)?;
    }

    Ok(settings.output.directory.join(output::INDEX_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORE_COL: &str =
        "Please place each MAcc CORE course into rank order of preference - Tax Research";
    const ELECTIVE_COL: &str = "Rate the following elective on a scale from 1-5 - Data Analytics";

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "course-report-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_survey(dir: &Path, responses: &[[&str; 3]]) -> PathBuf {
        let path = dir.join("survey.csv");
        let mut wtr = csv::Writer::from_path(&path).unwrap();
        wtr.write_record(["ResponseId", "Q1_1", "Q2_1"]).unwrap();
        wtr.write_record(["Response ID", CORE_COL, ELECTIVE_COL])
            .unwrap();
        wtr.write_record([
            r#"{"ImportId":"_recordId"}"#,
            r#"{"ImportId":"QID1_1"}"#,
            r#"{"ImportId":"QID2_1"}"#,
        ])
        .unwrap();
        for r in responses {
            wtr.write_record(r).unwrap();
        }
        wtr.flush().unwrap();
        path
    }

    fn settings(input: PathBuf, out: PathBuf) -> ReportSettings {
        ReportSettings {
            input: InputSource {
                path: input,
                provider: Provider::Csv,
                header_row_index: DEFAULT_HEADER_ROW_INDEX,
                excel_worksheet_name: None,
            },
            output: OutputOptions {
                directory: out,
                title: DEFAULT_TITLE.to_string(),
                create_directory: true,
                overwrite: true,
                write_data_files: true,
            },
            rules: SurveyRules::default(),
            reference: None,
        }
    }

    const RESPONSES: [[&str; 3]; 3] = [["R_1", "1", "4"], ["R_2", "2", "5"], ["R_3", "x", ""]];

    fn lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn end_to_end_csv() {
        init();
        let dir = scratch_dir("e2e");
        let input = write_survey(&dir, &RESPONSES);
        let out = dir.join("public");
        let index = run_report(&settings(input, out.clone())).unwrap();
        assert_eq!(index, out.join("index.html"));

        assert_eq!(
            lines(&out.join("core_courses_ranking.csv")),
            vec!["Course,Mean Rank,Rank", "Tax Research,1.5,1"]
        );
        assert_eq!(
            lines(&out.join("elective_courses_rating.csv")),
            vec!["Course,Mean Rating,Rank", "Data Analytics,4.5,1"]
        );

        let page = fs::read_to_string(&index).unwrap();
        assert!(page.contains("Tax Research"));
        assert!(page.contains("Data Analytics"));
        assert_eq!(page.matches("<svg").count(), 2);
        assert!(page.contains(r#"href="core_courses_ranking.csv""#));
        assert!(page.contains(r#"href="elective_chart.html""#));
        assert!(page.contains("<td>1.50</td>"));
        assert!(page.contains("<td>4.50</td>"));

        let core_chart = fs::read_to_string(out.join("core_chart.html")).unwrap();
        assert!(core_chart.contains("<svg"));
        assert!(core_chart.contains("1.50"));
    }

    fn survey_workbook() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("survey.xlsx")
    }

    fn xlsx_settings(out: PathBuf) -> ReportSettings {
        let input = survey_workbook();
        let mut s = settings(input.clone(), out);
        s.input.provider = Provider::from_path(&input);
        s
    }

    #[test]
    fn end_to_end_xlsx() {
        init();
        let dir = scratch_dir("e2e-xlsx");
        let out = dir.join("public");
        let s = xlsx_settings(out.clone());
        assert_eq!(s.input.provider, Provider::Xlsx);
        let index = run_report(&s).unwrap();
        assert_eq!(index, out.join("index.html"));

        assert_eq!(
            lines(&out.join("core_courses_ranking.csv")),
            vec![
                "Course,Mean Rank,Rank",
                "Tax Research,1.5,1",
                "Audit,1.75,2"
            ]
        );
        assert_eq!(
            lines(&out.join("elective_courses_rating.csv")),
            vec!["Course,Mean Rating,Rank", "Data Analytics,4.5,1"]
        );

        let page = fs::read_to_string(&index).unwrap();
        assert_eq!(page.matches("<svg").count(), 2);
        assert!(page.contains("<td>1.75</td>"));
        assert!(!page.contains("ImportId"));
    }

    #[test]
    fn xlsx_field_ids_drive_the_mappings() {
        let dir = scratch_dir("xlsx-mapping");
        let out = dir.join("public");
        let mut s = xlsx_settings(out.clone());
        s.rules.elective.field_mappings = vec![FieldMapping {
            field_id: "QID1_2".to_string(),
            course: Some("Auditing".to_string()),
        }];
        run_report(&s).unwrap();

        assert_eq!(
            lines(&out.join("core_courses_ranking.csv")),
            vec!["Course,Mean Rank,Rank", "Tax Research,1.5,1"]
        );
        assert_eq!(
            lines(&out.join("elective_courses_rating.csv")),
            vec![
                "Course,Mean Rating,Rank",
                "Data Analytics,4.5,1",
                "Auditing,1.75,2"
            ]
        );
    }

    #[test]
    fn reruns_are_identical() {
        let dir = scratch_dir("rerun");
        let input = write_survey(&dir, &RESPONSES);
        let out = dir.join("public");
        let s = settings(input, out.clone());
        let names = [
            "core_courses_ranking.csv",
            "elective_courses_rating.csv",
            "core_chart.html",
            "elective_chart.html",
            "index.html",
        ];
        run_report(&s).unwrap();
        let first: Vec<Vec<u8>> = names.iter().map(|n| fs::read(out.join(n)).unwrap()).collect();
        run_report(&s).unwrap();
        let second: Vec<Vec<u8>> = names.iter().map(|n| fs::read(out.join(n)).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn refuses_to_overwrite_when_asked() {
        let dir = scratch_dir("overwrite");
        let input = write_survey(&dir, &RESPONSES);
        let mut s = settings(input, dir.join("public"));
        s.output.overwrite = false;
        run_report(&s).unwrap();
        let res = run_report(&s);
        assert!(matches!(res, Err(ReportError::OutputExists { .. })));
    }

    #[test]
    fn missing_output_directory_is_an_error_without_create() {
        let dir = scratch_dir("nocreate");
        let input = write_survey(&dir, &RESPONSES);
        let mut s = settings(input, dir.join("absent"));
        s.output.create_directory = false;
        let res = run_report(&s);
        assert!(matches!(res, Err(ReportError::MissingOutputDir { .. })));
        assert!(!dir.join("absent").exists());
    }

    #[test]
    fn data_files_are_optional() {
        let dir = scratch_dir("nodata");
        let input = write_survey(&dir, &RESPONSES);
        let out = dir.join("public");
        let mut s = settings(input, out.clone());
        s.output.write_data_files = false;
        run_report(&s).unwrap();
        assert!(!out.join("core_courses_ranking.csv").exists());
        let page = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(!page.contains(".csv"));
        assert!(page.contains(r#"href="core_chart.html""#));
    }

    #[test]
    fn reference_check() {
        init();
        let dir = scratch_dir("reference");
        let input = write_survey(&dir, &RESPONSES);
        let expected = dir.join("expected");
        run_report(&settings(input.clone(), expected.clone())).unwrap();

        let mut s = settings(input, dir.join("public"));
        s.reference = Some(expected.clone());
        run_report(&s).unwrap();

        fs::write(
            expected.join("core_courses_ranking.csv"),
            "Course,Mean Rank,Rank\nTax Research,2.0,1\n",
        )
        .unwrap();
        let res = run_report(&s);
        assert!(matches!(res, Err(ReportError::ReferenceMismatch { .. })));
    }

    #[test]
    fn missing_input_fails() {
        let dir = scratch_dir("missing");
        let s = settings(dir.join("nope.csv"), dir.join("public"));
        assert!(matches!(run_report(&s), Err(ReportError::CsvOpen { .. })));
        assert!(!dir.join("public").exists());
    }

    #[test]
    fn providers() {
        assert_eq!(Provider::from_name("csv").unwrap(), Provider::Csv);
        assert_eq!(Provider::from_name("xlsx").unwrap(), Provider::Xlsx);
        assert!(Provider::from_name("ods").is_err());
        assert_eq!(Provider::from_path(Path::new("a/b.CSV")), Provider::Csv);
        assert_eq!(
            Provider::from_path(Path::new(DEFAULT_INPUT_FILE)),
            Provider::Xlsx
        );
    }

    #[test]
    fn defaults_without_arguments() {
        let args = Args::default();
        let s = settings_from_args(&args).unwrap();
        assert_eq!(s.input.path, PathBuf::from(DEFAULT_INPUT_FILE));
        assert_eq!(s.input.provider, Provider::Xlsx);
        assert_eq!(s.input.header_row_index, 1);
        assert_eq!(s.output.directory, PathBuf::from("public"));
        assert!(s.output.create_directory && s.output.overwrite && s.output.write_data_files);
        assert_eq!(s.rules, SurveyRules::default());
    }

    #[test]
    fn configuration_file_and_overrides() {
        let dir = scratch_dir("config");
        let config_path = dir.join("report.json");
        fs::write(
            &config_path,
            r#"{
                "inputSettings": {"filePath": "data/survey.csv", "headerRowIndex": "0"},
                "outputSettings": {"outputDirectory": "site", "overwrite": false,
                                   "title": "Exit Survey 2025"},
                "rules": {"undefinedMeans": "first",
                          "elective": {"fieldMappings": [{"fieldId": "QID9_1"}]}}
            }"#,
        )
        .unwrap();
        let args = Args {
            config: Some(config_path.display().to_string()),
            out: Some("elsewhere".to_string()),
            ..Args::default()
        };
        let s = settings_from_args(&args).unwrap();
        assert_eq!(s.input.path, dir.join("data/survey.csv"));
        assert_eq!(s.input.provider, Provider::Csv);
        assert_eq!(s.input.header_row_index, 0);
        assert_eq!(s.output.directory, PathBuf::from("elsewhere"));
        assert_eq!(s.output.title, "Exit Survey 2025");
        assert!(!s.output.overwrite);
        assert_eq!(s.rules.undefined_means, UndefinedMeanOrder::First);
        assert_eq!(s.rules.elective.field_mappings.len(), 1);
        // Patterns not given in the file keep their default.
        assert_eq!(s.rules.elective.contains, SurveyRules::default().elective.contains);
        assert_eq!(s.rules.core, SurveyRules::default().core);
    }
}
