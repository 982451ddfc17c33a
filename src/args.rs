use clap::Parser;

/// Builds the course rankings report of the graduate program exit survey.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the input, the output and the column rules.
    /// Relative paths inside this file are relative to its directory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, optional) A directory containing the expected data files. If provided, the generated
    /// CSV summaries are compared with the files of the same name and the run fails on any difference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory, default public) Where the report is written. Setting this option overrides
    /// the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, default "Grad Program Exit Survey Data 2024.xlsx") The survey export.
    /// Setting this option overrides the file that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (xlsx or csv) The type of the input. By default, guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
