use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarise per-sample microorganism and AMR marker reports")]
pub struct Cli {
    /// Directory containing one sub-directory per sample
    #[arg(short, long, default_value = ".")]
    pub workdir: PathBuf,

    /// Name of the results directory (excluded from sample discovery)
    #[arg(short, long, default_value = "Results")]
    pub results_dir: String,

    /// Stem of report file names and sample labels, e.g. "sample" for sample3.3.report.json
    #[arg(long, default_value = "sample")]
    pub report_stem: String,

    /// Spreadsheet format for the exported tables
    #[arg(short = 'f', long, value_enum, default_value = "xlsx")]
    pub table_format: TableFormat,

    /// Path to log file (defaults to processing_errors.log in the working directory)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.workdir.join("processing_errors.log"))
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum TableFormat {
    Xlsx,
    Tsv,
}

impl From<TableFormat> for crate::io::TableFormat {
    fn from(format: TableFormat) -> Self {
        match format {
            TableFormat::Xlsx => Self::Xlsx,
            TableFormat::Tsv => Self::Tsv,
        }
    }
}
