use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use log::debug;
use serde_json::Value;

use crate::error::ReportError;
use crate::samples::Sample;

/// Location of a sample's report: `{workdir}/{dir}/{stem}{id}.{id}.report.json`
pub fn report_path(workdir: &Path, sample: &Sample, stem: &str) -> PathBuf {
    workdir
        .join(&sample.dir_name)
        .join(format!("{}{}.{}.report.json", stem, sample.id, sample.id))
}

/// Read and parse the report for one sample
pub fn load_report(workdir: &Path, sample: &Sample, stem: &str) -> Result<Value, ReportError> {
    let path = report_path(workdir, sample, stem);
    debug!("Loading report {}", path.display());

    let contents = std::fs::read_to_string(&path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ReportError::NotFound { path: path.clone() },
        _ => ReportError::Io {
            path: path.clone(),
            source,
        },
    })?;

    serde_json::from_str(&contents).map_err(|source| ReportError::Unreadable { path, source })
}
