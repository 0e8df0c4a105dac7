use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::{info, warn, Level};
use serde::Serialize;

use crate::aggregate::{relative_abundance, Aggregator, SampleAbundance};
use crate::diagnostics::Diagnostics;
use crate::error::ReportError;
use crate::io::{self, TableFormat};
use crate::report::{extract_amr_markers, extract_microorganisms, load_report, MicroorganismRecord};
use crate::samples::discover_samples;

pub const MICROORGANISMS_TABLE: &str = "Microorganisms_table";
pub const AMR_MARKERS_TABLE: &str = "amrMarkers_table";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Settings for one run
#[derive(Debug, Clone)]
pub struct Config {
    pub workdir: PathBuf,
    pub results_dir: String,
    pub report_stem: String,
    pub table_format: TableFormat,
}

/// What a completed run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub samples_discovered: usize,
    pub samples_loaded: Vec<String>,
    /// Loaded samples that contributed no records
    pub samples_empty: Vec<String>,
    pub samples_skipped: Vec<String>,
    pub microorganism_records: usize,
    pub amr_marker_records: usize,
    pub relative_abundance: Vec<SampleAbundance>,
    pub tables: Vec<PathBuf>,
    pub plots: Vec<PathBuf>,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// No sample directories were found, nothing was produced
    NoSamples,
    Completed(RunSummary),
}

impl RunSummary {
    /// Number of samples that contributed at least one record
    pub fn samples_with_records(&self) -> usize {
        self.samples_loaded.len() - self.samples_empty.len()
    }

    /// Count and log the collected diagnostics
    fn absorb(&mut self, diagnostics: &mut Diagnostics) {
        self.warnings += diagnostics.count(Level::Warn);
        self.errors += diagnostics.count(Level::Error);
        diagnostics.flush();
    }
}

/// Process every sample under `config.workdir` and write tables, charts and
/// a run summary into the results tree.
///
/// Only two conditions abort the run: the results tree cannot be created, or
/// no sample yielded a single record. Everything else is logged and skipped.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let tree = io::setup_results_tree(&config.workdir, &config.results_dir)?;

    let Some(samples) = discover_samples(&config.workdir, &config.results_dir)? else {
        warn!("No sample directories found in {}", config.workdir.display());
        return Ok(RunOutcome::NoSamples);
    };

    let mut summary = RunSummary {
        samples_discovered: samples.len(),
        ..RunSummary::default()
    };
    let mut diagnostics = Diagnostics::new();
    let mut aggregator = Aggregator::new();

    for sample in &samples.samples {
        let label = sample.label(&config.report_stem);
        match load_report(&config.workdir, sample, &config.report_stem) {
            Ok(report) => {
                let microorganisms = extract_microorganisms(&report, &label, &mut diagnostics);
                let amr_markers = extract_amr_markers(&report, &label, &mut diagnostics);
                aggregator.add_sample(&label, microorganisms, amr_markers);
            }
            Err(e @ ReportError::NotFound { .. }) => {
                diagnostics.warn(format!("Skipping {}: {}", label, e));
                aggregator.skip_sample(&label);
            }
            Err(e) => {
                diagnostics.error(format!("Skipping {}: {}", label, e));
                aggregator.skip_sample(&label);
            }
        }
        summary.absorb(&mut diagnostics);
    }

    let tables = aggregator.finish()?;
    summary.samples_loaded = tables.samples_loaded.clone();
    summary.samples_empty = tables.samples_empty.clone();
    summary.samples_skipped = tables.samples_skipped.clone();
    summary.microorganism_records = tables.microorganisms.len();
    summary.amr_marker_records = tables.amr_markers.len();

    // Artifacts are staged in the working directory, then moved into place
    let staging = config.workdir.as_path();
    let mut staged_tables = Vec::new();
    for result in [
        io::write_table(&tables.microorganisms, staging, MICROORGANISMS_TABLE, config.table_format),
        io::write_table(&tables.amr_markers, staging, AMR_MARKERS_TABLE, config.table_format),
    ] {
        match result {
            Ok(path) => staged_tables.push(path),
            Err(e) => diagnostics.error(format!("{:#}", e)),
        }
    }

    let totals = tables.total_aligned_reads();
    summary.relative_abundance = relative_abundance(&tables.microorganisms, &totals, &mut diagnostics);

    let staged_plots = render_charts(&tables.microorganisms, &summary.relative_abundance, staging, &mut diagnostics);

    summary.tables = io::relocate(&staged_tables, &tree.tables, &mut diagnostics);
    summary.plots = io::relocate(&staged_plots, &tree.plots, &mut diagnostics);
    summary.absorb(&mut diagnostics);

    if let Err(e) = write_summary(&summary, &tree.root) {
        diagnostics.error(format!("{:#}", e));
        summary.absorb(&mut diagnostics);
    }

    info!(
        "{} of {} samples contributed records ({} warnings, {} errors)",
        summary.samples_with_records(),
        summary.samples_discovered,
        summary.warnings,
        summary.errors
    );
    Ok(RunOutcome::Completed(summary))
}

fn render_charts(
    microorganisms: &[MicroorganismRecord],
    ranked: &[SampleAbundance],
    dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Vec<PathBuf> {
    if microorganisms.is_empty() {
        diagnostics.warn("No microorganism records, skipping charts");
        return Vec::new();
    }

    let mut charts = vec![
        (io::presence_chart(microorganisms), "predictedPresent.svg".to_string()),
        (io::class_chart(microorganisms), "class.svg".to_string()),
    ];
    charts.extend(
        ranked
            .iter()
            .map(|sample| (io::abundance_chart(sample), io::abundance_chart_name(&sample.sample))),
    );

    let mut paths = Vec::with_capacity(charts.len());
    for (chart, file_name) in &charts {
        match io::write_chart(chart, dir, file_name) {
            Ok(path) => paths.push(path),
            Err(e) => diagnostics.error(format!("Error creating plot {}: {:#}", file_name, e)),
        }
    }
    paths
}

fn write_summary(summary: &RunSummary, dir: &Path) -> Result<()> {
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write run summary {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn config(workdir: &Path, table_format: TableFormat) -> Config {
        Config {
            workdir: workdir.to_path_buf(),
            results_dir: "Results".to_string(),
            report_stem: "sample".to_string(),
            table_format,
        }
    }

    fn write_report(workdir: &Path, dir: &str, id: &str, body: &str) -> Result<()> {
        fs::create_dir_all(workdir.join(dir))?;
        fs::write(workdir.join(dir).join(format!("sample{id}.{id}.report.json")), body)?;
        Ok(())
    }

    const BATCH1_REPORT: &str = r#"{
        "targetReport": {
            "microorganisms": [
                {
                    "name": "Staphylococcus aureus",
                    "alignedReadCount": 80,
                    "ani": 99.456,
                    "rpkm": 10.1,
                    "class": "Bacteria",
                    "phenotypicGroup": "Gram positive",
                    "explifyInterpretation": { "predictedPresent": true }
                },
                {
                    "name": "Cutibacterium acnes",
                    "alignedReadCount": 20,
                    "class": "Bacteria",
                    "explifyInterpretation": { "predictedPresent": false }
                }
            ],
            "amrMarkers": [
                {
                    "name": "mecA",
                    "class": "Beta-lactam",
                    "geneFamily": "PBP2a",
                    "coverage": 100,
                    "medianDepth": 14.5,
                    "associatedMicroorganisms": { "all": ["Staphylococcus aureus"] },
                    "explifyInterpretation": { "predictedPresent": true }
                }
            ]
        }
    }"#;

    #[test]
    fn test_one_sample_missing_report() -> Result<()> {
        let dir = tempdir()?;
        write_report(dir.path(), "batch1", "1", BATCH1_REPORT)?;
        fs::create_dir(dir.path().join("batch2"))?;

        let outcome = run(&config(dir.path(), TableFormat::Tsv))?;
        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.samples_discovered, 2);
        assert_eq!(summary.samples_loaded, vec!["sample1"]);
        assert!(summary.samples_empty.is_empty());
        assert_eq!(summary.samples_skipped, vec!["sample2"]);
        assert_eq!(summary.microorganism_records, 2);
        assert_eq!(summary.amr_marker_records, 1);
        assert!(summary.warnings >= 1);
        assert_eq!(summary.errors, 0);

        assert_eq!(summary.relative_abundance.len(), 1);
        let ranked = &summary.relative_abundance[0];
        assert_eq!(ranked.sample, "sample1");
        assert_eq!(ranked.entries.len(), 1);
        assert_eq!(ranked.entries[0].relative_abundance, 80.0);

        let results = dir.path().join("Results");
        let table = fs::read_to_string(results.join("Tables/Microorganisms_table.tsv"))?;
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().skip(1).all(|line| line.starts_with("sample1\t")));
        assert!(results.join("Tables/amrMarkers_table.tsv").is_file());
        assert!(results.join("Plots/predictedPresent.svg").is_file());
        assert!(results.join("Plots/class.svg").is_file());
        assert!(results.join("Plots/normalised_relativeAbundance_sample1.svg").is_file());
        assert!(results.join(SUMMARY_FILE).is_file());

        // Staged artifacts were moved, not copied
        assert!(!dir.path().join("Microorganisms_table.tsv").exists());
        assert!(!dir.path().join("predictedPresent.svg").exists());

        Ok(())
    }

    #[test]
    fn test_all_reports_missing_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("batch1"))?;
        fs::create_dir(dir.path().join("batch2"))?;

        let err = run(&config(dir.path(), TableFormat::Xlsx)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NoUsableData { samples: 2 })
        ));

        let tables = dir.path().join("Results/Tables");
        assert_eq!(fs::read_dir(&tables)?.count(), 0);
        assert!(!dir.path().join("Microorganisms_table.xlsx").exists());

        Ok(())
    }

    #[test]
    fn test_no_sample_directories() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("notes.txt"), "not a sample")?;

        let outcome = run(&config(dir.path(), TableFormat::Xlsx))?;
        assert!(matches!(outcome, RunOutcome::NoSamples));
        assert!(dir.path().join("Results/Tables").is_dir());

        Ok(())
    }

    #[test]
    fn test_malformed_report_is_skipped() -> Result<()> {
        let dir = tempdir()?;
        write_report(dir.path(), "batch1", "1", BATCH1_REPORT)?;
        write_report(dir.path(), "batch2", "2", "{ \"targetReport\": ")?;

        let RunOutcome::Completed(summary) = run(&config(dir.path(), TableFormat::Xlsx))? else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.samples_skipped, vec!["sample2"]);
        assert_eq!(summary.errors, 1);
        assert!(dir.path().join("Results/Tables/Microorganisms_table.xlsx").is_file());
        assert!(dir.path().join("Results/Tables/amrMarkers_table.xlsx").is_file());

        Ok(())
    }

    #[test]
    fn test_amr_only_run_skips_charts() -> Result<()> {
        let dir = tempdir()?;
        let amr_only = r#"{ "targetReport": { "amrMarkers": [ { "name": "vanA" } ] } }"#;
        write_report(dir.path(), "run1", "1", amr_only)?;
        write_report(dir.path(), "run2", "2", amr_only)?;

        let RunOutcome::Completed(summary) = run(&config(dir.path(), TableFormat::Tsv))? else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.microorganism_records, 0);
        assert_eq!(summary.amr_marker_records, 2);
        assert!(summary.plots.is_empty());
        assert_eq!(summary.tables.len(), 2);

        Ok(())
    }

    #[test]
    fn test_empty_report_does_not_count_as_contributing() -> Result<()> {
        let dir = tempdir()?;
        write_report(dir.path(), "batch1", "1", BATCH1_REPORT)?;
        write_report(dir.path(), "batch2", "2", r#"{ "targetReport": {} }"#)?;

        let RunOutcome::Completed(summary) = run(&config(dir.path(), TableFormat::Tsv))? else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.samples_loaded, vec!["sample1", "sample2"]);
        assert_eq!(summary.samples_empty, vec!["sample2"]);
        assert_eq!(summary.samples_with_records(), 1);
        assert!(summary.warnings >= 2);

        Ok(())
    }

    #[test]
    fn test_single_sample_run() -> Result<()> {
        let dir = tempdir()?;
        write_report(dir.path(), "sample7", "7", BATCH1_REPORT)?;

        let RunOutcome::Completed(summary) = run(&config(dir.path(), TableFormat::Tsv))? else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.samples_discovered, 1);
        assert_eq!(summary.samples_loaded, vec!["sample7"]);
        assert_eq!(summary.microorganism_records, 2);
        assert_eq!(summary.amr_marker_records, 1);

        let table = fs::read_to_string(dir.path().join("Results/Tables/Microorganisms_table.tsv"))?;
        assert!(table.lines().skip(1).all(|line| line.starts_with("sample7\t")));
        assert!(dir.path().join("Results/Plots/normalised_relativeAbundance_sample7.svg").is_file());

        Ok(())
    }

    #[test]
    fn test_rerun_overwrites_results() -> Result<()> {
        let dir = tempdir()?;
        write_report(dir.path(), "batch1", "1", BATCH1_REPORT)?;
        write_report(dir.path(), "batch2", "2", BATCH1_REPORT)?;

        run(&config(dir.path(), TableFormat::Tsv))?;
        let RunOutcome::Completed(summary) = run(&config(dir.path(), TableFormat::Tsv))? else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.errors, 0);
        assert_eq!(summary.tables.len(), 2);
        let table = fs::read_to_string(dir.path().join("Results/Tables/Microorganisms_table.tsv"))?;
        assert_eq!(table.lines().count(), 5);

        Ok(())
    }
}
