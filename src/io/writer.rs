use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use log::info;
use rust_xlsxwriter::{Format, Workbook};

use crate::report::{AmrMarkerRecord, MicroorganismRecord};

/// Name of the single worksheet in every exported workbook
pub const SHEET_NAME: &str = "Sheet_1";

/// Spreadsheet flavour for table exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Xlsx,
    Tsv,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Xlsx => "xlsx",
            TableFormat::Tsv => "tsv",
        }
    }
}

/// A typed cell value. `None` values are written as empty cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(Option<String>),
    Number(Option<f64>),
    Count(u64),
    Flag(bool),
}

impl Cell {
    fn to_text(&self) -> String {
        match self {
            Cell::Text(value) => value.clone().unwrap_or_default(),
            Cell::Number(value) => value.map(|v| v.to_string()).unwrap_or_default(),
            Cell::Count(value) => value.to_string(),
            Cell::Flag(value) => value.to_string(),
        }
    }
}

/// A record that can be laid out as one spreadsheet row
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;
}

impl TableRow for MicroorganismRecord {
    const HEADERS: &'static [&'static str] = &[
        "Sample",
        "Name",
        "alignedReadCount",
        "ani",
        "rpkm",
        "class",
        "phenotypicGroup",
        "predictedPresent",
        "Presence",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(Some(self.sample.clone())),
            Cell::Text(self.name.clone()),
            Cell::Count(self.aligned_read_count),
            Cell::Number(Some(self.ani)),
            Cell::Number(Some(self.rpkm)),
            Cell::Text(self.class.clone()),
            Cell::Text(self.phenotypic_group.clone()),
            Cell::Flag(self.predicted_present),
            Cell::Flag(self.presence),
        ]
    }
}

impl TableRow for AmrMarkerRecord {
    const HEADERS: &'static [&'static str] = &[
        "SampleID",
        "GeneName",
        "Class",
        "geneFamily",
        "Coverage",
        "medianDepth",
        "associatedMicroorganisms",
        "predictedPresent",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(Some(self.sample.clone())),
            Cell::Text(self.gene_name.clone()),
            Cell::Text(self.class.clone()),
            Cell::Text(self.gene_family.clone()),
            Cell::Number(Some(self.coverage)),
            Cell::Number(self.median_depth),
            Cell::Text(self.associated_microorganism.clone()),
            Cell::Flag(self.predicted_present),
        ]
    }
}

/// Export `rows` to `{dir}/{stem}.{ext}` and return the written path
pub fn write_table<R: TableRow>(
    rows: &[R],
    dir: &Path,
    stem: &str,
    format: TableFormat,
) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    match format {
        TableFormat::Xlsx => write_xlsx(rows, &path),
        TableFormat::Tsv => write_tsv(rows, &path),
    }
    .with_context(|| format!("Failed to write table {}", path.display()))?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

fn write_xlsx<R: TableRow>(rows: &[R], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in R::HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, cell) in row.cells().into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(Some(value)) => {
                    worksheet.write_string(row_num, col, value)?;
                }
                Cell::Number(Some(value)) => {
                    worksheet.write_number(row_num, col, value)?;
                }
                Cell::Count(value) => {
                    worksheet.write_number(row_num, col, value as f64)?;
                }
                Cell::Flag(value) => {
                    worksheet.write_boolean(row_num, col, value)?;
                }
                Cell::Text(None) | Cell::Number(None) => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_tsv<R: TableRow>(rows: &[R], path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(R::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells().iter().map(Cell::to_text))?;
    }
    writer.flush()?;
    Ok(())
}
