use log::info;

use super::types::AggregateTables;
use crate::error::PipelineError;
use crate::report::{AmrMarkerRecord, MicroorganismRecord};

/// Accumulates per-sample records into the two aggregate tables
#[derive(Debug, Default)]
pub struct Aggregator {
    tables: AggregateTables,
}

impl Aggregator {
    pub fn new() -> Self {
        Aggregator::default()
    }

    /// Append the records extracted from one loaded sample. `None` means the
    /// report had no data of that kind. A sample with no data of either kind
    /// still counts as loaded but is also listed in `samples_empty`.
    pub fn add_sample(
        &mut self,
        sample: &str,
        microorganisms: Option<Vec<MicroorganismRecord>>,
        amr_markers: Option<Vec<AmrMarkerRecord>>,
    ) {
        let microorganisms = microorganisms.unwrap_or_default();
        let amr_markers = amr_markers.unwrap_or_default();

        self.tables.samples_loaded.push(sample.to_string());
        if microorganisms.is_empty() && amr_markers.is_empty() {
            self.tables.samples_empty.push(sample.to_string());
        }
        self.tables.microorganisms.extend(microorganisms);
        self.tables.amr_markers.extend(amr_markers);
    }

    /// Record a sample whose report could not be loaded
    pub fn skip_sample(&mut self, sample: &str) {
        self.tables.samples_skipped.push(sample.to_string());
    }

    /// Finish aggregation. Fails when no sample produced a single record of
    /// either kind.
    pub fn finish(self) -> Result<AggregateTables, PipelineError> {
        let tables = self.tables;
        if tables.microorganisms.is_empty() && tables.amr_markers.is_empty() {
            return Err(PipelineError::NoUsableData {
                samples: tables.samples_loaded.len() + tables.samples_skipped.len(),
            });
        }

        info!(
            "Aggregated {} microorganism and {} AMR marker records from {} samples",
            tables.microorganisms.len(),
            tables.amr_markers.len(),
            tables.samples_with_records()
        );
        Ok(tables)
    }
}
