use std::collections::HashMap;
use serde::Serialize;

use crate::report::{AmrMarkerRecord, MicroorganismRecord};

/// Records from every sample, in discovery order then report order
#[derive(Debug, Clone, Default)]
pub struct AggregateTables {
    pub microorganisms: Vec<MicroorganismRecord>,
    pub amr_markers: Vec<AmrMarkerRecord>,
    /// Labels of samples whose report was loaded
    pub samples_loaded: Vec<String>,
    /// Loaded samples whose report held no records of either kind
    pub samples_empty: Vec<String>,
    /// Labels of samples skipped because their report could not be loaded
    pub samples_skipped: Vec<String>,
}

impl AggregateTables {
    /// Number of samples that contributed at least one record
    pub fn samples_with_records(&self) -> usize {
        self.samples_loaded.len() - self.samples_empty.len()
    }

    /// Total aligned reads per sample over all of its microorganisms,
    /// present or not
    pub fn total_aligned_reads(&self) -> HashMap<String, u64> {
        let mut totals = HashMap::new();
        for record in &self.microorganisms {
            *totals.entry(record.sample.clone()).or_insert(0) += record.aligned_read_count;
        }
        totals
    }
}

/// Share of a sample's aligned reads held by one present organism
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelativeAbundanceEntry {
    pub sample: String,
    pub name: Option<String>,
    pub aligned_read_count: u64,
    /// Percentage of the sample's total aligned reads
    pub relative_abundance: f64,
}

/// Present organisms of one sample, ranked by relative abundance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleAbundance {
    pub sample: String,
    pub entries: Vec<RelativeAbundanceEntry>,
}
