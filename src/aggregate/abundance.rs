use std::collections::HashMap;

use super::types::{RelativeAbundanceEntry, SampleAbundance};
use crate::diagnostics::Diagnostics;
use crate::report::MicroorganismRecord;

/// Rank each sample's predicted-present organisms by their share of the
/// sample's total aligned reads.
///
/// Samples come out in the order they first appear in `microorganisms`.
/// A sample without present organisms is left out silently; one whose total
/// is zero or unknown is left out with a warning.
pub fn relative_abundance(
    microorganisms: &[MicroorganismRecord],
    totals: &HashMap<String, u64>,
    diagnostics: &mut Diagnostics,
) -> Vec<SampleAbundance> {
    let mut order: Vec<&str> = Vec::new();
    let mut present: HashMap<&str, Vec<&MicroorganismRecord>> = HashMap::new();
    for record in microorganisms.iter().filter(|r| r.predicted_present) {
        let sample = record.sample.as_str();
        if !present.contains_key(sample) {
            order.push(sample);
        }
        present.entry(sample).or_default().push(record);
    }

    let mut ranked = Vec::with_capacity(order.len());
    for sample in order {
        let total = match totals.get(sample) {
            Some(&total) if total > 0 => total,
            _ => {
                diagnostics.warn(format!(
                    "Skipping relative abundance for {}: total reads not found or zero",
                    sample
                ));
                continue;
            }
        };

        let mut entries: Vec<RelativeAbundanceEntry> = present[sample]
            .iter()
            .map(|record| RelativeAbundanceEntry {
                sample: sample.to_string(),
                name: record.name.clone(),
                aligned_read_count: record.aligned_read_count,
                relative_abundance: record.aligned_read_count as f64 / total as f64 * 100.0,
            })
            .collect();
        // Stable, so ties keep report order
        entries.sort_by(|a, b| b.relative_abundance.total_cmp(&a.relative_abundance));

        ranked.push(SampleAbundance {
            sample: sample.to_string(),
            entries,
        });
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use pretty_assertions::assert_eq;

    fn organism(sample: &str, name: &str, aligned: u64, predicted: bool) -> MicroorganismRecord {
        MicroorganismRecord::new(
            sample.to_string(),
            Some(name.to_string()),
            aligned,
            0.0,
            0.0,
            None,
            None,
            predicted,
        )
    }

    fn totals_of(records: &[MicroorganismRecord]) -> HashMap<String, u64> {
        let mut totals = HashMap::new();
        for record in records {
            *totals.entry(record.sample.clone()).or_insert(0) += record.aligned_read_count;
        }
        totals
    }

    #[test]
    fn test_single_present_organism() {
        let records = vec![
            organism("batch1", "Staphylococcus aureus", 80, true),
            organism("batch1", "Cutibacterium acnes", 20, false),
        ];
        let mut diagnostics = Diagnostics::new();

        let ranked = relative_abundance(&records, &totals_of(&records), &mut diagnostics);

        assert_eq!(
            ranked,
            vec![SampleAbundance {
                sample: "batch1".to_string(),
                entries: vec![RelativeAbundanceEntry {
                    sample: "batch1".to_string(),
                    name: Some("Staphylococcus aureus".to_string()),
                    aligned_read_count: 80,
                    relative_abundance: 80.0,
                }],
            }]
        );
        assert!(diagnostics.entries().is_empty());
    }

    #[test]
    fn test_ranked_descending_with_stable_ties() {
        let records = vec![
            organism("s1", "low", 10, true),
            organism("s1", "tie_first", 30, true),
            organism("s1", "high", 50, true),
            organism("s1", "tie_second", 30, true),
        ];
        let mut diagnostics = Diagnostics::new();

        let ranked = relative_abundance(&records, &totals_of(&records), &mut diagnostics);
        let names: Vec<_> = ranked[0]
            .entries
            .iter()
            .map(|e| e.name.as_deref().unwrap_or(""))
            .collect();

        assert_eq!(names, vec!["high", "tie_first", "tie_second", "low"]);
    }

    #[test]
    fn test_sum_matches_present_share_of_total() {
        let records = vec![
            organism("s1", "a", 25, true),
            organism("s1", "b", 15, true),
            organism("s1", "c", 60, false),
        ];
        let mut diagnostics = Diagnostics::new();

        let ranked = relative_abundance(&records, &totals_of(&records), &mut diagnostics);
        let sum: f64 = ranked[0].entries.iter().map(|e| e.relative_abundance).sum();

        assert!((sum - 100.0 * 40.0 / 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_is_skipped_with_warning() {
        let records = vec![organism("s1", "a", 0, true), organism("s2", "b", 4, true)];
        let mut diagnostics = Diagnostics::new();

        let ranked = relative_abundance(&records, &totals_of(&records), &mut diagnostics);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].sample, "s2");
        assert_eq!(ranked[0].entries[0].relative_abundance, 100.0);
        assert_eq!(diagnostics.count_at_least(Level::Warn), 1);
    }

    #[test]
    fn test_missing_total_is_skipped_with_warning() {
        let records = vec![organism("s1", "a", 12, true)];
        let mut diagnostics = Diagnostics::new();

        let ranked = relative_abundance(&records, &HashMap::new(), &mut diagnostics);

        assert!(ranked.is_empty());
        assert_eq!(diagnostics.count_at_least(Level::Warn), 1);
    }

    #[test]
    fn test_sample_without_present_organisms_is_silent() {
        let records = vec![organism("s1", "a", 100, false), organism("s2", "b", 7, true)];
        let mut diagnostics = Diagnostics::new();

        let ranked = relative_abundance(&records, &totals_of(&records), &mut diagnostics);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].sample, "s2");
        assert!(diagnostics.entries().is_empty());
    }
}
