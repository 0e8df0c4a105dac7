use serde_json::Value;

use super::types::{AmrMarkerRecord, MicroorganismRecord, round2};
use crate::diagnostics::Diagnostics;

pub const MICROORGANISMS_POINTER: &str = "/targetReport/microorganisms";
pub const AMR_MARKERS_POINTER: &str = "/targetReport/amrMarkers";

const PREDICTED_PRESENT_POINTER: &str = "/explifyInterpretation/predictedPresent";
const ASSOCIATED_MICROORGANISMS_POINTER: &str = "/associatedMicroorganisms/all";

/// Pull every microorganism out of a report.
///
/// Returns `None` when the report has no microorganism list or the list is
/// empty. Individual entries never fail: missing fields take their defaults.
pub fn extract_microorganisms(
    report: &Value,
    sample: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<MicroorganismRecord>> {
    let Some(entries) = non_empty_list(report, MICROORGANISMS_POINTER) else {
        diagnostics.warn(format!("No microorganism data found for {}", sample));
        return None;
    };

    let records = entries
        .iter()
        .map(|entry| {
            MicroorganismRecord::new(
                sample.to_string(),
                string_at(entry, "/name"),
                count_at(entry, "/alignedReadCount"),
                number_at(entry, "/ani").unwrap_or(0.0),
                number_at(entry, "/rpkm").unwrap_or(0.0),
                string_at(entry, "/class"),
                string_at(entry, "/phenotypicGroup"),
                bool_at(entry, PREDICTED_PRESENT_POINTER),
            )
        })
        .collect();

    Some(records)
}

/// Pull every AMR marker out of a report, same contract as
/// `extract_microorganisms`
pub fn extract_amr_markers(
    report: &Value,
    sample: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Vec<AmrMarkerRecord>> {
    let Some(entries) = non_empty_list(report, AMR_MARKERS_POINTER) else {
        diagnostics.warn(format!("No AMR markers data found for {}", sample));
        return None;
    };

    let records = entries
        .iter()
        .map(|entry| {
            let associated_microorganism = first_associated_microorganism(entry);
            if associated_microorganism.is_none() {
                diagnostics.debug(format!(
                    "AMR marker {:?} in {} has no associated microorganism",
                    string_at(entry, "/name"),
                    sample
                ));
            }

            AmrMarkerRecord {
                sample: sample.to_string(),
                gene_name: string_at(entry, "/name"),
                class: string_at(entry, "/class"),
                gene_family: string_at(entry, "/geneFamily"),
                coverage: round2(number_at(entry, "/coverage").unwrap_or(0.0)),
                median_depth: number_at(entry, "/medianDepth"),
                associated_microorganism,
                predicted_present: bool_at(entry, PREDICTED_PRESENT_POINTER),
            }
        })
        .collect();

    Some(records)
}

fn non_empty_list<'a>(report: &'a Value, pointer: &str) -> Option<&'a Vec<Value>> {
    report
        .pointer(pointer)
        .and_then(Value::as_array)
        .filter(|entries| !entries.is_empty())
}

/// First element of `associatedMicroorganisms.all`, either a bare name or an
/// object carrying a `name`
fn first_associated_microorganism(entry: &Value) -> Option<String> {
    let first = entry
        .pointer(ASSOCIATED_MICROORGANISMS_POINTER)
        .and_then(Value::as_array)
        .and_then(|all| all.first())?;

    match first {
        Value::String(name) => Some(name.clone()),
        Value::Object(_) => string_at(first, "/name"),
        _ => None,
    }
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_owned)
}

fn number_at(value: &Value, pointer: &str) -> Option<f64> {
    value.pointer(pointer).and_then(Value::as_f64)
}

fn bool_at(value: &Value, pointer: &str) -> bool {
    value.pointer(pointer).and_then(Value::as_bool).unwrap_or(false)
}

/// Read counts are integers; a non-negative float is truncated and anything
/// else counts as zero
fn count_at(value: &Value, pointer: &str) -> u64 {
    let Some(count) = value.pointer(pointer) else {
        return 0;
    };
    count
        .as_u64()
        .or_else(|| count.as_f64().filter(|c| c.is_finite() && *c >= 0.0).map(|c| c as u64))
        .unwrap_or(0)
}
