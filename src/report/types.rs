/// Aligned read count above which an organism counts as present even when
/// the report does not predict it
pub const PRESENCE_READ_THRESHOLD: u64 = 5;

/// One microorganism entry from a sample report
#[derive(Debug, Clone, PartialEq)]
pub struct MicroorganismRecord {
    pub sample: String,
    pub name: Option<String>,
    pub aligned_read_count: u64,
    /// Average nucleotide identity, rounded to 2 decimals
    pub ani: f64,
    /// Rounded to 2 decimals
    pub rpkm: f64,
    pub class: Option<String>,
    pub phenotypic_group: Option<String>,
    pub predicted_present: bool,
    /// `predicted_present` or more than `PRESENCE_READ_THRESHOLD` aligned reads
    pub presence: bool,
}

/// One antimicrobial resistance marker entry from a sample report
#[derive(Debug, Clone, PartialEq)]
pub struct AmrMarkerRecord {
    pub sample: String,
    pub gene_name: Option<String>,
    pub class: Option<String>,
    pub gene_family: Option<String>,
    /// Rounded to 2 decimals
    pub coverage: f64,
    pub median_depth: Option<f64>,
    /// First entry of the marker's associated microorganisms
    pub associated_microorganism: Option<String>,
    pub predicted_present: bool,
}

impl MicroorganismRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sample: String,
        name: Option<String>,
        aligned_read_count: u64,
        ani: f64,
        rpkm: f64,
        class: Option<String>,
        phenotypic_group: Option<String>,
        predicted_present: bool,
    ) -> Self {
        MicroorganismRecord {
            sample,
            name,
            aligned_read_count,
            ani: round2(ani),
            rpkm: round2(rpkm),
            class,
            phenotypic_group,
            predicted_present,
            presence: predicted_present || aligned_read_count > PRESENCE_READ_THRESHOLD,
        }
    }
}

/// Round to 2 decimal places.
///
/// Rounds the exact stored binary value, with exact ties going to the even
/// digit. 3.005 is stored as 3.00499... and becomes 3.0, 0.125 is an exact
/// tie and becomes 0.12.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Float formatting is correctly rounded, ties to even
    format!("{:.2}", value).parse().unwrap_or(value)
}
