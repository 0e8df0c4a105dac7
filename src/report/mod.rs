pub(crate) mod types;
pub(crate) mod loader;
pub(crate) mod extract;

pub use types::{AmrMarkerRecord, MicroorganismRecord};
pub use loader::load_report;
pub use extract::{extract_amr_markers, extract_microorganisms};
