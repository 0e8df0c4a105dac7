pub(crate) mod types;
pub(crate) mod discovery;

pub use types::Sample;
pub use discovery::discover_samples;
