pub(crate) mod types;
pub(crate) mod tables;
pub(crate) mod abundance;

pub use types::SampleAbundance;
pub use tables::Aggregator;
pub use abundance::relative_abundance;
