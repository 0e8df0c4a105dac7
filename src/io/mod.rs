pub(crate) mod writer;
pub(crate) mod charts;
pub(crate) mod results;

pub use writer::{write_table, TableFormat};
pub use charts::{abundance_chart, abundance_chart_name, class_chart, presence_chart, write_chart};
pub use results::{relocate, setup_results_tree};
