//! Entry points shared by the `harvest` and `harvest-predict` binaries.
pub mod layout;
pub mod pipeline;

pub use layout::Layout;
pub use pipeline::{PredictOptions, RunOutcome, ScrapeOptions, run_predict, run_scrape};
