//! Command-line front end

mod context;
mod run;

pub use run::{RunOptions, run};
