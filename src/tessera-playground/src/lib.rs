//! Tessera Playground - small executables for poking at datasets.
//!
//! # Available Binaries
//!
//! - **`dataset-demo`**: builds datasets from ranges, items, or columnar
//!   files and prints their partitioning
//!
//! # Usage
//!
//! ```bash
//! cargo run --package tessera-playground --bin dataset-demo -- range 20 -p 10
//! ```

pub mod utils;

pub use utils::{format_rows, format_values, print_header, print_plan_summary};
