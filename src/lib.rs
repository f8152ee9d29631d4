//! # Budget Adaptors
//!
//! Pure transformations that reshape budget-data API payloads into the
//! shapes chart components consume.
//!
//! - **Phase series**: one amount per financial year, last phase wins.
//! - **Multiples**: per-year amounts, one slot per budget phase.
//! - **Small multiples**: economic classification groups as nested maps.
//! - **Provincial grouping**: department budgets bucketed by the nine provinces.
//! - **Treemaps**: hierarchical amounts sorted largest first at every level.
//! - **Ratios**: bar widths relative to the largest amount plus headroom.
//!
//! ## Example
//!
//! ```rust
//! use budget_adaptors::*;
//!
//! let ratios = add_ratios(&[
//!     RatioInput { title: "Health".to_string(), amount: 400.0 },
//!     RatioInput { title: "Police".to_string(), amount: 100.0 },
//! ]);
//! assert!((ratios[0].ratio - 75.19).abs() < 0.01);
//! ```

pub mod adaptors;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod provinces;
pub mod ratios;
pub mod reports;
pub mod treemap;
pub mod types;
pub mod util;

pub use adaptors::{
    last_wins, normalise_expenditure_multiples, normalise_expenditure_multiples_ordered,
    normalise_expenditure_phase, normalise_expenditure_phase_ordered, normalise_small_multiples,
};
pub use error::{BudgetError, RejectReason, Rejection, Result};
pub use provinces::PROVINCES;
pub use ratios::{add_ratios, RATIO_HEADROOM};
pub use treemap::{add_province_to_object, sort_items, transform_data};
pub use types::*;
