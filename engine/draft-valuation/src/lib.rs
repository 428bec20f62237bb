//! # Draft Valuation Engine
//!
//! Scores historical fantasy football draft picks against what the league
//! normally gets at the same slot.
//!
//! Season points are aggregated per player, converted to value over
//! replacement (VOR) using per-position replacement levels, and compared with
//! an empirical expectation table keyed by (position, overall pick). The
//! residual is calibrated per working set and drives every ranking view.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod curve;
pub mod error;
pub mod expected_value;
pub mod logging;
pub mod ranges;
pub mod ranking;
pub mod replacement;
pub mod service;
pub mod store;
pub mod types;
pub mod valuation;

pub use config::ValuationConfig;
pub use error::{Result, ValuationError};
pub use logging::initialize_logging;
pub use ranking::DraftAnalytics;
pub use service::ValuationService;
pub use store::{Corpus, InMemoryStore, JsonDirStore, RecordStore};
pub use types::{DraftPick, Owner, Player, Position, RosterEntry, Season, Team};
pub use valuation::{Calibration, ValuationContext};
