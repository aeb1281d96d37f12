//! Courtline Core - NBA moneyline edge detection.
//!
//! This module provides:
//! - Season stats and schedule acquisition (basketball-reference HTML tables)
//! - Historical game cleaning and the stats join that builds the training table
//! - Feature engineering with an explicitly tracked schema
//! - A calibrated home-win probability model
//! - American/decimal odds conversion and per-side EV computation
//! - Fuzzy team-name matching between odds feeds and the stats table

mod error;
mod types;

pub mod clients;
pub mod config;
pub mod evaluate;
pub mod features;
pub mod odds;
pub mod processing;
pub mod utils;
pub mod win_prob;

pub use config::EngineConfig;
pub use error::{CoreError, Result};
pub use types::*;
