//! Solar thermal collector performance evaluation and fault diagnosis.
//!
//! The core pipeline is pure and synchronous: a physics simulator predicts
//! expected thermal behavior, a performance analyzer compares observed
//! against ideal behavior, and a tree-ensemble classifier trained offline on
//! synthetic fault scenarios maps performance observations to fault labels.
//! The HTTP layer, per-user history storage, and configuration wrap that
//! core without adding any domain logic of their own.

pub mod api;
pub mod config;
pub mod domain;
pub mod history;
pub mod ml;
pub mod simulation;
pub mod state;
pub mod telemetry;
