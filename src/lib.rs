//! Credence - transcript credibility analysis
//!
//! Turns spoken-word transcripts into a bounded credibility score, a
//! calibration diagnosis (stated certainty vs. verified accuracy) and a
//! ranking against a small reference cohort.

pub mod ai;
pub mod baseline;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod server;
pub mod sources;
pub mod storage;
