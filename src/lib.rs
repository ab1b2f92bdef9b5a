//! # Lineup Builder
//!
//! Fantasy esports lineup construction with salary-cap validation.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (events, matches, players, lineups, modes)
//! - **storage**: Fixture snapshot and JSONL lineup storage
//! - **calculate**: Captain-weighted salary and budget arithmetic
//! - **lineup**: Lineup assembly rules and persistence
//! - **stats**: Pass-through client for the event statistics service
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod lineup;
pub mod models;
pub mod stats;
pub mod storage;

pub use models::*;
