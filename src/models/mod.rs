//! Core data models for the lineup builder.

mod event;
mod ids;
mod lineup;
mod matchup;
mod mode;
mod player;

pub use event::*;
pub use ids::*;
pub use lineup::*;
pub use matchup::*;
pub use mode::*;
pub use player::*;
