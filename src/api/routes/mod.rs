pub mod events;
pub mod lineups;
pub mod matches;
pub mod meta;
pub mod stats;
