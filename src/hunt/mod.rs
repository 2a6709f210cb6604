//! Hunt engine: team roster, game roster, and progression state.
//!
//! `Progression` is the only writer of state. It is constructed once per
//! browser session and handed to callers by reference; nothing here lives
//! in a static.

pub mod minigame;
pub mod progression;
pub mod roster;
pub mod snapshot;
pub mod store;
pub mod team;
