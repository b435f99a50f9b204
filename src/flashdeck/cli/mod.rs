//! # CLI Behavior
//!
//! The `flashdeck` binary is one client of the library. It owns terminal I/O,
//! exit codes and output formatting; everything else lives behind
//! [`flashdeck::api::FlashdeckApi`].
//!
//! ## Naked Execution
//!
//! Running `flashdeck` with no arguments lists the sets, same as `flashdeck sets`.
//!
//! ## References
//!
//! Sets are named by their position in the `sets` listing, their id, or their
//! name. Cards are named by their position in the active set's review order (as
//! printed by `cards`) or by the first characters of their id.
//!
//! ## Study Sessions
//!
//! `flashdeck study` walks the active set one card at a time, reading a single
//! key per line from stdin. Marking a card mastered saves immediately and moves
//! on, so an interrupted session loses nothing.

mod commands;
mod render;
pub mod setup;

pub use commands::run;
