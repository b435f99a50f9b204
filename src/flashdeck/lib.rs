//! # Flashdeck Architecture
//!
//! Flashdeck is a **UI-agnostic flashcard engine**. The `flashdeck` binary is one
//! client of it; nothing below the API layer knows about terminals.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders output, runs study sessions    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Resolves set and card references to ids                  │
//! │  - Flushes to storage after every mutation                  │
//! │  - Owns the study cursor                                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Validation and messages, returns CmdResult               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engine (repository, ordering, mastery, search, backup)     │
//! │  - Repository is the single source of truth                 │
//! │  - Favorites set mirrors every card marked favorite         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait over three raw records              │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Storage Never Blocks Studying
//!
//! Loading tolerates missing or corrupt records by starting empty. Saving failures
//! are reported as warnings on the returned `CmdResult`; the in-memory change
//! stands for the rest of the session.
//!
//! ## Testing Strategy
//!
//! 1. **Engine and commands**: unit tests against `MemBackend` fixtures.
//! 2. **API** (`api.rs`): flush behavior, write failures, reference resolution.
//! 3. **CLI**: argument parsing, rendering to strings, and end-to-end runs of the
//!    binary in `tests/`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`repository`]: Sets, active set, credential and the favorites mirror
//! - [`ordering`]: Review orderings and the cached review queue
//! - [`mastery`]: Mastery counters and state transitions
//! - [`search`]: Substring search across sets
//! - [`index`]: Positions and reference resolution
//! - [`backup`]: Export/import document
//! - [`generation`]: Card generation request, response and HTTP client
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Card`, `CardSet`, `ReviewMode`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod backup;
pub mod commands;
pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod mastery;
pub mod model;
pub mod ordering;
pub mod repository;
pub mod search;
pub mod store;
