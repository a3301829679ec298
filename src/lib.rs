//! Official-account action menu model and editor.
//!
//! The core is [`domain`]: a two-level tree of typed buttons with validation,
//! JSON round-trip and index-based reordering. The other layers load and store
//! menu files and expose the model on the command line.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{Button, ButtonAction, ButtonKind, DomainError, DomainResult, Menu};
