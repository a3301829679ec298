//! Domain layer: the menu model
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod menu;
mod raw;

pub use entities::{Button, ButtonAction, ButtonKind};
pub use error::{DomainError, DomainResult, PayloadField};
pub use menu::Menu;
