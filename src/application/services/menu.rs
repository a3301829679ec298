//! Menu file service
//!
//! Loads and stores menu JSON files, applies edits and enforces the entry
//! caps of the account platform, which the domain model leaves open.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Limits;
use crate::domain::{Button, ButtonAction, Menu};
use crate::infrastructure::traits::FileSystem;

/// A menu that is structurally valid but exceeds a platform cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitViolation {
    TooManyTopLevel {
        count: usize,
        max: usize,
    },
    TooManySubButtons {
        top_idx: usize,
        name: String,
        count: usize,
        max: usize,
    },
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitViolation::TooManyTopLevel { count, max } => {
                write!(f, "{} top-level buttons (max {})", count, max)
            }
            LimitViolation::TooManySubButtons {
                top_idx,
                name,
                count,
                max,
            } => write!(
                f,
                "button {} '{}' has {} sub buttons (max {})",
                top_idx, name, count, max
            ),
        }
    }
}

/// Service for reading, editing and writing menu files.
pub struct MenuService {
    fs: Arc<dyn FileSystem>,
    limits: Limits,
}

impl MenuService {
    pub fn new(fs: Arc<dyn FileSystem>, limits: Limits) -> Self {
        Self { fs, limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Read and rebuild a menu file. A directory counts as missing.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Menu> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::MenuNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read menu", path)?;
        let menu = Menu::from_json(&content)?;
        debug!("load: {} top-level buttons", menu.len());
        Ok(menu)
    }

    #[instrument(level = "debug", skip(self, menu))]
    pub fn save(&self, path: &Path, menu: &Menu, pretty: bool) -> ApplicationResult<()> {
        let content = if pretty {
            menu.to_json_pretty()?
        } else {
            menu.to_json()
        };
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &format!("{}\n", content))
            .with_path_context("write menu", path)?;
        Ok(())
    }

    /// Create an empty menu file. Existing files are kept unless `force` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn init(&self, path: &Path, force: bool, pretty: bool) -> ApplicationResult<()> {
        if self.fs.exists(path) && !force {
            return Err(ApplicationError::MenuExists(path.to_path_buf()));
        }
        self.save(path, &Menu::default(), pretty)
    }

    /// Load, apply `edit`, and write back. Nothing is written if `edit` fails.
    pub fn edit<F>(&self, path: &Path, pretty: bool, edit: F) -> ApplicationResult<Menu>
    where
        F: FnOnce(&Self, &mut Menu) -> ApplicationResult<()>,
    {
        let mut menu = self.load(path)?;
        edit(self, &mut menu)?;
        self.save(path, &menu, pretty)?;
        Ok(menu)
    }

    /// Platform caps the menu currently exceeds.
    pub fn check(&self, menu: &Menu) -> Vec<LimitViolation> {
        let mut violations = Vec::new();
        if menu.len() > self.limits.max_top_level {
            violations.push(LimitViolation::TooManyTopLevel {
                count: menu.len(),
                max: self.limits.max_top_level,
            });
        }
        for (top_idx, top) in menu.buttons().iter().enumerate() {
            let count = top.sub_buttons().len();
            if count > self.limits.max_sub_buttons {
                violations.push(LimitViolation::TooManySubButtons {
                    top_idx,
                    name: top.name().to_string(),
                    count,
                    max: self.limits.max_sub_buttons,
                });
            }
        }
        violations
    }

    /// Append a top-level button unless the top-level cap is reached.
    #[instrument(level = "debug", skip(self, menu))]
    pub fn add_top(&self, menu: &mut Menu, button: Button) -> ApplicationResult<()> {
        if menu.len() >= self.limits.max_top_level {
            return Err(ApplicationError::LimitExceeded(format!(
                "menu already has {} top-level buttons",
                self.limits.max_top_level
            )));
        }
        menu.push_top_level(button);
        Ok(())
    }

    /// Append a sub button to the top-level button at `top_idx`.
    ///
    /// A non-top target is turned into a top button holding only `button`;
    /// its previous payload is dropped.
    #[instrument(level = "debug", skip(self, menu))]
    pub fn add_sub(&self, menu: &mut Menu, top_idx: usize, button: Button) -> ApplicationResult<()> {
        let max = self.limits.max_sub_buttons;
        let top = menu
            .button_mut(top_idx)
            .ok_or_else(|| ApplicationError::NodeNotFound(top_idx.to_string()))?;

        if !top.is_top() {
            debug!("add_sub: promoting '{}' to top", top.name());
            top.set_variant(ButtonAction::Top {
                sub_button: vec![button],
            })?;
            return Ok(());
        }
        if top.sub_buttons().len() >= max {
            return Err(ApplicationError::LimitExceeded(format!(
                "button {} already has {} sub buttons",
                top_idx, max
            )));
        }
        top.push_child(button)?;
        Ok(())
    }

    /// Replace the variant of the addressed button from untyped fields.
    ///
    /// A sub button cannot become a top button.
    #[instrument(level = "debug", skip(self, menu, payload))]
    pub fn set_variant(
        &self,
        menu: &mut Menu,
        top_idx: usize,
        sub_idx: Option<usize>,
        kind: &str,
        payload: &Value,
    ) -> ApplicationResult<()> {
        if menu.node(top_idx, sub_idx).is_none() {
            return Err(ApplicationError::NodeNotFound(address(top_idx, sub_idx)));
        }
        menu.set_variant_raw(top_idx, sub_idx, kind, payload)?;
        Ok(())
    }
}

/// `top` or `top.sub` as shown to users.
pub(crate) fn address(top_idx: usize, sub_idx: Option<usize>) -> String {
    match sub_idx {
        Some(sub) => format!("{}.{}", top_idx, sub),
        None => top_idx.to_string(),
    }
}
