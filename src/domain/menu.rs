//! Menu aggregate: ordered list of top-level buttons

use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::domain::entities::{move_item, Button, ButtonAction, ButtonKind};
use crate::domain::error::{DomainError, DomainResult, PayloadField};
use crate::domain::raw::{action_from_payload, menu_entries, RawButton};

/// Top-level button list of an account menu.
///
/// Only structural validity is enforced here; entry caps belong to the
/// editing front end (see `application::MenuService::check`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    button: Vec<Button>,
}

impl Menu {
    /// Adopt already built buttons.
    pub fn new(button: Vec<Button>) -> Self {
        Self { button }
    }

    /// Rebuild a menu from parsed JSON: a bare entry array or `{"button": [...]}`.
    #[instrument(level = "debug", skip(root))]
    pub fn from_value(root: &Value) -> DomainResult<Self> {
        let entries = menu_entries(root)?;
        let raw = entries
            .iter()
            .map(RawButton::normalize)
            .collect::<DomainResult<Vec<_>>>()?;
        let button = raw
            .into_iter()
            .map(RawButton::build)
            .collect::<DomainResult<Vec<_>>>()?;
        debug!("from_value: {} top-level buttons", button.len());
        Ok(Self { button })
    }

    pub fn from_json(text: &str) -> DomainResult<Self> {
        let root: Value = serde_json::from_str(text)?;
        Self::from_value(&root)
    }

    pub fn buttons(&self) -> &[Button] {
        &self.button
    }

    pub fn button_mut(&mut self, top_idx: usize) -> Option<&mut Button> {
        self.button.get_mut(top_idx)
    }

    /// A top-level button or one of its sub buttons.
    pub fn node(&self, top_idx: usize, sub_idx: Option<usize>) -> Option<&Button> {
        let top = self.button.get(top_idx)?;
        match sub_idx {
            None => Some(top),
            Some(idx) => top.sub_buttons().get(idx),
        }
    }

    fn node_mut(&mut self, top_idx: usize, sub_idx: Option<usize>) -> DomainResult<&mut Button> {
        let len = self.len();
        let top = self
            .button
            .get_mut(top_idx)
            .ok_or(DomainError::IndexOutOfRange {
                index: top_idx,
                len,
            })?;
        match sub_idx {
            None => Ok(top),
            Some(idx) => {
                let sub_len = top.sub_buttons().len();
                top.sub_button_mut(idx).ok_or(DomainError::IndexOutOfRange {
                    index: idx,
                    len: sub_len,
                })
            }
        }
    }

    /// Replace the variant of the addressed button.
    ///
    /// Sub buttons cannot become top buttons. On error the menu is unchanged.
    #[instrument(level = "debug", skip(self, action))]
    pub fn set_variant(
        &mut self,
        top_idx: usize,
        sub_idx: Option<usize>,
        action: ButtonAction,
    ) -> DomainResult<()> {
        let node = self.node_mut(top_idx, sub_idx)?;
        if sub_idx.is_some() && action.kind() == ButtonKind::Top {
            return Err(DomainError::payload(PayloadField::SubButton));
        }
        node.set_variant(action)
    }

    /// Untyped variant switch of the addressed button; see [`Button::set_variant_raw`].
    pub fn set_variant_raw(
        &mut self,
        top_idx: usize,
        sub_idx: Option<usize>,
        kind: &str,
        payload: &Value,
    ) -> DomainResult<()> {
        let kind = ButtonKind::from_str(kind)?;
        let action = action_from_payload(kind, payload.as_object())?;
        self.set_variant(top_idx, sub_idx, action)
    }

    pub fn push_top_level(&mut self, button: Button) {
        debug!("push_top_level: {}", button.name());
        self.button.push(button);
    }

    /// Number of top-level buttons.
    pub fn len(&self) -> usize {
        self.button.len()
    }

    pub fn is_empty(&self) -> bool {
        self.button.is_empty()
    }

    /// Number of sub buttons of the top-level button at `top_idx`.
    pub fn sub_len(&self, top_idx: usize) -> DomainResult<usize> {
        let top = self
            .button
            .get(top_idx)
            .ok_or(DomainError::IndexOutOfRange {
                index: top_idx,
                len: self.len(),
            })?;
        if top.is_leaf() {
            return Err(DomainError::NotContainer(top_idx));
        }
        Ok(top.sub_buttons().len())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn move_top_level(&mut self, old_idx: usize, new_idx: usize) -> DomainResult<()> {
        move_item(&mut self.button, old_idx, new_idx)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn move_within_container(
        &mut self,
        top_idx: usize,
        old_idx: usize,
        new_idx: usize,
    ) -> DomainResult<()> {
        let len = self.len();
        self.button
            .get_mut(top_idx)
            .ok_or(DomainError::IndexOutOfRange {
                index: top_idx,
                len,
            })?
            .move_child(old_idx, new_idx)
    }

    /// Object form of the addressed button, `None` if the indices miss.
    pub fn get(&self, top_idx: usize, sub_idx: Option<usize>) -> Option<Value> {
        self.node(top_idx, sub_idx).map(Button::to_object)
    }

    pub fn to_object(&self) -> Value {
        let button: Vec<Value> = self.button.iter().map(Button::to_object).collect();
        json!({ "button": button })
    }

    pub fn to_json(&self) -> String {
        self.to_object().to_string()
    }

    pub fn to_json_pretty(&self) -> DomainResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_object())?)
    }

    /// Terminal tree: one line per button with its payload.
    pub fn to_tree(&self, title: &str) -> Tree<String> {
        let leaves = self.button.iter().map(|top| {
            Tree::new(top.to_string())
                .with_leaves(top.sub_buttons().iter().map(|sub| sub.to_string()))
        });
        Tree::new(title.to_string()).with_leaves(leaves)
    }
}

impl From<Vec<Button>> for Menu {
    fn from(button: Vec<Button>) -> Self {
        Self::new(button)
    }
}

impl FromStr for Menu {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

impl TryFrom<&Value> for Menu {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl Serialize for Menu {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_object().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Menu {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Menu::from_value(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Menu {
        let top = Button::top(
            "top1",
            vec![
                Button::click("a", "1").unwrap(),
                Button::view("b", "http://x").unwrap(),
            ],
        )
        .unwrap();
        Menu::new(vec![top, Button::click("c", "3").unwrap()])
    }

    #[test]
    fn given_menu_when_serialized_with_serde_then_matches_to_object() {
        let menu = sample();
        assert_eq!(serde_json::to_value(&menu).unwrap(), menu.to_object());
    }

    #[test]
    fn given_json_when_deserialized_with_serde_then_equals_source() {
        let menu = sample();
        let back: Menu = serde_json::from_str(&menu.to_json()).unwrap();
        assert_eq!(back, menu);
    }

    #[test]
    fn given_menu_when_rendered_as_tree_then_lists_every_button() {
        let rendered = sample().to_tree("menu").to_string();
        assert!(rendered.contains("top1 [top] (2 sub)"));
        assert!(rendered.contains("b [view] url=http://x"));
        assert!(rendered.contains("c [click] key=3"));
    }

    #[test]
    fn given_indices_when_node_then_addresses_sub_button() {
        let mut menu = sample();
        assert_eq!(menu.node(0, Some(1)).unwrap().name(), "b");
        assert!(menu.node(1, Some(0)).is_none());
        assert!(menu.node(5, None).is_none());
        assert!(matches!(
            menu.node_mut(0, Some(2)),
            Err(DomainError::IndexOutOfRange { index: 2, len: 2 })
        ));
    }
}
