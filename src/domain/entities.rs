//! Domain entities: menu buttons and their variant payloads

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::error::{DomainError, DomainResult, PayloadField};
use crate::domain::raw;

/// Button variant tag, serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    /// Container holding one level of sub buttons
    Top,
    /// Sends a callback key
    Click,
    /// Opens a URL
    View,
    /// Deep link into a mini program
    MiniProgram,
}

impl ButtonKind {
    pub const ALL: [ButtonKind; 4] = [
        ButtonKind::Top,
        ButtonKind::Click,
        ButtonKind::View,
        ButtonKind::MiniProgram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonKind::Top => "top",
            ButtonKind::Click => "click",
            ButtonKind::View => "view",
            ButtonKind::MiniProgram => "miniprogram",
        }
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ButtonKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::InvalidKind(s.to_string()))
    }
}

/// Variant-specific payload of a button.
///
/// Exactly the fields of the current kind exist; switching variant replaces
/// the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Top {
        sub_button: Vec<Button>,
    },
    Click {
        key: String,
    },
    View {
        url: String,
    },
    MiniProgram {
        url: String,
        appid: String,
        pagepath: String,
    },
}

impl ButtonAction {
    pub fn kind(&self) -> ButtonKind {
        match self {
            ButtonAction::Top { .. } => ButtonKind::Top,
            ButtonAction::Click { .. } => ButtonKind::Click,
            ButtonAction::View { .. } => ButtonKind::View,
            ButtonAction::MiniProgram { .. } => ButtonKind::MiniProgram,
        }
    }

    /// Structural check: sub buttons of a top button must not be top buttons.
    fn validate(&self) -> DomainResult<()> {
        if let ButtonAction::Top { sub_button } = self {
            if sub_button.iter().any(Button::is_top) {
                return Err(DomainError::payload(PayloadField::SubButton));
            }
        }
        Ok(())
    }

    fn write_fields(&self, obj: &mut Map<String, Value>) {
        match self {
            ButtonAction::Top { .. } => {}
            ButtonAction::Click { key } => {
                obj.insert("key".into(), Value::from(key.as_str()));
            }
            ButtonAction::View { url } => {
                obj.insert("url".into(), Value::from(url.as_str()));
            }
            ButtonAction::MiniProgram {
                url,
                appid,
                pagepath,
            } => {
                obj.insert("url".into(), Value::from(url.as_str()));
                obj.insert("appid".into(), Value::from(appid.as_str()));
                obj.insert("pagepath".into(), Value::from(pagepath.as_str()));
            }
        }
    }
}

/// A single menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    name: String,
    action: ButtonAction,
}

impl Button {
    /// Create a button, validating name and payload before anything is built.
    pub fn new(name: impl Into<String>, action: ButtonAction) -> DomainResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::InvalidName);
        }
        action.validate()?;
        Ok(Self { name, action })
    }

    pub fn top(name: impl Into<String>, sub_button: Vec<Button>) -> DomainResult<Self> {
        Self::new(name, ButtonAction::Top { sub_button })
    }

    pub fn click(name: impl Into<String>, key: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, ButtonAction::Click { key: key.into() })
    }

    pub fn view(name: impl Into<String>, url: impl Into<String>) -> DomainResult<Self> {
        Self::new(name, ButtonAction::View { url: url.into() })
    }

    pub fn mini_program(
        name: impl Into<String>,
        url: impl Into<String>,
        appid: impl Into<String>,
        pagepath: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::new(
            name,
            ButtonAction::MiniProgram {
                url: url.into(),
                appid: appid.into(),
                pagepath: pagepath.into(),
            },
        )
    }

    /// Build a button from an untyped JSON entry.
    ///
    /// A missing `type` next to a `sub_button` array is read as `top`.
    pub fn from_value(value: &Value) -> DomainResult<Self> {
        raw::RawButton::normalize(value)?.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ButtonKind {
        self.action.kind()
    }

    pub fn action(&self) -> &ButtonAction {
        &self.action
    }

    /// Sub buttons; always empty for non-top kinds.
    pub fn sub_buttons(&self) -> &[Button] {
        match &self.action {
            ButtonAction::Top { sub_button } => sub_button,
            _ => &[],
        }
    }

    pub(crate) fn sub_button_mut(&mut self, idx: usize) -> Option<&mut Button> {
        match &mut self.action {
            ButtonAction::Top { sub_button } => sub_button.get_mut(idx),
            _ => None,
        }
    }

    /// Replace the variant payload. The name is kept.
    ///
    /// On error the button is left untouched.
    pub fn set_variant(&mut self, action: ButtonAction) -> DomainResult<()> {
        action.validate()?;
        debug!(
            "set_variant: {} {} -> {}",
            self.name,
            self.kind(),
            action.kind()
        );
        self.action = action;
        Ok(())
    }

    /// Untyped variant switch: `kind` is a wire type name, `payload` an object
    /// carrying the fields of that kind.
    pub fn set_variant_raw(&mut self, kind: &str, payload: &Value) -> DomainResult<()> {
        let kind = ButtonKind::from_str(kind)?;
        let action = raw::action_from_payload(kind, payload.as_object())?;
        self.set_variant(action)
    }

    /// Append a sub button. Only top buttons accept children.
    pub fn push_child(&mut self, child: Button) -> DomainResult<()> {
        match &mut self.action {
            ButtonAction::Top { sub_button } => {
                if child.is_top() {
                    return Err(DomainError::payload(PayloadField::SubButton));
                }
                sub_button.push(child);
                Ok(())
            }
            _ => Err(DomainError::WrongVariant),
        }
    }

    pub fn is_top(&self) -> bool {
        self.kind() == ButtonKind::Top
    }

    pub fn is_leaf(&self) -> bool {
        self.sub_buttons().is_empty()
    }

    /// Move the sub button at `old_idx` so that it ends up at `new_idx`.
    ///
    /// `new_idx` addresses the list after removal of the moved element.
    pub fn move_child(&mut self, old_idx: usize, new_idx: usize) -> DomainResult<()> {
        match &mut self.action {
            ButtonAction::Top { sub_button } if !sub_button.is_empty() => {
                move_item(sub_button, old_idx, new_idx)
            }
            _ => Err(DomainError::IndexOutOfRange {
                index: old_idx.max(new_idx),
                len: 0,
            }),
        }
    }

    /// Object form: `name`, `type`, the variant fields and `sub_button`.
    ///
    /// `sub_button` is always present, empty for leaf kinds.
    pub fn to_object(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("name".into(), Value::from(self.name.as_str()));
        obj.insert("type".into(), Value::from(self.kind().as_str()));
        self.action.write_fields(&mut obj);
        obj.insert(
            "sub_button".into(),
            Value::Array(self.sub_buttons().iter().map(Button::to_object).collect()),
        );
        Value::Object(obj)
    }

    pub fn to_json(&self) -> String {
        self.to_object().to_string()
    }
}

impl Serialize for Button {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_object().serialize(serializer)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.kind())?;
        match &self.action {
            ButtonAction::Top { sub_button } => write!(f, " ({} sub)", sub_button.len()),
            ButtonAction::Click { key } => write!(f, " key={}", key),
            ButtonAction::View { url } => write!(f, " url={}", url),
            ButtonAction::MiniProgram {
                url,
                appid,
                pagepath,
            } => write!(f, " appid={} pagepath={} url={}", appid, pagepath, url),
        }
    }
}

/// Remove the element at `old_idx`, then insert it at `new_idx` of the
/// shortened list. Both indices must be below the original length.
pub(crate) fn move_item<T>(items: &mut Vec<T>, old_idx: usize, new_idx: usize) -> DomainResult<()> {
    let len = items.len();
    let max = old_idx.max(new_idx);
    if max >= len {
        return Err(DomainError::IndexOutOfRange { index: max, len });
    }
    let item = items.remove(old_idx);
    items.insert(new_idx, item);
    Ok(())
}
