//! Normalization of untyped menu input (parsed JSON) into typed buttons.
//!
//! Input is first resolved into a `RawButton` tree with every kind known
//! (a missing `type` next to a `sub_button` array means `top`), and only then
//! turned into validated `Button`s.

use serde_json::{Map, Value};

use crate::domain::entities::{Button, ButtonAction, ButtonKind};
use crate::domain::error::{DomainError, DomainResult, PayloadField};

/// Button entry with its kind resolved and children normalized.
#[derive(Debug)]
pub(crate) struct RawButton<'a> {
    name: String,
    kind: ButtonKind,
    fields: &'a Map<String, Value>,
    sub_button: Vec<RawButton<'a>>,
}

impl<'a> RawButton<'a> {
    pub(crate) fn normalize(value: &'a Value) -> DomainResult<Self> {
        Self::normalize_at(value, false)
    }

    /// Sub button entry: a `top` kind is rejected before its own children are read.
    fn normalize_child(value: &'a Value) -> DomainResult<Self> {
        Self::normalize_at(value, true)
    }

    fn normalize_at(value: &'a Value, under_top: bool) -> DomainResult<Self> {
        let fields = value
            .as_object()
            .ok_or_else(|| DomainError::WrongType(type_name(value).to_string()))?;

        let name = match fields.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(DomainError::InvalidName),
        };
        let kind = resolve_kind(fields)?;
        if under_top && kind == ButtonKind::Top {
            return Err(DomainError::payload(PayloadField::SubButton));
        }

        let sub_button = if kind == ButtonKind::Top {
            sub_button_entries(Some(fields))?
                .iter()
                .map(RawButton::normalize_child)
                .collect::<DomainResult<Vec<_>>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            name,
            kind,
            fields,
            sub_button,
        })
    }

    pub(crate) fn build(self) -> DomainResult<Button> {
        let action = match self.kind {
            ButtonKind::Top => ButtonAction::Top {
                sub_button: self
                    .sub_button
                    .into_iter()
                    .map(RawButton::build)
                    .collect::<DomainResult<Vec<_>>>()?,
            },
            kind => action_from_payload(kind, Some(self.fields))?,
        };
        Button::new(self.name, action)
    }
}

fn resolve_kind(fields: &Map<String, Value>) -> DomainResult<ButtonKind> {
    match fields.get("type") {
        Some(Value::String(kind)) => kind.parse(),
        Some(Value::Null) | None => {
            if matches!(fields.get("sub_button"), Some(Value::Array(_))) {
                Ok(ButtonKind::Top)
            } else {
                Err(DomainError::InvalidKind("<missing>".to_string()))
            }
        }
        Some(other) => Err(DomainError::InvalidKind(other.to_string())),
    }
}

/// Build the payload of `kind` from untyped fields.
///
/// Required fields are checked in wire order; the first bad one is reported.
pub(crate) fn action_from_payload(
    kind: ButtonKind,
    fields: Option<&Map<String, Value>>,
) -> DomainResult<ButtonAction> {
    let action = match kind {
        ButtonKind::Top => ButtonAction::Top {
            sub_button: sub_button_entries(fields)?
                .iter()
                .map(|entry| RawButton::normalize_child(entry)?.build())
                .collect::<DomainResult<Vec<_>>>()?,
        },
        ButtonKind::Click => ButtonAction::Click {
            key: string_field(fields, PayloadField::Key)?,
        },
        ButtonKind::View => ButtonAction::View {
            url: string_field(fields, PayloadField::Url)?,
        },
        ButtonKind::MiniProgram => ButtonAction::MiniProgram {
            url: string_field(fields, PayloadField::Url)?,
            appid: string_field(fields, PayloadField::AppId)?,
            pagepath: string_field(fields, PayloadField::PagePath)?,
        },
    };
    Ok(action)
}

fn string_field(fields: Option<&Map<String, Value>>, field: PayloadField) -> DomainResult<String> {
    match fields.and_then(|f| f.get(field.wire_name())) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(DomainError::payload(field)),
    }
}

fn sub_button_entries(fields: Option<&Map<String, Value>>) -> DomainResult<&Vec<Value>> {
    match fields.and_then(|f| f.get(PayloadField::SubButton.wire_name())) {
        Some(Value::Array(entries)) => Ok(entries),
        _ => Err(DomainError::payload(PayloadField::SubButton)),
    }
}

/// Top-level entry list: either a bare array or the `button` array of a
/// `{"button": [...]}` wrapper.
pub(crate) fn menu_entries(root: &Value) -> DomainResult<&Vec<Value>> {
    match root {
        Value::Array(entries) => Ok(entries),
        Value::Object(obj) => match obj.get("button") {
            Some(Value::Array(entries)) => Ok(entries),
            Some(other) => Err(DomainError::WrongType(format!(
                "button list expected, got {}",
                type_name(other)
            ))),
            None => Err(DomainError::WrongType(
                "object without a button list".to_string(),
            )),
        },
        other => Err(DomainError::WrongType(type_name(other).to_string())),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_entry_without_type_but_sub_button_when_normalizing_then_kind_is_top() {
        let value = json!({"name": "top1", "sub_button": []});
        let raw = RawButton::normalize(&value).unwrap();
        assert_eq!(raw.kind, ButtonKind::Top);
    }

    #[test]
    fn given_entry_without_type_and_sub_button_when_normalizing_then_invalid_kind() {
        let value = json!({"name": "n1", "key": "k"});
        let result = RawButton::normalize(&value);
        assert!(matches!(result, Err(DomainError::InvalidKind(_))));
    }

    #[test]
    fn given_non_string_type_when_normalizing_then_invalid_kind() {
        let value = json!({"name": "n1", "type": 3});
        assert!(matches!(
            RawButton::normalize(&value),
            Err(DomainError::InvalidKind(k)) if k == "3"
        ));
    }

    #[test]
    fn given_top_child_when_normalizing_then_rejected_before_its_children_are_read() {
        // grandchild has no name; reaching it would report InvalidName instead
        let value = json!({
            "name": "outer",
            "sub_button": [{"name": "inner", "sub_button": [{"type": "click"}]}]
        });
        assert!(matches!(
            RawButton::normalize(&value),
            Err(DomainError::InvalidPayload {
                field: PayloadField::SubButton
            })
        ));
    }

    #[test]
    fn given_deep_top_chain_when_normalizing_then_rejected_at_second_level() {
        let mut value = json!({"name": "leaf", "type": "click", "key": "k"});
        for depth in 0..64 {
            value = json!({"name": format!("t{}", depth), "sub_button": [value]});
        }
        assert!(matches!(
            RawButton::normalize(&value),
            Err(DomainError::InvalidPayload {
                field: PayloadField::SubButton
            })
        ));
    }

    #[test]
    fn given_top_payload_with_top_child_when_building_action_then_rejected() {
        let fields = json!({"sub_button": [{"name": "inner", "sub_button": [{"type": "click"}]}]});
        let result = action_from_payload(ButtonKind::Top, fields.as_object());
        assert!(matches!(
            result,
            Err(DomainError::InvalidPayload {
                field: PayloadField::SubButton
            })
        ));
    }

    #[test]
    fn given_number_entry_when_normalizing_then_wrong_type() {
        let value = json!(42);
        assert!(matches!(
            RawButton::normalize(&value),
            Err(DomainError::WrongType(t)) if t == "number"
        ));
    }

    #[test]
    fn given_miniprogram_missing_appid_and_pagepath_when_building_then_appid_reported_first() {
        let fields = json!({"url": "http://x"});
        let result = action_from_payload(ButtonKind::MiniProgram, fields.as_object());
        assert!(matches!(
            result,
            Err(DomainError::InvalidPayload {
                field: PayloadField::AppId
            })
        ));
    }

    #[test]
    fn given_object_without_button_when_listing_entries_then_wrong_type() {
        let root = json!({"menu": []});
        assert!(matches!(
            menu_entries(&root),
            Err(DomainError::WrongType(_))
        ));
    }
}
