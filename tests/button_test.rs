//! Tests for Button construction, variant switching and child handling

use rstest::rstest;
use serde_json::json;

use wxmenu::domain::{Button, ButtonAction, ButtonKind, DomainError, PayloadField};

fn children(names: &[&str]) -> Vec<Button> {
    names
        .iter()
        .map(|n| Button::click(*n, format!("key-{}", n)).unwrap())
        .collect()
}

fn child_names(button: &Button) -> Vec<&str> {
    button.sub_buttons().iter().map(Button::name).collect()
}

// ============================================================
// Construction
// ============================================================

#[test]
fn given_empty_name_when_constructing_then_invalid_name() {
    let result = Button::view("", "http://x");
    assert!(matches!(result, Err(DomainError::InvalidName)));
}

#[rstest]
#[case(json!({"type": "click", "key": "1"}))]
#[case(json!({"name": 1, "type": "click", "key": "1"}))]
#[case(json!({"name": "", "type": "click", "key": "1"}))]
fn given_missing_or_bad_name_when_building_from_value_then_invalid_name(
    #[case] value: serde_json::Value,
) {
    assert!(matches!(
        Button::from_value(&value),
        Err(DomainError::InvalidName)
    ));
}

#[rstest]
#[case("link")]
#[case("TOP")]
#[case("")]
fn given_unknown_type_when_building_from_value_then_invalid_kind(#[case] kind: &str) {
    let value = json!({"name": "n1", "type": kind, "key": "1"});
    assert!(matches!(
        Button::from_value(&value),
        Err(DomainError::InvalidKind(k)) if k == kind
    ));
}

#[rstest]
#[case(json!({"name": "n", "type": "click"}), PayloadField::Key)]
#[case(json!({"name": "n", "type": "click", "key": 1111}), PayloadField::Key)]
#[case(json!({"name": "n", "type": "view", "key": "k"}), PayloadField::Url)]
#[case(json!({"name": "n", "type": "miniprogram", "appid": "a", "pagepath": "p"}), PayloadField::Url)]
#[case(json!({"name": "n", "type": "miniprogram", "url": "u", "pagepath": "p"}), PayloadField::AppId)]
#[case(json!({"name": "n", "type": "miniprogram", "url": "u", "appid": "a"}), PayloadField::PagePath)]
#[case(json!({"name": "n", "type": "top"}), PayloadField::SubButton)]
#[case(json!({"name": "n", "type": "top", "sub_button": "a,b"}), PayloadField::SubButton)]
fn given_bad_payload_when_building_from_value_then_first_offending_field_reported(
    #[case] value: serde_json::Value,
    #[case] expected: PayloadField,
) {
    match Button::from_value(&value) {
        Err(DomainError::InvalidPayload { field }) => assert_eq!(field, expected),
        other => panic!("expected InvalidPayload({:?}), got {:?}", expected, other),
    }
}

#[test]
fn given_payload_error_when_displayed_then_message_names_field() {
    let value = json!({"name": "n", "type": "click"});
    let err = Button::from_value(&value).unwrap_err();
    assert_eq!(err.to_string(), "key must be string");
}

#[test]
fn given_extra_fields_when_building_leaf_then_only_kind_fields_are_kept() {
    let value = json!({"name": "n", "type": "click", "key": "k", "url": "http://x", "appid": "a"});
    let button = Button::from_value(&value).unwrap();
    assert_eq!(
        button.to_object(),
        json!({"name": "n", "type": "click", "key": "k", "sub_button": []})
    );
}

// ============================================================
// Nested containers are rejected at model level
// ============================================================

#[test]
fn given_top_child_when_constructing_top_then_invalid_payload() {
    let inner = Button::top("inner", children(&["a"])).unwrap();
    let result = Button::top("outer", vec![inner]);
    assert!(matches!(
        result,
        Err(DomainError::InvalidPayload {
            field: PayloadField::SubButton
        })
    ));
}

#[test]
fn given_nested_top_in_raw_input_when_building_then_invalid_payload() {
    let value = json!({
        "name": "outer",
        "sub_button": [{"name": "inner", "sub_button": []}]
    });
    assert!(matches!(
        Button::from_value(&value),
        Err(DomainError::InvalidPayload {
            field: PayloadField::SubButton
        })
    ));
}

#[test]
fn given_top_child_when_pushing_then_invalid_payload_and_children_unchanged() {
    let mut top = Button::top("outer", children(&["a"])).unwrap();
    let inner = Button::top("inner", vec![]).unwrap();

    let result = top.push_child(inner);

    assert!(matches!(result, Err(DomainError::InvalidPayload { .. })));
    assert_eq!(child_names(&top), vec!["a"]);
}

// ============================================================
// set_variant
// ============================================================

#[test]
fn given_miniprogram_when_switching_to_click_then_no_stale_fields_remain() {
    // Arrange
    let mut button = Button::mini_program("n3", "http://x", "aid", "pp").unwrap();

    // Act
    button
        .set_variant(ButtonAction::Click { key: "k".into() })
        .unwrap();

    // Assert
    assert_eq!(button.kind(), ButtonKind::Click);
    assert_eq!(
        button.to_object(),
        json!({"name": "n3", "type": "click", "key": "k", "sub_button": []})
    );
}

#[test]
fn given_top_when_switching_to_view_then_children_are_dropped() {
    let mut button = Button::top("t", children(&["a", "b"])).unwrap();

    button
        .set_variant(ButtonAction::View { url: "http://y".into() })
        .unwrap();

    assert!(button.is_leaf());
    assert!(!button.is_top());
    assert_eq!(
        button.to_object(),
        json!({"name": "t", "type": "view", "url": "http://y", "sub_button": []})
    );
}

#[rstest]
#[case("click", json!({"key": "k"}), json!({"name": "n", "type": "click", "key": "k", "sub_button": []}))]
#[case("view", json!({"url": "u"}), json!({"name": "n", "type": "view", "url": "u", "sub_button": []}))]
#[case(
    "miniprogram",
    json!({"url": "u", "appid": "a", "pagepath": "p", "key": "stale"}),
    json!({"name": "n", "type": "miniprogram", "url": "u", "appid": "a", "pagepath": "p", "sub_button": []})
)]
#[case(
    "top",
    json!({"sub_button": [{"name": "c", "type": "view", "url": "u"}]}),
    json!({"name": "n", "type": "top", "sub_button": [{"name": "c", "type": "view", "url": "u", "sub_button": []}]})
)]
fn given_any_variant_when_set_raw_then_fields_are_exactly_those_of_new_kind(
    #[case] kind: &str,
    #[case] payload: serde_json::Value,
    #[case] expected: serde_json::Value,
) {
    for start in [
        Button::click("n", "old").unwrap(),
        Button::view("n", "old").unwrap(),
        Button::mini_program("n", "old", "old", "old").unwrap(),
        Button::top("n", children(&["x"])).unwrap(),
    ] {
        let mut button = start;
        button.set_variant_raw(kind, &payload).unwrap();
        assert_eq!(button.to_object(), expected);
    }
}

#[test]
fn given_unknown_kind_when_set_raw_then_invalid_kind_and_button_unchanged() {
    let mut button = Button::click("n", "k").unwrap();
    let before = button.clone();

    let result = button.set_variant_raw("link", &json!({"url": "u"}));

    assert!(matches!(result, Err(DomainError::InvalidKind(_))));
    assert_eq!(button, before);
}

#[test]
fn given_bad_payload_when_set_raw_then_button_unchanged() {
    let mut button = Button::click("n", "k").unwrap();
    let before = button.clone();

    let result = button.set_variant_raw("miniprogram", &json!({"url": "u", "appid": "a"}));

    assert!(matches!(
        result,
        Err(DomainError::InvalidPayload {
            field: PayloadField::PagePath
        })
    ));
    assert_eq!(button, before);
}

#[test]
fn given_non_object_payload_when_set_raw_then_first_field_missing() {
    let mut button = Button::view("n", "u").unwrap();
    let result = button.set_variant_raw("click", &json!("k"));
    assert!(matches!(
        result,
        Err(DomainError::InvalidPayload {
            field: PayloadField::Key
        })
    ));
}

// ============================================================
// push_child / is_top / is_leaf
// ============================================================

#[test]
fn given_leaf_when_pushing_child_then_wrong_variant() {
    let mut button = Button::click("n", "k").unwrap();
    let result = button.push_child(Button::view("c", "u").unwrap());
    assert!(matches!(result, Err(DomainError::WrongVariant)));
}

#[test]
fn given_top_when_pushing_child_then_appended_last() {
    let mut top = Button::top("t", children(&["a", "b"])).unwrap();
    top.push_child(Button::view("c", "u").unwrap()).unwrap();
    assert_eq!(child_names(&top), vec!["a", "b", "c"]);
}

#[test]
fn given_empty_top_when_queried_then_top_and_leaf() {
    let top = Button::top("t", vec![]).unwrap();
    assert!(top.is_top());
    assert!(top.is_leaf());
    assert_eq!(
        top.to_object(),
        json!({"name": "t", "type": "top", "sub_button": []})
    );
}

// ============================================================
// move_child
// ============================================================

#[rstest]
#[case(0, 2, vec!["B", "C", "A", "D"])]
#[case(3, 0, vec!["D", "A", "B", "C"])]
#[case(1, 1, vec!["A", "B", "C", "D"])]
#[case(0, 3, vec!["B", "C", "D", "A"])]
#[case(2, 1, vec!["A", "C", "B", "D"])]
fn given_four_children_when_moving_then_insert_after_removal(
    #[case] old: usize,
    #[case] new: usize,
    #[case] expected: Vec<&str>,
) {
    let mut top = Button::top("t", children(&["A", "B", "C", "D"])).unwrap();
    top.move_child(old, new).unwrap();
    assert_eq!(child_names(&top), expected);
}

#[rstest]
#[case(4, 0)]
#[case(0, 4)]
#[case(9, 9)]
fn given_index_at_or_past_len_when_moving_then_out_of_range(#[case] old: usize, #[case] new: usize) {
    let mut top = Button::top("t", children(&["A", "B", "C", "D"])).unwrap();
    let result = top.move_child(old, new);
    assert!(matches!(result, Err(DomainError::IndexOutOfRange { .. })));
    assert_eq!(child_names(&top), vec!["A", "B", "C", "D"]);
}

#[test]
fn given_leaf_kinds_when_moving_child_then_out_of_range() {
    let mut leaf = Button::click("n", "k").unwrap();
    let mut empty_top = Button::top("t", vec![]).unwrap();
    assert!(matches!(
        leaf.move_child(0, 0),
        Err(DomainError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        empty_top.move_child(0, 0),
        Err(DomainError::IndexOutOfRange { .. })
    ));
}

// ============================================================
// Serialization
// ============================================================

#[test]
fn given_top_when_serialized_then_children_use_their_own_object_form() {
    let top = Button::top(
        "top1",
        vec![
            Button::click("n1", "1111").unwrap(),
            Button::mini_program("n3", "http://x", "aid", "pp").unwrap(),
        ],
    )
    .unwrap();

    let expected = json!({
        "name": "top1",
        "type": "top",
        "sub_button": [
            {"name": "n1", "type": "click", "key": "1111", "sub_button": []},
            {"name": "n3", "type": "miniprogram", "url": "http://x", "appid": "aid", "pagepath": "pp", "sub_button": []}
        ]
    });
    assert_eq!(top.to_object(), expected);
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&top.to_json()).unwrap(),
        expected
    );
}

#[test]
fn given_same_button_when_serialized_twice_then_json_is_identical() {
    let button = Button::mini_program("n3", "http://x", "aid", "pp").unwrap();
    assert_eq!(button.to_json(), button.to_json());
    assert_eq!(
        button.to_json(),
        r#"{"name":"n3","type":"miniprogram","url":"http://x","appid":"aid","pagepath":"pp","sub_button":[]}"#
    );
}
