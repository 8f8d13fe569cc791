use pdf_form_layout::*;

fn resolve(yaml: &str) -> LayoutError {
    FormSettings::from_str(yaml).unwrap_err()
}

#[test]
fn test_unknown_type_in_group() {
    let err = resolve(
        r#"
form_settings:
  groups:
    g:
      - { name: f, type: nope }
"#,
    );
    match err {
        LayoutError::UnknownType {
            name,
            referenced_by,
        } => {
            assert_eq!(name, "nope");
            assert_eq!(referenced_by, "g");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_cyclic_type_chain() {
    let err = resolve(
        r#"
form_settings:
  types:
    a: { type: b }
    b: { type: c }
    c: { type: a }
"#,
    );
    match err {
        LayoutError::CyclicTypeDefinition { chain } => {
            assert_eq!(chain, vec!["a", "b", "c", "a"]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_group() {
    let err = resolve(
        r#"
form_settings:
  forms:
    f:
      - - { group: ghost }
"#,
    );
    assert!(matches!(err, LayoutError::UnknownGroup { name, .. } if name == "ghost"));
}

#[test]
fn test_self_referencing_group() {
    let err = resolve(
        r#"
form_settings:
  groups:
    loop:
      - { name: f }
      - { group: loop, name: again }
"#,
    );
    assert!(matches!(err, LayoutError::CyclicGroupDefinition { .. }));
}

#[test]
fn test_group_cycle_through_intermediate() {
    let err = resolve(
        r#"
form_settings:
  groups:
    first:
      - { group: second }
    second:
      - { group: first }
"#,
    );
    match err {
        LayoutError::CyclicGroupDefinition { chain } => {
            assert_eq!(chain, vec!["first", "second", "first"]);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_form_reference() {
    let err = resolve(
        r#"
form_settings:
  forms:
    f:
      - - { form: ghost }
"#,
    );
    assert!(matches!(err, LayoutError::UnknownForm { name } if name == "ghost"));
}

#[test]
fn test_page_index_out_of_range() {
    let err = resolve(
        r#"
form_settings:
  forms:
    base:
      - - { name: a }
    f:
      - - { form: base, page: 1 }
"#,
    );
    match err {
        LayoutError::PageIndexOutOfRange {
            form,
            page,
            page_count,
        } => {
            assert_eq!(form, "base");
            assert_eq!(page, 1);
            assert_eq!(page_count, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_cyclic_form_reference() {
    let err = resolve(
        r#"
form_settings:
  forms:
    a:
      - - { form: b }
    b:
      - - { name: x }
      - - { form: a, page: 0 }
"#,
    );
    assert!(matches!(err, LayoutError::CyclicFormDefinition { .. }));
}

#[test]
fn test_form_reference_inside_group_rejected() {
    let err = resolve(
        r#"
form_settings:
  groups:
    g:
      - { form: f }
"#,
    );
    assert!(matches!(err, LayoutError::InvalidDefinition(_)));
}

#[test]
fn test_mixed_form_reference_page_rejected() {
    let err = resolve(
        r#"
form_settings:
  forms:
    base:
      - - { name: a }
    f:
      - - { form: base }
        - { name: b }
"#,
    );
    assert!(matches!(err, LayoutError::InvalidDefinition(_)));
}

#[test]
fn test_unknown_key_is_parse_error() {
    let err = resolve(
        r#"
form_settings:
  forms:
    f:
      - - { name: a, colour: red }
"#,
    );
    assert!(matches!(err, LayoutError::Parse(_)));
}

#[test]
fn test_bad_color_is_parse_error() {
    let err = resolve(
        r##"
form_settings:
  types:
    t: { border_color: "#zzzzzz" }
"##,
    );
    assert!(matches!(err, LayoutError::Parse(_)));
}
