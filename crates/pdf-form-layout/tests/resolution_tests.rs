use pdf_form_layout::*;

const DEFINITIONS: &str = r#"
form_settings:
  types:
    c: { font_size: 9, border_width: 1, tooltip: from-c }
    b: { type: c, font_size: 11 }
    a: { type: b }
    box: { w: 5, h: 5 }
  groups:
    inner:
      - { name: f, x: 2, y: 3, type: box }
    outer:
      - { group: inner, name: outer, x: 10, y: 5 }
    address:
      - { name: street, x: 0, y: 0, type: a }
      - { name: city, x: 0, y: -8, type: a, w: 60 }
    person:
      - { name: full_name, x: 0, y: 0 }
      - { group: address, name: home, x: 0, y: -10 }
  forms:
    three:
      - - { name: p0, x: 1, y: 1 }
      - - { name: p1, x: 2, y: 2 }
        - { group: inner }
      - - { name: p2, x: 3, y: 3 }
    spliced:
      - - { form: three }
    single:
      - - { form: three, page: 1 }
    nested:
      - - { group: outer, name: page, x: 100, y: 200 }
    people:
      - - { group: person, name: applicant, x: 20, y: 250 }
        - { name: agree, x: 20, y: 20, type: box, flags: [required] }
    early:
      - - { form: late }
    late:
      - - { name: only, x: 0, y: 0 }
"#;

fn settings() -> FormSettings {
    FormSettings::from_str(DEFINITIONS).unwrap()
}

fn field<'a>(layout: &'a ResolvedLayout, name: &str) -> &'a ResolvedField {
    layout
        .fields()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("field '{}' not found", name))
}

#[test]
fn test_type_inheritance_shadowing() {
    let settings = FormSettings::from_str(
        r#"
form_settings:
  types:
    c: { font_size: 9, tooltip: from-c }
    b: { type: c, font_size: 11 }
    a: { type: b }
  forms:
    f:
      - - { name: plain, type: a }
        - { name: own, type: a, font_size: 14 }
"#,
    )
    .unwrap();
    let layout = settings.form("f").unwrap();

    let plain = field(layout, "plain");
    assert_eq!(plain.tooltip, "from-c");
    assert_eq!(plain.font_size, 11.0);

    let own = field(layout, "own");
    assert_eq!(own.font_size, 14.0);
    assert_eq!(own.tooltip, "from-c");
}

#[test]
fn test_group_expansion_is_repeatable() {
    let settings = settings();
    let group = settings.field_group("person").unwrap();

    let first: Vec<ResolvedField> = group
        .expand("x", 1.0, 2.0)
        .iter()
        .map(FormField::resolve)
        .collect();
    let second: Vec<ResolvedField> = group
        .expand("x", 1.0, 2.0)
        .iter()
        .map(FormField::resolve)
        .collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn test_nested_group_naming_and_offsets() {
    let settings = settings();
    let layout = settings.form("nested").unwrap();

    assert_eq!(layout.page_count(), 1);
    let f = field(layout, "page-outer-f");
    assert_eq!((f.x, f.y), (112.0, 208.0));
    assert_eq!((f.w, f.h), (5.0, 5.0));

    // Relative to the outer group alone
    let relative = settings.field_group("outer").unwrap().expand("", 0.0, 0.0);
    assert_eq!(relative.len(), 1);
    assert_eq!(relative[0].name(), "outer-f");
    assert_eq!((relative[0].x(), relative[0].y()), (12.0, 8.0));
}

#[test]
fn test_empty_prefix_adds_no_hyphen() {
    let settings = settings();
    let layout = settings.form("three").unwrap();
    let names: Vec<&str> = layout.pages()[1].iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["p1", "f"]);
}

#[test]
fn test_group_fields_keep_type_properties() {
    let settings = settings();
    let layout = settings.form("people").unwrap();

    let street = field(layout, "applicant-home-street");
    assert_eq!((street.x, street.y), (20.0, 240.0));
    assert_eq!(street.font_size, 11.0);
    assert_eq!(street.border_width, Some(1.0));

    let city = field(layout, "applicant-home-city");
    assert_eq!((city.x, city.y), (20.0, 232.0));
    assert_eq!(city.w, 60.0);

    let agree = field(layout, "agree");
    assert_eq!(agree.flags, vec![FieldFlag::Required]);
}

#[test]
fn test_whole_form_splice() {
    let settings = settings();
    let three = settings.form("three").unwrap();
    let spliced = settings.form("spliced").unwrap();

    assert_eq!(spliced.page_count(), 3);
    assert_eq!(spliced, three);
}

#[test]
fn test_single_page_reference() {
    let settings = settings();
    let three = settings.form("three").unwrap();
    let single = settings.form("single").unwrap();

    assert_eq!(single.page_count(), 1);
    assert_eq!(single.pages()[0], three.pages()[1]);
}

#[test]
fn test_forward_form_reference() {
    let settings = settings();
    let early = settings.form("early").unwrap();
    assert_eq!(early.field_names().into_iter().collect::<Vec<_>>(), vec!["only"]);
}

#[test]
fn test_form_field_ids_sorted() {
    let ids = settings().form_field_ids("people").unwrap();
    assert_eq!(
        ids.into_iter().collect::<Vec<_>>(),
        vec![
            "agree",
            "applicant-full_name",
            "applicant-home-city",
            "applicant-home-street"
        ]
    );
}

#[test]
fn test_unknown_form_lookup() {
    let err = settings().form("missing").unwrap_err();
    assert!(matches!(err, LayoutError::UnknownForm { name } if name == "missing"));
}

#[test]
fn test_zero_page_form() {
    let settings = FormSettings::from_str("form_settings:\n  forms:\n    empty: []\n").unwrap();
    assert_eq!(settings.form("empty").unwrap().page_count(), 0);
}
