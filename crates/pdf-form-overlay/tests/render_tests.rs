use lopdf::{Dictionary, Document, Object};
use pdf_form_layout::FormSettings;
use pdf_form_overlay::*;

const DEFINITIONS: &str = r#"
form_settings:
  types:
    text: { h: 6, border_width: 1, border_color: blue }
  groups:
    name:
      - { name: first, x: 0, y: 0, w: 40, type: text }
      - { name: last, x: 45, y: 0, w: 40, type: text, tooltip: Family name }
  forms:
    main:
      - - { group: name, name: applicant, x: 10, y: 250 }
        - { name: notes, x: 10, y: 100, w: 100, h: 40, flags: [multiline, doNotScroll], maxlen: 200 }
      - - { name: signature, x: 10, y: 20, w: 60, h: 10, font_name: Courier, font_size: 12 }
    empty: []
"#;

fn render(form: &str, options: &OverlayOptions) -> Document {
    let settings = FormSettings::from_str(DEFINITIONS).unwrap();
    render_overlay(settings.form(form).unwrap(), options).unwrap()
}

fn acro_form(doc: &Document) -> &Dictionary {
    let catalog = doc
        .get_dictionary(doc.trailer.get(b"Root").unwrap().as_reference().unwrap())
        .unwrap();
    let acro_form = catalog.get(b"AcroForm").unwrap().as_reference().unwrap();
    doc.get_dictionary(acro_form).unwrap()
}

fn widget<'a>(doc: &'a Document, name: &str) -> &'a Dictionary {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .find(|dict| dict.get(b"T").and_then(Object::as_str).ok() == Some(name.as_bytes()))
        .unwrap_or_else(|| panic!("no widget named '{}'", name))
}

fn numbers(obj: &Object) -> Vec<f32> {
    obj.as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect()
}

#[test]
fn test_one_page_per_layout_page() {
    let doc = render("main", &OverlayOptions::default());
    let pages: Vec<_> = doc.get_pages().into_values().collect();
    assert_eq!(pages.len(), 2);

    let first = doc.get_dictionary(pages[0]).unwrap();
    assert_eq!(first.get(b"Annots").unwrap().as_array().unwrap().len(), 3);
    let media_box = numbers(first.get(b"MediaBox").unwrap());
    assert!((media_box[2] - 595.27).abs() < 0.1);
    assert!((media_box[3] - 841.89).abs() < 0.1);
}

#[test]
fn test_acro_form_lists_every_widget() {
    let doc = render("main", &OverlayOptions::default());
    let acro_form = acro_form(&doc);
    assert_eq!(acro_form.get(b"Fields").unwrap().as_array().unwrap().len(), 4);
    assert!(acro_form.get(b"NeedAppearances").unwrap().as_bool().unwrap());

    let fonts = acro_form
        .get(b"DR")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Font")
        .unwrap()
        .as_dict()
        .unwrap();
    assert_eq!(fonts.len(), 2);
}

#[test]
fn test_widget_geometry_in_points() {
    let doc = render("main", &OverlayOptions::default());
    let first = widget(&doc, "applicant-first");

    let rect = numbers(first.get(b"Rect").unwrap());
    assert!((rect[0] - mm_to_pt(10.0)).abs() < 0.01);
    assert!((rect[1] - mm_to_pt(250.0)).abs() < 0.01);
    assert!((rect[2] - mm_to_pt(50.0)).abs() < 0.01);
    assert!((rect[3] - mm_to_pt(256.0)).abs() < 0.01);
}

#[test]
fn test_widget_properties() {
    let doc = render("main", &OverlayOptions::default());

    let last = widget(&doc, "applicant-last");
    assert_eq!(last.get(b"TU").unwrap().as_str().unwrap(), b"Family name");
    assert_eq!(last.get(b"FT").unwrap().as_name().unwrap(), b"Tx");
    let border = numbers(last.get(b"MK").unwrap().as_dict().unwrap().get(b"BC").unwrap());
    assert_eq!(border, vec![0.0, 0.0, 1.0]);

    let notes = widget(&doc, "notes");
    assert_eq!(
        notes.get(b"Ff").unwrap().as_i64().unwrap(),
        (4096 | (1 << 23)) as i64
    );
    assert_eq!(notes.get(b"MaxLen").unwrap().as_i64().unwrap(), 200);
    assert!(notes.get(b"TU").is_err());

    let signature = widget(&doc, "signature");
    assert_eq!(
        signature.get(b"DA").unwrap().as_str().unwrap(),
        b"/F2 12 Tf 0 g"
    );
}

#[test]
fn test_debug_borders() {
    let doc = render("main", &OverlayOptions::default().with_debug(true));
    let notes = widget(&doc, "notes");

    let border = numbers(notes.get(b"MK").unwrap().as_dict().unwrap().get(b"BC").unwrap());
    assert_eq!(border, vec![1.0, 0.0, 0.0]);
    let width = notes
        .get(b"BS")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"W")
        .unwrap()
        .as_float()
        .unwrap();
    assert_eq!(width, 2.0);
}

#[test]
fn test_grid_drawn_on_every_page() {
    let doc = render(
        "main",
        &OverlayOptions::default()
            .with_grid(true)
            .with_paper_size(PaperSize::Letter),
    );
    for page_id in doc.get_pages().into_values() {
        let content = doc.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains(" Tj"));
        assert!(text.contains(" l S"));
    }
}

#[test]
fn test_empty_layout_renders_no_pages() {
    let doc = render("empty", &OverlayOptions::default());
    assert!(doc.get_pages().is_empty());
}
