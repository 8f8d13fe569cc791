use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_form_layout::FormSettings;
use pdf_form_overlay::*;
use tempfile::NamedTempFile;

const DEFINITIONS: &str = r#"
form_settings:
  forms:
    three:
      - - { name: a, x: 10, y: 10, w: 50, h: 8 }
      - - { name: b, x: 10, y: 20, w: 50, h: 8 }
        - { name: c, x: 10, y: 30, w: 50, h: 8 }
      - - { name: d, x: 10, y: 40, w: 50, h: 8 }
"#;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn overlay() -> Document {
    let settings = FormSettings::from_str(DEFINITIONS).unwrap();
    render_overlay(settings.form("three").unwrap(), &OverlayOptions::default()).unwrap()
}

fn pages(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

fn annotation_names(doc: &Document, page_id: ObjectId) -> Vec<String> {
    let page = doc.get_dictionary(page_id).unwrap();
    let Ok(annots) = page.get(b"Annots") else {
        return Vec::new();
    };
    annots
        .as_array()
        .unwrap()
        .iter()
        .map(|annot| {
            let widget = doc.get_dictionary(annot.as_reference().unwrap()).unwrap();
            lopdf::decode_text_string(widget.get(b"T").unwrap()).unwrap()
        })
        .collect()
}

fn catalog(doc: &Document) -> &Dictionary {
    doc.get_dictionary(doc.trailer.get(b"Root").unwrap().as_reference().unwrap())
        .unwrap()
}

#[test]
fn test_merge_page_count() {
    let original = create_test_pdf(2);
    let (merged, summary) = merge_with_summary(&original, &overlay()).unwrap();

    assert_eq!(pages(&merged).len(), 3);
    assert_eq!(
        summary,
        MergeSummary {
            merged_pages: 2,
            appended_pages: 1,
            total_pages: 3,
        }
    );

    let pages_root = catalog(&merged).get(b"Pages").unwrap().as_reference().unwrap();
    let count = merged
        .get_dictionary(pages_root)
        .unwrap()
        .get(b"Count")
        .unwrap()
        .as_i64()
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_shared_pages_carry_both_contents() {
    let original = create_test_pdf(2);
    let merged = merge(&original, &overlay()).unwrap();
    let ids = pages(&merged);

    assert_eq!(annotation_names(&merged, ids[0]), vec!["a"]);
    assert_eq!(annotation_names(&merged, ids[1]), vec!["b", "c"]);

    let content = merged.get_page_content(ids[0]).unwrap();
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains("(Page 1) Tj"));
    assert!(text.contains("/FormOverlay1 Do"));
    assert!(text.find("(Page 1)").unwrap() < text.find("/FormOverlay1 Do").unwrap());

    let resources = merged
        .get_dictionary(ids[0])
        .unwrap()
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let form_id = xobjects.get(b"FormOverlay1").unwrap().as_reference().unwrap();
    let form = merged.get_object(form_id).unwrap().as_stream().unwrap();
    assert_eq!(form.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Form");
}

#[test]
fn test_widgets_point_at_their_new_page() {
    let original = create_test_pdf(2);
    let merged = merge(&original, &overlay()).unwrap();
    let ids = pages(&merged);

    for &page_id in &ids {
        let page = merged.get_dictionary(page_id).unwrap();
        for annot in page.get(b"Annots").unwrap().as_array().unwrap() {
            let widget = merged.get_dictionary(annot.as_reference().unwrap()).unwrap();
            assert_eq!(widget.get(b"P").unwrap().as_reference().unwrap(), page_id);
        }
    }
}

#[test]
fn test_extra_overlay_page_appended_unchanged() {
    let original = create_test_pdf(2);
    let overlay = overlay();
    let merged = merge(&original, &overlay).unwrap();

    let overlay_last = *pages(&overlay).last().unwrap();
    let merged_last = *pages(&merged).last().unwrap();

    assert_eq!(annotation_names(&merged, merged_last), vec!["d"]);
    assert_eq!(
        merged.get_page_content(merged_last).unwrap(),
        overlay.get_page_content(overlay_last).unwrap()
    );
    let media_box = |doc: &Document, id| -> Vec<f32> {
        doc.get_dictionary(id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_float().unwrap())
            .collect()
    };
    assert_eq!(media_box(&merged, merged_last), media_box(&overlay, overlay_last));
}

#[test]
fn test_extra_original_pages_untouched() {
    let original = create_test_pdf(4);
    let merged = merge(&original, &overlay()).unwrap();
    let ids = pages(&merged);
    let original_ids = pages(&original);

    assert_eq!(ids.len(), 4);
    assert_eq!(ids[3], original_ids[3]);

    let untouched = merged.get_dictionary(ids[3]).unwrap();
    assert!(untouched.get(b"Annots").is_err());
    assert_eq!(
        untouched.get(b"Contents").unwrap().as_reference().unwrap(),
        original
            .get_dictionary(original_ids[3])
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_reference()
            .unwrap()
    );
    assert_eq!(
        merged.get_page_content(ids[3]).unwrap(),
        original.get_page_content(original_ids[3]).unwrap()
    );
}

#[test]
fn test_acro_form_replaced_by_overlay() {
    let mut original = create_test_pdf(1);
    let stale = original.add_object(Dictionary::from_iter(vec![(
        "Fields",
        Object::Array(Vec::new()),
    )]));
    let catalog_id = original.trailer.get(b"Root").unwrap().as_reference().unwrap();
    original
        .get_dictionary_mut(catalog_id)
        .unwrap()
        .set("AcroForm", Object::Reference(stale));

    let merged = merge(&original, &overlay()).unwrap();
    let acro_form_id = catalog(&merged).get(b"AcroForm").unwrap().as_reference().unwrap();
    assert_ne!(acro_form_id, stale);

    let fields: Vec<ObjectId> = merged
        .get_dictionary(acro_form_id)
        .unwrap()
        .get(b"Fields")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field.as_reference().unwrap())
        .collect();
    assert_eq!(fields.len(), 4);

    // Registered fields are the same objects the pages reference
    let page_widget = merged
        .get_dictionary(pages(&merged)[0])
        .unwrap()
        .get(b"Annots")
        .unwrap()
        .as_array()
        .unwrap()[0]
        .as_reference()
        .unwrap();
    assert!(fields.contains(&page_widget));
}

#[test]
fn test_attach_renders_and_merges() {
    let settings = FormSettings::from_str(DEFINITIONS).unwrap();
    let original = create_test_pdf(3);
    let merged = attach(
        &original,
        settings.form("three").unwrap(),
        &OverlayOptions::default(),
    )
    .unwrap();
    assert_eq!(pages(&merged).len(), 3);
    assert_eq!(annotation_names(&merged, pages(&merged)[2]), vec!["d"]);
}

#[tokio::test]
async fn test_merged_document_survives_save_and_load() {
    let original = create_test_pdf(2);
    let merged = merge(&original, &overlay()).unwrap();

    let temp = NamedTempFile::new().unwrap();
    save_pdf(merged, temp.path()).await.unwrap();
    let reloaded = load_pdf(temp.path()).await.unwrap();

    let ids = pages(&reloaded);
    assert_eq!(ids.len(), 3);
    assert_eq!(annotation_names(&reloaded, ids[1]), vec!["b", "c"]);
}

#[tokio::test]
async fn test_unreadable_input() {
    let err = load_pdf("/definitely/not/here.pdf").await.unwrap_err();
    assert!(matches!(err, OverlayError::DocumentRead(_)));

    let err = load_pdf_bytes(b"not a pdf".to_vec()).await.unwrap_err();
    assert!(matches!(err, OverlayError::DocumentRead(_)));
}
