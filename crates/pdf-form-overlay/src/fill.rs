//! Writing field values into a document's widgets

use crate::constants::DEFAULT_ON_STATE;
use crate::error::Result;
use crate::xobject::resolve;
use lopdf::{Dictionary, Document, Object, ObjectId, decode_text_string, text_string};
use pdf_form_layout::{FieldValue, FieldValues};

/// Widgets seen and written by a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillSummary {
    /// Named widget annotations found on the pages
    pub widgets: usize,
    /// Widgets that received a value
    pub filled: usize,
}

/// Fill widgets by name.
///
/// Booleans set the checked appearance state when `true` and are otherwise
/// ignored. Any other value becomes the field's `/V` and drops the cached
/// appearance. Names with no widget are ignored. The interactive form is
/// always flagged with `NeedAppearances`.
pub fn fill(doc: &mut Document, values: &FieldValues) -> Result<FillSummary> {
    let annotations = annotation_ids(doc)?;
    let mut summary = FillSummary::default();
    let mut named_widgets = Vec::new();

    for id in annotations {
        let annotation = match doc.get_dictionary(id) {
            Ok(annotation) => annotation,
            Err(e) => {
                log::warn!("Skipping unreadable annotation {:?}: {}", id, e);
                continue;
            }
        };
        let Some(name) = widget_name(annotation) else {
            continue;
        };
        summary.widgets += 1;
        named_widgets.push(Object::Reference(id));

        let Some(value) = values.get(&name) else {
            continue;
        };
        match value {
            FieldValue::Bool(true) => {
                let state = on_state(doc, doc.get_dictionary(id)?);
                doc.get_dictionary_mut(id)?
                    .set("AS", Object::Name(state));
                summary.filled += 1;
            }
            FieldValue::Bool(false) => {}
            FieldValue::Text(text) => {
                let widget = doc.get_dictionary_mut(id)?;
                widget.set("V", text_string(text));
                widget.remove(b"AP");
                summary.filled += 1;
            }
        }
        log::debug!("Filled field '{}'", name);
    }

    request_appearances(doc, named_widgets)?;
    log::info!(
        "Filled {} of {} widget(s) from {} value(s)",
        summary.filled,
        summary.widgets,
        values.len()
    );
    Ok(summary)
}

/// Ids of every page annotation.
///
/// Inline annotation dictionaries are moved into indirect objects so they
/// can be updated by id.
fn annotation_ids(doc: &mut Document) -> Result<Vec<ObjectId>> {
    let mut ids = Vec::new();
    for page_id in doc.get_pages().into_values() {
        let annots = match doc.get_dictionary(page_id)?.get(b"Annots") {
            Ok(annots) => annots.clone(),
            Err(_) => continue,
        };
        let (holder, items) = match annots {
            Object::Reference(id) => match doc.get_object(id) {
                Ok(Object::Array(items)) => (Some(id), items.clone()),
                _ => {
                    log::warn!("Skipping unreadable annotation list {:?}", id);
                    continue;
                }
            },
            Object::Array(items) => (None, items),
            _ => continue,
        };

        let mut moved = false;
        let mut normalized = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Object::Reference(id) => {
                    ids.push(id);
                    normalized.push(Object::Reference(id));
                }
                Object::Dictionary(dict) => {
                    let id = doc.add_object(dict);
                    ids.push(id);
                    normalized.push(Object::Reference(id));
                    moved = true;
                }
                other => normalized.push(other),
            }
        }

        if moved {
            match holder {
                Some(id) => {
                    doc.objects.insert(id, Object::Array(normalized));
                }
                None => doc
                    .get_dictionary_mut(page_id)?
                    .set("Annots", Object::Array(normalized)),
            }
        }
    }
    Ok(ids)
}

/// The widget's own `/T`, if it is a named widget annotation.
fn widget_name(annotation: &Dictionary) -> Option<String> {
    let subtype = annotation.get(b"Subtype").and_then(Object::as_name).ok()?;
    if subtype != b"Widget" {
        return None;
    }
    decode_text_string(annotation.get(b"T").ok()?).ok()
}

/// The widget's "on" appearance state: the non-`Off` normal appearance name.
fn on_state(doc: &Document, widget: &Dictionary) -> Vec<u8> {
    widget
        .get(b"AP")
        .ok()
        .and_then(|ap| resolve(doc, ap).ok())
        .and_then(|ap| ap.as_dict().ok())
        .and_then(|ap| ap.get(b"N").ok())
        .and_then(|normal| resolve(doc, normal).ok())
        .and_then(|normal| normal.as_dict().ok())
        .and_then(|states| {
            states
                .iter()
                .map(|(state, _)| state)
                .find(|state| state.as_slice() != b"Off")
                .cloned()
        })
        .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec())
}

/// Set `NeedAppearances`, creating the interactive form if there is none.
fn request_appearances(doc: &mut Document, widgets: Vec<Object>) -> Result<()> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let acro_form = doc.get_dictionary(catalog_id)?.get(b"AcroForm").ok().cloned();

    match acro_form {
        Some(Object::Reference(id)) => {
            doc.get_dictionary_mut(id)?
                .set("NeedAppearances", Object::Boolean(true));
        }
        Some(Object::Dictionary(mut acro_form)) => {
            acro_form.set("NeedAppearances", Object::Boolean(true));
            doc.get_dictionary_mut(catalog_id)?
                .set("AcroForm", Object::Dictionary(acro_form));
        }
        _ => {
            log::debug!("Document has no interactive form; creating one");
            let acro_form_id = doc.add_object(Dictionary::from_iter(vec![
                ("Fields", Object::Array(widgets)),
                ("NeedAppearances", Object::Boolean(true)),
            ]));
            doc.get_dictionary_mut(catalog_id)?
                .set("AcroForm", Object::Reference(acro_form_id));
        }
    }
    Ok(())
}
