//! Page-by-page merge of an overlay onto an original document

use crate::error::{OverlayError, Result};
use crate::options::OverlayOptions;
use crate::render::render_overlay;
use crate::xobject::{
    CopyCache, copy_object_deep, copy_page, create_page_xobject, page_resources, resolve,
};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_form_layout::ResolvedLayout;

/// Pages and widgets carried over by a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    /// Pages where overlay content was composited onto an original page
    pub merged_pages: usize,
    /// Overlay pages appended after the original's last page
    pub appended_pages: usize,
    pub total_pages: usize,
}

fn catalog_id(doc: &Document) -> Result<ObjectId> {
    Ok(doc.trailer.get(b"Root")?.as_reference()?)
}

fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    let catalog = doc.get_dictionary(catalog_id(doc)?)?;
    Ok(catalog.get(b"Pages")?.as_reference()?)
}

/// Pick a resource name not already present in `dict`.
fn unused_name(dict: &Dictionary, stem: &str) -> String {
    let mut index = 1;
    loop {
        let name = format!("{}{}", stem, index);
        if !dict.has(name.as_bytes()) {
            return name;
        }
        index += 1;
    }
}

/// Merge `overlay` onto `original`, index by index, up to the longer of the two.
///
/// Where both have a page, the overlay page is drawn above the original
/// content and its widgets are added to the page's annotations. Extra overlay
/// pages are appended unchanged; extra original pages are left untouched.
/// The result's `/AcroForm` is replaced by the overlay's.
pub fn merge(original: &Document, overlay: &Document) -> Result<Document> {
    let (merged, summary) = merge_with_summary(original, overlay)?;
    log::info!(
        "Merged overlay: {} page(s) composited, {} appended, {} total",
        summary.merged_pages,
        summary.appended_pages,
        summary.total_pages
    );
    Ok(merged)
}

pub fn merge_with_summary(
    original: &Document,
    overlay: &Document,
) -> Result<(Document, MergeSummary)> {
    let mut base = original.clone();
    let base_pages: Vec<ObjectId> = base.get_pages().into_values().collect();
    let overlay_pages: Vec<ObjectId> = overlay.get_pages().into_values().collect();
    let pages_root = pages_root_id(&base)?;

    // Overlay pages map onto the base page they land on, so widget `/P`
    // entries and any other page references follow them.
    let mut cache = CopyCache::new();
    let mut appended = Vec::new();
    for (index, &overlay_page) in overlay_pages.iter().enumerate() {
        match base_pages.get(index) {
            Some(&base_page) => {
                cache.insert(overlay_page, base_page);
            }
            None => {
                let target = base.new_object_id();
                cache.insert(overlay_page, target);
                appended.push((overlay_page, target));
            }
        }
    }

    let shared = base_pages.len().min(overlay_pages.len());
    for index in 0..shared {
        overlay_page(&mut base, overlay, overlay_pages[index], base_pages[index], &mut cache)?;
    }

    for &(overlay_page, target) in &appended {
        copy_page(&mut base, overlay, overlay_page, target, pages_root, &mut cache)?;
        append_kid(&mut base, pages_root, target)?;
    }

    replace_acro_form(&mut base, overlay, &mut cache)?;

    let summary = MergeSummary {
        merged_pages: shared,
        appended_pages: appended.len(),
        total_pages: base_pages.len() + appended.len(),
    };
    Ok((base, summary))
}

/// Render `layout` and merge it onto `original` in one step.
pub fn attach(
    original: &Document,
    layout: &ResolvedLayout,
    options: &OverlayOptions,
) -> Result<Document> {
    let overlay = render_overlay(layout, options)?;
    merge(original, &overlay)
}

/// Composite one overlay page onto one base page.
fn overlay_page(
    base: &mut Document,
    overlay: &Document,
    overlay_page: ObjectId,
    base_page: ObjectId,
    cache: &mut CopyCache,
) -> Result<()> {
    let xobject_id = create_page_xobject(base, overlay, overlay_page, cache)?;

    let mut resources = page_resources(base, base_page)?;
    let mut xobjects = match resources.get(b"XObject") {
        Ok(xobjects) => resolve(base, xobjects)?.as_dict()?.clone(),
        Err(_) => Dictionary::new(),
    };
    let name = unused_name(&xobjects, "FormOverlay");
    xobjects.set(name.as_bytes().to_vec(), Object::Reference(xobject_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    // Original content runs inside q/Q so its graphics state cannot leak
    // into the overlay.
    let open_id = base.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let close_id = base.add_object(Stream::new(
        Dictionary::new(),
        format!("\nQ\nq /{} Do Q\n", name).into_bytes(),
    ));

    let existing_contents = base.get_dictionary(base_page)?.get(b"Contents").ok().cloned();
    let mut contents = vec![Object::Reference(open_id)];
    match existing_contents {
        Some(Object::Array(items)) => contents.extend(items),
        Some(Object::Reference(id)) => match base.get_object(id)? {
            Object::Array(items) => contents.extend(items.iter().cloned()),
            _ => contents.push(Object::Reference(id)),
        },
        Some(Object::Stream(stream)) => contents.push(Object::Reference(base.add_object(stream))),
        _ => {}
    }
    contents.push(Object::Reference(close_id));

    let mut annots = match base.get_dictionary(base_page)?.get(b"Annots") {
        Ok(existing) => resolve(base, existing)?.as_array()?.clone(),
        Err(_) => Vec::new(),
    };
    let overlay_annots = match overlay.get_dictionary(overlay_page)?.get(b"Annots") {
        Ok(items) => resolve(overlay, items)?.as_array()?.clone(),
        Err(_) => Vec::new(),
    };
    let widget_count = overlay_annots.len();
    for annot in &overlay_annots {
        annots.push(copy_object_deep(base, overlay, annot, cache)?);
    }

    let page = base.get_dictionary_mut(base_page)?;
    page.set("Contents", Object::Array(contents));
    page.set("Resources", Object::Dictionary(resources));
    if !annots.is_empty() {
        page.set("Annots", Object::Array(annots));
    }

    log::debug!(
        "Composited overlay page onto {:?} ({} annotation(s))",
        base_page,
        widget_count
    );
    Ok(())
}

fn append_kid(doc: &mut Document, pages_root: ObjectId, page_id: ObjectId) -> Result<()> {
    let pages = doc.get_dictionary_mut(pages_root)?;
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    match pages.get_mut(b"Kids") {
        Ok(Object::Array(kids)) => kids.push(Object::Reference(page_id)),
        _ => {
            return Err(OverlayError::Structure(
                "page tree root has no inline Kids array".to_string(),
            ));
        }
    }
    pages.set("Count", Object::Integer(count + 1));
    Ok(())
}

/// Replace the interactive form wholesale with a copy of the overlay's.
fn replace_acro_form(base: &mut Document, overlay: &Document, cache: &mut CopyCache) -> Result<()> {
    let overlay_catalog = overlay.get_dictionary(catalog_id(overlay)?)?;
    let acro_form = match overlay_catalog.get(b"AcroForm") {
        Ok(acro_form) => Some(copy_object_deep(base, overlay, acro_form, cache)?),
        Err(_) => None,
    };

    let catalog = base.get_dictionary_mut(catalog_id(base)?)?;
    match acro_form {
        Some(acro_form) => catalog.set("AcroForm", acro_form),
        None => {
            catalog.remove(b"AcroForm");
        }
    }
    Ok(())
}
