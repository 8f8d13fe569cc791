//! Cross-document object copying
//!
//! Pages of one document are wrapped as Form XObjects in another, and their
//! annotations are copied over with every reference remapped to the target.

use crate::error::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Source object id to target object id.
pub type CopyCache = HashMap<ObjectId, ObjectId>;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// US Letter, used when no MediaBox can be found.
const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

// =============================================================================
// Page Tree Lookup
// =============================================================================

/// Follow a single reference, if `obj` is one.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Look up `key` on the page, falling back to its ancestors.
///
/// # Arguments
/// * `doc` - The document holding the page tree
/// * `page_id` - The object ID of the page
/// * `key` - An inheritable page attribute such as `Resources` or `MediaBox`
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok();
    // Bounded walk, page trees can be malformed
    for _ in 0..64 {
        let dict = current?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    None
}

/// Effective resources of a page as an owned dictionary.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    match inherited_attribute(doc, page_id, b"Resources") {
        Some(resources) => Ok(resolve(doc, resources)?.as_dict()?.clone()),
        None => Ok(Dictionary::new()),
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Wrap a source page as a Form XObject in `output`.
///
/// The XObject's bounding box is the page's (possibly inherited) MediaBox,
/// and its resources are deep copied through `cache`.
///
/// # Arguments
/// * `output` - The document the XObject is added to
/// * `source` - The document containing the page
/// * `page_id` - The object ID of the source page
/// * `cache` - Source to target id mapping shared with other copies
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut CopyCache,
) -> Result<ObjectId> {
    let media_box = match inherited_attribute(source, page_id, b"MediaBox") {
        Some(media_box) => resolve(source, media_box)?.as_array()?.clone(),
        None => DEFAULT_MEDIA_BOX.iter().map(|&v| Object::Integer(v)).collect(),
    };
    let content = page_content(source, source.get_dictionary(page_id)?)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(media_box));
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content)))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Decoded content of a page, streams joined with newlines.
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => resolve(doc, contents)?,
        Err(_) => return Ok(Vec::new()),
    };

    let streams: Vec<&Stream> = match contents {
        Object::Stream(stream) => vec![stream],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| resolve(doc, item).ok())
            .filter_map(|item| item.as_stream().ok())
            .collect(),
        _ => Vec::new(),
    };

    let mut result = Vec::new();
    for stream in streams {
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        result.extend_from_slice(&content);
        result.push(b'\n');
    }
    Ok(result)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Copy a page dictionary to `output` under a pre-reserved id.
///
/// Inherited attributes are materialized on the copy; `Parent` is replaced.
/// The page is entered into `cache` first, so annotations pointing back at
/// it through `/P` land on the copy.
///
/// # Arguments
/// * `output` - The document receiving the page
/// * `source` - The document containing the page
/// * `page_id` - The object ID of the source page
/// * `target_id` - The id reserved for the copy in `output`
/// * `parent_id` - The page tree node the copy is attached under
/// * `cache` - Source to target id mapping shared with other copies
pub fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    target_id: ObjectId,
    parent_id: ObjectId,
    cache: &mut CopyCache,
) -> Result<()> {
    cache.insert(page_id, target_id);
    let mut page = source.get_dictionary(page_id)?.clone();
    page.remove(b"Parent");
    for key in INHERITABLE {
        if !page.has(key) {
            if let Some(value) = inherited_attribute(source, page_id, key) {
                page.set(key.to_vec(), value.clone());
            }
        }
    }

    let mut copied = Dictionary::new();
    for (key, value) in page.iter() {
        copied.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    copied.set("Parent", Object::Reference(parent_id));
    output.objects.insert(target_id, Object::Dictionary(copied));
    Ok(())
}

/// Deep copy an object from `source` into `output`, following references.
///
/// The target id is reserved before recursing, so reference cycles
/// (field parents and kids, widgets and pages) terminate.
///
/// # Arguments
/// * `output` - The document receiving the copy
/// * `source` - The document `obj` belongs to
/// * `obj` - The object to copy; references are followed
/// * `cache` - Source to target id mapping; hits are reused, not copied again
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut CopyCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}
