//! XObject creation and object import
//!
//! This module turns source pages into Form XObjects that can be
//! drawn onto output pages, and deep-copies objects from a source
//! document into the output.

use super::geometry::{PageBox, PageGeometry, normalize_rotation, resolve};
use crate::constants::INHERITABLE_PAGE_KEYS;
use crate::types::{OverlayError, PageSize, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Maps object ids in a source document to their copies in the output
pub type ObjectCache = HashMap<ObjectId, ObjectId>;

/// Upper bound on page tree depth when resolving inherited attributes
const MAX_TREE_DEPTH: usize = 64;

// =============================================================================
// XObject Creation
// =============================================================================

/// Create a Form XObject from a source page.
///
/// The XObject's bounding box is the page's visible box, so it can be
/// placed with the matrix from [`placement_matrix`](super::placement_matrix).
/// Resources are imported through `cache` so objects shared between
/// pages are copied once.
///
/// # Arguments
/// * `output` - The output document to add the XObject to
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `cache` - Cache to avoid copying the same object multiple times
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut ObjectCache,
) -> Result<ObjectId> {
    let geometry = page_geometry(source, page_id)?;
    let content_data = page_content(source, page_id)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", geometry.visible.to_object());
    xobject_dict.set("FormType", Object::Integer(1));

    let resources = match page_resources(source, page_id)? {
        Some(resources) => copy_object_deep(output, source, resources, cache)?,
        None => Object::Dictionary(Dictionary::new()),
    };
    xobject_dict.set("Resources", resources);

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

// =============================================================================
// Page Attributes
// =============================================================================

/// Look up a page attribute, walking up the page tree when the page
/// itself doesn't carry it.
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Resolve the visible box and rotation of a page.
///
/// The visible box is the `CropBox` clipped to the `MediaBox`; pages
/// without usable boxes fall back to US Letter.
pub fn page_geometry(doc: &Document, page_id: ObjectId) -> Result<PageGeometry> {
    // Fail on anything that isn't a readable dictionary
    doc.get_dictionary(page_id)?;

    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| PageBox::from_object(doc, obj));
    let crop_box = inherited_attribute(doc, page_id, b"CropBox")
        .and_then(|obj| PageBox::from_object(doc, obj));

    let visible = match (crop_box, media_box) {
        (Some(crop), Some(media)) => crop.intersect(&media).unwrap_or(media),
        (Some(crop), None) => crop,
        (None, Some(media)) => media,
        (None, None) => PageBox::letter(),
    };

    let rotation = inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
        .map(normalize_rotation)
        .unwrap_or(0);

    Ok(PageGeometry { visible, rotation })
}

/// Get the displayed page size (width, height) in points
pub fn page_size(doc: &Document, page_id: ObjectId) -> Result<PageSize> {
    Ok(page_geometry(doc, page_id)?.displayed_size())
}

/// Copy a page's inheritable attributes onto `dict` where it lacks them.
pub(crate) fn materialize_inherited(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    dict: &mut Dictionary,
    cache: &mut ObjectCache,
) -> Result<()> {
    for &key in INHERITABLE_PAGE_KEYS {
        if dict.has(key) {
            continue;
        }
        if let Some(value) = inherited_attribute(source, page_id, key) {
            dict.set(key.to_vec(), copy_object_deep(output, source, value, cache)?);
        }
    }
    Ok(())
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the decoded content of a page, concatenating multiple streams in order.
///
/// A page without `/Contents` is blank. Contents that don't resolve to
/// streams, or streams that can't be decoded, are an error.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Null => Ok(Vec::new()),
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Stream(stream) => decoded_stream(stream),
            Object::Array(arr) => get_concatenated_content_streams(doc, arr),
            other => Err(unexpected_contents(other)),
        },
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        other => Err(unexpected_contents(other)),
    }
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        let stream = match obj {
            Object::Reference(id) => match doc.get_object(*id)? {
                Object::Stream(stream) => stream,
                other => return Err(unexpected_contents(other)),
            },
            Object::Stream(stream) => stream,
            other => return Err(unexpected_contents(other)),
        };
        result.extend_from_slice(&decoded_stream(stream)?);
        result.push(b'\n');
    }

    Ok(result)
}

fn unexpected_contents(obj: &Object) -> OverlayError {
    let found = match obj {
        Object::Null => "null",
        Object::Boolean(_) => "a boolean",
        Object::Integer(_) | Object::Real(_) => "a number",
        Object::Name(_) => "a name",
        Object::String(..) => "a string",
        Object::Array(_) => "an array",
        Object::Dictionary(_) => "a dictionary",
        Object::Stream(_) => "a stream",
        Object::Reference(_) => "a reference",
    };
    OverlayError::Content(format!("expected a content stream, found {}", found))
}

/// Filters a content stream can be decoded through, with their abbreviations
const CONTENT_FILTERS: &[&[u8]] = &[
    b"FlateDecode",
    b"Fl",
    b"LZWDecode",
    b"LZW",
    b"ASCII85Decode",
    b"A85",
];

/// Stream data with filters removed, or the raw bytes when it has none
fn decoded_stream(stream: &Stream) -> Result<Vec<u8>> {
    let filters = stream_filters(stream);
    if filters.is_empty() {
        return Ok(stream.content.clone());
    }
    if let Some(unsupported) = filters.iter().find(|f| !CONTENT_FILTERS.contains(&f.as_slice())) {
        return Err(OverlayError::Content(format!(
            "unsupported content stream filter {}",
            String::from_utf8_lossy(unsupported)
        )));
    }

    let decoded = stream
        .decompressed_content()
        .map_err(|e| OverlayError::Content(format!("failed to decode content stream: {}", e)))?;

    // lopdf inflates broken zlib data to nothing instead of failing
    let is_flate = filters.iter().any(|f| f == b"FlateDecode" || f == b"Fl");
    if decoded.is_empty() && is_flate && !is_empty_zlib(&stream.content) {
        return Err(OverlayError::Content(
            "corrupt FlateDecode content stream".to_string(),
        ));
    }

    Ok(decoded)
}

/// Filter names of a stream, in application order
fn stream_filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(filters)) => filters
            .iter()
            .map(|f| match f {
                Object::Name(name) => name.clone(),
                _ => b"?".to_vec(),
            })
            .collect(),
        Ok(_) => vec![b"?".to_vec()],
        Err(_) => Vec::new(),
    }
}

/// A zlib stream of no data ends with the Adler-32 checksum of nothing
fn is_empty_zlib(data: &[u8]) -> bool {
    let trimmed = match data.iter().rposition(|b| !b.is_ascii_whitespace()) {
        Some(last) => &data[..=last],
        None => return true,
    };
    trimmed.len() >= 6 && trimmed.ends_with(&[0, 0, 0, 1])
}

/// Page resources, inherited if need be; a reference that doesn't resolve is an error
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Result<Option<&Object>> {
    let resources = inherited_attribute(doc, page_id, b"Resources");
    if let Some(Object::Reference(id)) = resources {
        doc.get_object(*id)?;
    }
    Ok(resources)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. The
/// output id is reserved before descending, so reference cycles resolve
/// to the copy under construction. Page tree nodes are never imported:
/// a reference to a page the cache doesn't map, or to a `Pages` node,
/// becomes `null`. Dangling references also become `null`.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut ObjectCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let referenced = match source.get_object(*id) {
                Ok(referenced) => referenced,
                Err(_) => {
                    log::warn!("Dropping dangling reference {} {} R", id.0, id.1);
                    return Ok(Object::Null);
                }
            };
            if is_page_tree_node(referenced) {
                return Ok(Object::Null);
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
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
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

/// Deep copy every entry of a dictionary
pub(crate) fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut ObjectCache,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

fn is_page_tree_node(obj: &Object) -> bool {
    let type_name = match obj {
        Object::Dictionary(dict) => dict.get(b"Type").ok(),
        _ => None,
    };
    matches!(type_name, Some(Object::Name(name)) if name == b"Page" || name == b"Pages")
}
