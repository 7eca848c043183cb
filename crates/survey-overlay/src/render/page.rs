//! Output page construction
//!
//! Two kinds of output page exist: verbatim copies of a source page,
//! and composited pages that stack Form XObjects bottom to top.

use super::geometry::{PageBox, PageGeometry, placement_command, placement_matrix};
use super::xobject::{
    ObjectCache, copy_dictionary, materialize_inherited, page_content, page_resources,
};
use crate::types::{PageSize, Result, ScalingMode};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// One Form XObject drawn on a composited page
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    /// Resource name the content stream uses for the XObject
    pub name: &'a str,
    pub xobject_id: ObjectId,
    /// Geometry of the page the XObject was made from
    pub geometry: PageGeometry,
}

/// Copy a source page into the output at `new_page_id`.
///
/// The page keeps its own content, boxes and annotations. Attributes it
/// inherited from its source page tree are written onto the copy, and
/// its `Parent` becomes `parent_pages_id`. The caller is expected to have
/// mapped `page_id` to `new_page_id` in `cache`, so references back to the
/// page (such as an annotation's `/P`) land on the copy.
///
/// Fails when the page's content or resources can't be read.
pub fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    new_page_id: ObjectId,
    parent_pages_id: ObjectId,
    cache: &mut ObjectCache,
) -> Result<()> {
    // The copy keeps the raw streams, but a page whose content or
    // resources are missing or undecodable must not pass as blank
    page_content(source, page_id)?;
    page_resources(source, page_id)?;

    let mut page_dict = source.get_dictionary(page_id)?.clone();
    page_dict.remove(b"Parent");

    let mut new_dict = copy_dictionary(output, source, &page_dict, cache)?;
    materialize_inherited(output, source, page_id, &mut new_dict, cache)?;
    new_dict.set("Parent", Object::Reference(parent_pages_id));

    output
        .objects
        .insert(new_page_id, Object::Dictionary(new_dict));
    Ok(())
}

/// Render a composited page at `page_id`.
///
/// Every layer is fitted to the full page rectangle; layers are painted
/// in order, so the first one ends up at the bottom.
pub fn render_composite_page(
    output: &mut Document,
    page_id: ObjectId,
    parent_pages_id: ObjectId,
    size: PageSize,
    layers: &[Layer<'_>],
    scaling_mode: ScalingMode,
) -> Result<()> {
    let page_rect = PageBox::from_size(size);

    let mut content_ops = Vec::with_capacity(layers.len());
    let mut xobjects = Dictionary::new();

    for layer in layers {
        xobjects.set(layer.name.as_bytes(), Object::Reference(layer.xobject_id));
        let matrix = placement_matrix(&layer.geometry, &page_rect, scaling_mode);
        content_ops.push(placement_command(layer.name, &matrix));
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set("MediaBox", page_rect.to_object());
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    output
        .objects
        .insert(page_id, Object::Dictionary(page_dict));
    Ok(())
}
