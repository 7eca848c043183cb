//! Output document assembly
//!
//! Walks the survey once, copying even pages and compositing odd pages
//! over the template, then closes the output page tree.

use crate::constants::{SURVEY_XOBJECT_NAME, TEMPLATE_PAGE_INDEX, TEMPLATE_XOBJECT_NAME};
use crate::options::OverlayOptions;
use crate::render::{
    Layer, ObjectCache, PageGeometry, copy_page, create_page_xobject, page_geometry,
    render_composite_page,
};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// The template page every composited page is drawn over
struct TemplateSource<'a> {
    doc: &'a Document,
    page_id: ObjectId,
    geometry: PageGeometry,
    cache: ObjectCache,
    /// Built on first use and shared by every composited page
    xobject_id: Option<ObjectId>,
}

impl<'a> TemplateSource<'a> {
    fn open(doc: &'a Document) -> Result<Self> {
        let page_id = doc
            .get_pages()
            .values()
            .nth(TEMPLATE_PAGE_INDEX)
            .copied()
            .ok_or(OverlayError::EmptyTemplate)?;

        let geometry = page_geometry(doc, page_id).map_err(|err| match err {
            OverlayError::Pdf(source) => OverlayError::InvalidDocument {
                role: DocumentRole::Template,
                source,
            },
            other => other,
        })?;

        Ok(Self {
            doc,
            page_id,
            geometry,
            cache: ObjectCache::new(),
            xobject_id: None,
        })
    }

    fn xobject(&mut self, output: &mut Document) -> Result<ObjectId> {
        if let Some(id) = self.xobject_id {
            return Ok(id);
        }
        let id = create_page_xobject(output, self.doc, self.page_id, &mut self.cache)?;
        self.xobject_id = Some(id);
        Ok(id)
    }
}

pub(crate) fn overlay_sync(
    template: &Document,
    survey: &Document,
    options: &OverlayOptions,
) -> Result<Document> {
    let mut template = TemplateSource::open(template)?;
    let template_size = template.geometry.displayed_size();

    let survey_page_ids: Vec<ObjectId> = survey.get_pages().values().copied().collect();

    let mut output = Document::with_version(options.pdf_version.as_str());
    let pages_tree_id = output.new_object_id();

    // One output page per survey page, reserved up front so references
    // between survey pages can be pointed at their output counterparts.
    let output_page_ids: Vec<ObjectId> = survey_page_ids
        .iter()
        .map(|_| output.new_object_id())
        .collect();
    let mut survey_cache: ObjectCache = survey_page_ids
        .iter()
        .copied()
        .zip(output_page_ids.iter().copied())
        .collect();

    for (page_index, (&source_id, &target_id)) in
        survey_page_ids.iter().zip(&output_page_ids).enumerate()
    {
        let treatment = PageTreatment::for_index(page_index);
        log::debug!("Survey page {}: {:?}", page_index, treatment);

        let placed = match treatment {
            PageTreatment::Passthrough => copy_page(
                &mut output,
                survey,
                source_id,
                target_id,
                pages_tree_id,
                &mut survey_cache,
            ),
            PageTreatment::Composite => composite_over_template(
                &mut output,
                &mut template,
                survey,
                source_id,
                target_id,
                pages_tree_id,
                &mut survey_cache,
                options,
            ),
        };
        placed.map_err(|err| OverlayError::composite(page_index, err))?;
    }

    finish_page_tree(&mut output, pages_tree_id, &output_page_ids);

    log::info!(
        "Overlay complete: {} pages, template size {}",
        output_page_ids.len(),
        template_size
    );

    Ok(output)
}

#[allow(clippy::too_many_arguments)]
fn composite_over_template(
    output: &mut Document,
    template: &mut TemplateSource<'_>,
    survey: &Document,
    source_id: ObjectId,
    target_id: ObjectId,
    pages_tree_id: ObjectId,
    survey_cache: &mut ObjectCache,
    options: &OverlayOptions,
) -> Result<()> {
    let template_xobject_id = template.xobject(output)?;
    let survey_geometry = page_geometry(survey, source_id)?;
    let survey_xobject_id = create_page_xobject(output, survey, source_id, survey_cache)?;

    let layers = [
        Layer {
            name: TEMPLATE_XOBJECT_NAME,
            xobject_id: template_xobject_id,
            geometry: template.geometry,
        },
        Layer {
            name: SURVEY_XOBJECT_NAME,
            xobject_id: survey_xobject_id,
            geometry: survey_geometry,
        },
    ];

    render_composite_page(
        output,
        target_id,
        pages_tree_id,
        template.geometry.displayed_size(),
        &layers,
        options.scaling_mode,
    )
}

/// Write the page tree root and catalog
fn finish_page_tree(output: &mut Document, pages_tree_id: ObjectId, page_ids: &[ObjectId]) {
    let page_refs: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}
