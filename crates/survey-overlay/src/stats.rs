use crate::constants::TEMPLATE_PAGE_INDEX;
use crate::render::page_size;
use crate::types::*;
use lopdf::Document;

/// Calculate statistics for an overlay without building the output
pub fn calculate_statistics(template: &Document, survey: &Document) -> Result<OverlayStatistics> {
    let template_page_id = template
        .get_pages()
        .values()
        .nth(TEMPLATE_PAGE_INDEX)
        .copied()
        .ok_or(OverlayError::EmptyTemplate)?;
    let template_size = page_size(template, template_page_id)?;

    let survey_pages = survey.get_pages().len();
    let composited_pages = (0..survey_pages)
        .filter(|&index| PageTreatment::for_index(index).is_composite())
        .count();

    Ok(OverlayStatistics {
        survey_pages,
        composited_pages,
        passthrough_pages: survey_pages - composited_pages,
        template_size,
    })
}
