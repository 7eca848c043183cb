//! PDF rendering modules for overlay
//!
//! This module handles all PDF-specific operations:
//! - Resolving page geometry and placement matrices
//! - Creating XObjects from source pages
//! - Copying and compositing output pages
//! - Deep copying PDF objects

mod geometry;
mod page;
mod xobject;

pub use geometry::{
    Matrix, PageBox, PageGeometry, normalize_rotation, placement_command, placement_matrix,
};
pub use page::{Layer, copy_page, render_composite_page};
pub use xobject::{
    ObjectCache, copy_object_deep, create_page_xobject, inherited_attribute, page_content,
    page_geometry, page_size,
};
