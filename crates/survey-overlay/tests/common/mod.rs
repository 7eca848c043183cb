#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

pub const LETTER: (i64, i64) = (612, 792);
pub const A4_LANDSCAPE: (i64, i64) = (842, 595);

fn media_box(size: (i64, i64)) -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(size.0),
        Object::Integer(size.1),
    ])
}

/// Content stream that identifies a page by its label
pub fn page_marker(label: &str) -> Vec<u8> {
    format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", label).into_bytes()
}

/// Build a document with one page per entry of `sizes`.
///
/// Every page draws its label (`"{prefix} {index}"`) with a Helvetica
/// font shared by all pages.
pub fn create_test_pdf(prefix: &str, sizes: &[(i64, i64)]) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::new();
    for (index, &size) in sizes.iter().enumerate() {
        let label = format!("{} {}", prefix, index);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), page_marker(&label)));

        let resources = Dictionary::from_iter(vec![(
            "Font",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "F1",
                Object::Reference(font_id),
            )])),
        )]);

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", media_box(size)),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    finish(&mut doc, pages_id, kids, Dictionary::new());
    doc
}

/// Letter-sized pages
pub fn create_uniform_pdf(prefix: &str, num_pages: usize) -> Document {
    create_test_pdf(prefix, &vec![LETTER; num_pages])
}

/// Pages that inherit their MediaBox and Resources from the page tree root
pub fn create_inheriting_pdf(prefix: &str, num_pages: usize, size: (i64, i64)) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Courier".to_vec())),
    ]));

    let mut kids = Vec::new();
    for index in 0..num_pages {
        let label = format!("{} {}", prefix, index);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), page_marker(&label)));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let inherited = Dictionary::from_iter(vec![
        ("MediaBox", media_box(size)),
        (
            "Resources",
            Object::Dictionary(Dictionary::from_iter(vec![(
                "Font",
                Object::Dictionary(Dictionary::from_iter(vec![(
                    "F1",
                    Object::Reference(font_id),
                )])),
            )])),
        ),
    ]);

    finish(&mut doc, pages_id, kids, inherited);
    doc
}

fn finish(doc: &mut Document, pages_id: ObjectId, kids: Vec<Object>, extra: Dictionary) {
    let count = kids.len() as i64;
    let mut pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(count)),
    ]);
    for (key, value) in extra.iter() {
        pages_dict.set(key.clone(), value.clone());
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);
}

pub fn to_bytes(doc: &Document) -> Vec<u8> {
    let mut doc = doc.clone();
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Find a named XObject on a page
pub fn page_xobject(doc: &Document, page_id: ObjectId, name: &str) -> Option<ObjectId> {
    let page = doc.get_dictionary(page_id).ok()?;
    let resources = page.get(b"Resources").ok()?.as_dict().ok()?;
    let xobjects = resources.get(b"XObject").ok()?.as_dict().ok()?;
    xobjects.get(name.as_bytes()).ok()?.as_reference().ok()
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    find(haystack, needle).is_some()
}

pub fn find(haystack: &[u8], needle: &str) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle.as_bytes())
}
