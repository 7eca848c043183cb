#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, header};
use lopdf::{Dictionary, Document, Object, Stream};
use std::path::Path;
use survey_overlay_server::{AppState, ServerConfig};

pub const BOUNDARY: &str = "survey-overlay-test-boundary";

/// Serialized document with `num_pages` Letter pages
pub fn pdf_bytes(num_pages: usize) -> Vec<u8> {
    save(pdf_document(num_pages))
}

/// Serialized document whose page `broken` points at content that doesn't exist
pub fn pdf_bytes_with_broken_page(num_pages: usize, broken: usize) -> Vec<u8> {
    let mut doc = pdf_document(num_pages);
    let page_id = doc.get_pages()[&(broken as u32 + 1)];
    doc.get_object_mut(page_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Contents", Object::Reference((9999, 0)));
    save(doc)
}

fn pdf_document(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for index in 0..num_pages {
        let content = format!("BT 72 720 Td (Page {}) Tj ET", index).into_bytes();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
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

fn save(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

/// A file part of a multipart body: (field name, file name, contents)
pub type Part<'a> = (&'a str, &'a str, &'a [u8]);

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn test_config(processed_dir: &Path) -> ServerConfig {
    ServerConfig {
        processed_dir: processed_dir.to_path_buf(),
        ..ServerConfig::default()
    }
}

pub fn test_state(processed_dir: &Path) -> AppState {
    AppState::new(test_config(processed_dir))
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
