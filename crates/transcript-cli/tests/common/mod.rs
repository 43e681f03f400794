//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use std::io::Write;

use assert_cmd::Command;

pub fn cmd() -> Command {
    Command::cargo_bin("transcript").unwrap()
}

pub const SAMPLE: &[&str] = &[
    "Leistungsübersicht",
    "WS23 Wintersemester",
    "A1 Grundlagen der Informatik",
    "Mathematik für Informatiker 1,3 6,0",
    "A5 Überfachliche Kompetenzen",
    "Ethik 2,0 3,0",
];

/// Build a single-page PDF with one text line per entry, 14pt apart.
pub fn transcript_pdf(lines: &[&str]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut content = String::from("BT /F1 10 Tf 14 TL 56 760 Td\n");
    for line in lines {
        content.push_str(&format!("({line}) Tj T*\n"));
    }
    content.push_str("ET");
    // WinAnsi: the fixture text is Latin-1 only.
    let bytes: Vec<u8> = content
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap())
        .collect();

    let mut doc = lopdf::Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), bytes));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        },
    });
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    });
    if let Ok(dict) = doc.get_object_mut(page_id).and_then(|o| o.as_dict_mut()) {
        dict.set("Parent", Object::Reference(pages_id));
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn write_temp_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(bytes).unwrap();
    f.flush().unwrap();
    f
}

pub fn sample_file() -> tempfile::NamedTempFile {
    write_temp_pdf(&transcript_pdf(SAMPLE))
}
