use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to parse {0}: {1}")]
    Parse(String, String),
    #[error("Document is empty: {0}")]
    Empty(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A loaded text unit with its source metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub page_content: String,
    pub metadata: HashMap<String, String>,
}

pub fn supported_formats() -> Vec<&'static str> {
    vec!["pdf", "docx", "doc", "txt"]
}

/// Load a file into documents, dispatching on the extension. PDFs yield
/// one document per page; other formats yield a single document.
pub fn load_document(path: &Path) -> Result<Vec<Document>, DocumentError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let documents = match extension.as_str() {
        "pdf" => {
            let pages = pdf_extract::extract_text_by_pages(path)
                .map_err(|e| DocumentError::Parse(path.display().to_string(), e.to_string()))?;
            paged_documents(pages, &source, &extension)
        }
        "docx" | "doc" => single_document(extract_docx_text(path)?, &source, &extension),
        "txt" => single_document(std::fs::read_to_string(path)?, &source, &extension),
        other => return Err(DocumentError::UnsupportedFormat(other.to_string())),
    };

    if documents.is_empty() {
        return Err(DocumentError::Empty(path.display().to_string()));
    }
    Ok(documents)
}

fn base_metadata(source: &str, file_type: &str) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), source.to_string());
    metadata.insert("file_type".to_string(), file_type.to_string());
    metadata
}

fn single_document(text: String, source: &str, file_type: &str) -> Vec<Document> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    vec![Document {
        page_content: text,
        metadata: base_metadata(source, file_type),
    }]
}

/// Blank pages are dropped; the page number in the metadata stays 1-based
/// relative to the original file.
fn paged_documents(pages: Vec<String>, source: &str, file_type: &str) -> Vec<Document> {
    pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| {
            let mut metadata = base_metadata(source, file_type);
            metadata.insert("page".to_string(), (index + 1).to_string());
            Document {
                page_content: text,
                metadata,
            }
        })
        .collect()
}

/// Word documents are zip archives; the body text lives in
/// word/document.xml. Paragraph ends become newlines. Legacy binary .doc
/// files are not zip archives and fail here with a parse error.
fn extract_docx_text(path: &Path) -> Result<String, DocumentError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| DocumentError::Parse(path.display().to_string(), e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Parse(path.display().to_string(), e.to_string()))?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let fragment = t
                    .unescape()
                    .map_err(|e| DocumentError::Parse(path.display().to_string(), e.to_string()))?;
                text.push_str(&fragment);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocumentError::Parse(
                    path.display().to_string(),
                    e.to_string(),
                ))
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_plain_text_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Bedrock powers the chat features.").unwrap();

        let docs = load_document(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page_content, "Bedrock powers the chat features.");
        assert_eq!(docs[0].metadata["source"], "notes.txt");
        assert_eq!(docs[0].metadata["file_type"], "txt");
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, "x").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(ext) if ext == "pptx"));
    }

    #[test]
    fn empty_text_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "  \n").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Empty(_)));
    }

    #[test]
    fn extracts_paragraphs_from_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");

        let document_xml = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>",
            "<w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>",
            "<w:p><w:r><w:t>Second paragraph.</w:t></w:r></w:p>",
            "</w:body></w:document>"
        );

        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();

        let docs = load_document(&path).unwrap();
        assert_eq!(
            docs[0].page_content,
            "First paragraph.\nSecond paragraph.\n"
        );
        assert_eq!(docs[0].metadata["file_type"], "docx");
    }

    #[test]
    fn pdf_pages_become_documents_with_page_numbers() {
        let pages = vec![
            "Introduction text.".to_string(),
            "   \n".to_string(),
            "Findings and results.".to_string(),
        ];

        let docs = paged_documents(pages, "paper.pdf", "pdf");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].page_content, "Introduction text.");
        assert_eq!(docs[0].metadata["page"], "1");
        assert_eq!(docs[0].metadata["source"], "paper.pdf");
        assert_eq!(docs[1].page_content, "Findings and results.");
        assert_eq!(docs[1].metadata["page"], "3");
    }

    #[test]
    fn legacy_doc_that_is_not_a_zip_fails_with_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.doc");
        std::fs::write(&path, b"\xd0\xcf\x11\xe0 binary word file").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_, _)));
    }
}
