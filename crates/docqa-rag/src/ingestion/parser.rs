//! Document parsers producing page-level text

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::PageText;

/// Turns a document on disk into ordered page texts
pub trait DocumentParser: Send + Sync {
    /// Parse the document; pages are returned in order, numbered from 1
    fn parse(&self, path: &Path) -> Result<Vec<PageText>>;

    /// Get parser name for logging
    fn name(&self) -> &str;
}

/// Supported document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// PDF document
    Pdf,
    /// Plain text or markdown
    Text,
}

impl DocumentKind {
    /// Detect the kind from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" | "markdown" => Some(Self::Text),
            _ => None,
        }
    }

    /// Detect the kind from a path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Replace ligatures and typographic glyphs that PDF fonts commonly emit
fn cleanup_pdf_text(text: &str) -> String {
    let text = text
        .replace('\0', "")
        .replace('\u{00A0}', " ")  // Non-breaking space -> space
        .replace('\u{2010}', "-")  // Hyphen -> regular hyphen
        .replace('\u{2011}', "-")  // Non-breaking hyphen -> hyphen
        .replace('\u{2018}', "'")  // Left single quote -> apostrophe
        .replace('\u{2019}', "'")  // Right single quote -> apostrophe
        .replace('\u{201C}', "\"") // Left double quote -> quote
        .replace('\u{201D}', "\"") // Right double quote -> quote
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-format file parser (PDF, plain text, markdown)
#[derive(Debug, Default, Clone, Copy)]
pub struct FileParser;

impl FileParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }

    /// Parse in-memory bytes of a known kind
    pub fn parse_bytes(kind: DocumentKind, label: &str, data: &[u8]) -> Result<Vec<PageText>> {
        match kind {
            DocumentKind::Pdf => Self::parse_pdf(label, data),
            DocumentKind::Text => Self::parse_text(label, data),
        }
    }

    /// Parse PDF pages with lopdf, falling back to pdf-extract for the whole document
    fn parse_pdf(label: &str, data: &[u8]) -> Result<Vec<PageText>> {
        let pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Self::extract_pdf_pages(&doc),
            Err(e) => {
                tracing::warn!("lopdf could not load {}: {}, trying pdf-extract", label, e);
                Vec::new()
            }
        };

        if pages.iter().any(|p| !p.text.trim().is_empty()) {
            return Ok(pages);
        }

        let content = cleanup_pdf_text(&Self::extract_pdf_with_timeout(label, data)?);
        if content.trim().is_empty() {
            return Err(Error::load(
                label,
                "No text content could be extracted from PDF (it may be image-based)",
            ));
        }

        tracing::info!("Extracted {} characters from {} as a single page", content.len(), label);
        Ok(vec![PageText::new(1, content)])
    }

    fn extract_pdf_pages(doc: &lopdf::Document) -> Vec<PageText> {
        doc.get_pages()
            .keys()
            .map(|&page_number| {
                let text = match doc.extract_text(&[page_number]) {
                    Ok(text) => cleanup_pdf_text(&text),
                    Err(e) => {
                        tracing::debug!("Could not extract text for page {}: {}", page_number, e);
                        String::new()
                    }
                };
                PageText::new(page_number, text)
            })
            .collect()
    }

    /// Run pdf-extract on its own thread so a hang or panic on a bad font
    /// becomes a load error instead of taking the worker down
    fn extract_pdf_with_timeout(label: &str, data: &[u8]) -> Result<String> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(Error::load(label, format!("Failed to parse PDF: {}", e))),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::error!("PDF extraction timeout after 60s for {}", label);
                Err(Error::load(label, "PDF text extraction timed out"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed for {}", label);
                Err(Error::load(label, "PDF text extraction crashed"))
            }
        }
    }

    /// Plain text; form feeds separate pages
    fn parse_text(label: &str, data: &[u8]) -> Result<Vec<PageText>> {
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::load(label, format!("File is not valid UTF-8: {}", e)))?;
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

        Ok(text
            .split('\u{000C}')
            .enumerate()
            .map(|(i, page)| PageText::new(i as u32 + 1, page))
            .collect())
    }
}

impl DocumentParser for FileParser {
    fn parse(&self, path: &Path) -> Result<Vec<PageText>> {
        let label = path.display().to_string();

        let kind = DocumentKind::from_path(path).ok_or_else(|| {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            Error::load(&label, format!("Unsupported file type: '{}'", ext))
        })?;

        let data = std::fs::read(path).map_err(|e| Error::load(&label, e.to_string()))?;
        Self::parse_bytes(kind, &label, &data)
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("md"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_extension("docx"), None);
    }

    #[test]
    fn test_text_pages_split_on_form_feed() {
        let pages = FileParser::parse_bytes(DocumentKind::Text, "a.txt", b"first\x0Csecond").unwrap();
        assert_eq!(
            pages,
            vec![PageText::new(1, "first"), PageText::new(2, "second")]
        );
    }

    #[test]
    fn test_invalid_utf8_is_load_error() {
        let result = FileParser::parse_bytes(DocumentKind::Text, "a.txt", &[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    fn two_page_pdf(texts: [&str; 2]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 2,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_pages_are_numbered_from_one() {
        let data = two_page_pdf(["Hello first page", "Second page here"]);
        let pages = FileParser::parse_bytes(DocumentKind::Pdf, "two.pdf", &data).unwrap();

        assert_eq!(
            pages,
            vec![
                PageText::new(1, "Hello first page"),
                PageText::new(2, "Second page here"),
            ]
        );
    }

    #[test]
    fn test_reads_pdf_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(&two_page_pdf(["Alpha", "Beta"])).unwrap();

        let pages = FileParser::new().parse(file.path()).unwrap();
        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(pages[1].text, "Beta");
    }

    #[test]
    fn test_corrupt_pdf_is_load_error() {
        let result = FileParser::parse_bytes(DocumentKind::Pdf, "a.pdf", b"not a pdf at all");
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = FileParser::new().parse(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(Error::Load { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = tempfile::Builder::new().suffix(".xyz").tempfile().unwrap();
        file.write_all(b"data").unwrap();
        let result = FileParser::new().parse(file.path());
        assert!(matches!(result, Err(Error::Load { ref message, .. }) if message.contains("Unsupported")));
    }

    #[test]
    fn test_reads_text_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        file.write_all("\u{FEFF}# Title\nBody".as_bytes()).unwrap();
        let pages = FileParser::new().parse(file.path()).unwrap();
        assert_eq!(pages, vec![PageText::new(1, "# Title\nBody")]);
    }

    #[test]
    fn test_cleanup_pdf_text() {
        let cleaned = cleanup_pdf_text("  \u{FB01}rst\0 line  \n\n\u{201C}quoted\u{201D}\n");
        assert_eq!(cleaned, "first line\n\"quoted\"");
    }
}
