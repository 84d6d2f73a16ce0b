//! Paragraph extraction from documents.
//!
//! Supported formats: plain text and markdown (one paragraph per line),
//! PDF (one paragraph per extracted line), Word `.docx` (`<w:p>` elements of
//! `word/document.xml`) and OpenDocument `.odt` (`<text:p>` and `<text:h>`
//! elements of `content.xml`). Blank paragraphs are dropped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use roxmltree::{Document, Node};
use zip::ZipArchive;

use crate::error::{CodeislowError, Result};
use crate::matching::normalize_paragraphs;

/// Turns one family of document files into ordered paragraphs.
pub trait TextExtractor {
    /// Lower-case extensions this extractor handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Paragraphs of the document, in reading order, blank ones included.
    fn extract(&self, path: &Path) -> Result<Vec<String>>;
}

/// `.txt` and `.md` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["txt", "md"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path)?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// `.pdf` files, through `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let content = pdf_extract::extract_text(path).map_err(|e| CodeislowError::Extraction {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// `.docx` files: paragraphs of `word/document.xml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["docx"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let xml = read_archive_entry(path, "word/document.xml")?;
        let doc = Document::parse(&xml)?;
        Ok(collect_paragraphs(&doc, &["p"], docx_inline_text))
    }
}

/// `.odt` files: paragraphs and headings of `content.xml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdtExtractor;

impl TextExtractor for OdtExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["odt"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let xml = read_archive_entry(path, "content.xml")?;
        let doc = Document::parse(&xml)?;
        Ok(collect_paragraphs(&doc, &["p", "h"], odt_inline_text))
    }
}

fn read_archive_entry(path: &Path, entry: &str) -> Result<String> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut file = archive.by_name(entry).map_err(|e| CodeislowError::Extraction {
        path: path.to_path_buf(),
        message: format!("{entry}: {e}"),
    })?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Outermost elements named in `tags`, flattened to text by `inline`.
fn collect_paragraphs(
    doc: &Document<'_>,
    tags: &[&str],
    inline: fn(Node<'_, '_>, &mut String),
) -> Vec<String> {
    let is_paragraph = |node: &Node<'_, '_>| node.is_element() && tags.contains(&node.tag_name().name());

    doc.descendants()
        .filter(is_paragraph)
        .filter(|node| !node.ancestors().skip(1).any(|a| is_paragraph(&a)))
        .map(|node| {
            let mut text = String::new();
            inline(node, &mut text);
            text
        })
        .collect()
}

fn docx_inline_text(node: Node<'_, '_>, out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            // Text outside <w:t> is formatting whitespace.
            continue;
        }
        match child.tag_name().name() {
            "t" => out.push_str(child.text().unwrap_or_default()),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push(' '),
            _ => docx_inline_text(child, out),
        }
    }
}

fn odt_inline_text(node: Node<'_, '_>, out: &mut String) {
    for child in node.children() {
        if let Some(text) = child.text().filter(|_| child.is_text()) {
            out.push_str(text);
            continue;
        }
        match child.tag_name().name() {
            "s" => {
                let count = child
                    .attributes()
                    .find(|a| a.name() == "c")
                    .and_then(|a| a.value().parse::<usize>().ok())
                    .unwrap_or(1);
                out.push_str(&" ".repeat(count));
            }
            "tab" => out.push('\t'),
            "line-break" => out.push(' '),
            // Footnote bodies are not part of the running text.
            "note" | "annotation" => {}
            _ => odt_inline_text(child, out),
        }
    }
}

/// Dispatches a document to the extractor registered for its extension.
pub struct DocumentParser {
    extractors: Vec<Box<dyn TextExtractor + Send + Sync>>,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentParser")
            .field("extensions", &self.extensions())
            .finish()
    }
}

impl DocumentParser {
    /// Parser with every built-in extractor.
    #[must_use]
    pub fn new() -> Self {
        let mut parser = Self::empty();
        parser.register(PlainTextExtractor);
        parser.register(PdfExtractor);
        parser.register(DocxExtractor);
        parser.register(OdtExtractor);
        parser
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Register an extractor. Later registrations win on shared extensions.
    pub fn register(&mut self, extractor: impl TextExtractor + Send + Sync + 'static) {
        self.extractors.insert(0, Box::new(extractor));
    }

    /// Every handled extension.
    #[must_use]
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut all: Vec<&'static str> = self
            .extractors
            .iter()
            .flat_map(|e| e.extensions().iter().copied())
            .collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// Non-blank paragraphs of a document, in reading order.
    ///
    /// The extension is checked before the file system, so an unsupported
    /// type is reported even for a missing file.
    pub fn parse(&self, path: &Path) -> Result<Vec<String>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let extractor = self
            .extractors
            .iter()
            .find(|e| e.extensions().contains(&extension.as_str()))
            .ok_or_else(|| CodeislowError::UnsupportedExtension(extension.clone()))?;

        if !path.is_file() {
            return Err(CodeislowError::DocumentNotFound(path.to_path_buf()));
        }

        let paragraphs: Vec<String> = extractor
            .extract(path)?
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();

        tracing::info!(
            path = %path.display(),
            paragraphs = paragraphs.len(),
            "Extracted document"
        );
        Ok(paragraphs)
    }

    /// Extract and normalize a document into one scannable text.
    pub fn full_text(&self, path: &Path) -> Result<String> {
        Ok(normalize_paragraphs(&self.parse(path)?))
    }
}

/// Extract the paragraphs of a document with the built-in extractors.
pub fn extract_paragraphs(path: &Path) -> Result<Vec<String>> {
    DocumentParser::new().parse(path)
}
