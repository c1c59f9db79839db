//! Document loading and text extraction.
//!
//! Extraction is dispatched on the file extension. Unknown extensions are
//! read as plain text, unless the content looks binary.

use docrag_core::{AppError, AppResult};
use docx_rs::{
    DocumentChild, InsertChild, ParagraphChild, Run, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
    Markdown,
    Word,
    /// Unknown extension, read as UTF-8 text
    PlainFallback,
}

impl DocumentFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("txt") => Self::Text,
            Some("md") | Some("markdown") => Self::Markdown,
            Some("doc") | Some("docx") => Self::Word,
            _ => Self::PlainFallback,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Word => "word",
            Self::PlainFallback => "plain",
        }
    }

    /// Whether directory discovery should pick up files of this format.
    pub fn is_discoverable(&self) -> bool {
        !matches!(self, Self::PlainFallback)
    }
}

/// A loaded document.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub text: String,
}

/// Load a document and extract its text.
///
/// Fails with [`AppError::Load`] if the file is missing, unreadable or
/// cannot be parsed as its declared format.
pub fn load_document(path: &Path) -> AppResult<Document> {
    let format = DocumentFormat::from_path(path);

    let bytes = fs::read(path).map_err(|e| AppError::load(path, e.to_string()))?;

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(path, &bytes)?,
        DocumentFormat::Word => extract_docx(path, &bytes)?,
        DocumentFormat::Markdown => markdown_to_text(&decode_utf8(path, bytes)?),
        DocumentFormat::Text => decode_utf8(path, bytes)?,
        DocumentFormat::PlainFallback => {
            let text = decode_utf8(path, bytes)?;
            if text.contains('\0') {
                return Err(AppError::load(path, "binary content is not supported"));
            }
            text
        }
    };

    tracing::debug!(
        "Loaded {:?} as {} ({} chars)",
        path,
        format.as_str(),
        text.chars().count()
    );

    Ok(Document {
        path: path.to_path_buf(),
        format,
        text,
    })
}

/// Find every file under `dir` with a supported document extension.
///
/// Results are sorted so ingestion order is deterministic.
pub fn discover_documents(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::load(dir, "not a directory"));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| DocumentFormat::from_path(path).is_discoverable())
        .collect();

    paths.sort();

    tracing::debug!("Discovered {} documents in {:?}", paths.len(), dir);
    Ok(paths)
}

fn decode_utf8(path: &Path, bytes: Vec<u8>) -> AppResult<String> {
    String::from_utf8(bytes).map_err(|e| AppError::load(path, format!("invalid UTF-8: {}", e)))
}

fn extract_pdf(path: &Path, bytes: &[u8]) -> AppResult<String> {
    // pdf-extract panics on some malformed inputs instead of returning an error
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(AppError::load(path, format!("PDF extraction failed: {}", e))),
        Err(_) => Err(AppError::load(path, "PDF extraction aborted")),
    }
}

fn extract_docx(path: &Path, bytes: &[u8]) -> AppResult<String> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| AppError::load(path, format!("Word extraction failed: {}", e)))?;

    let mut text = String::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => {
                push_inline(&mut text, &paragraph.children);
                text.push('\n');
            }
            DocumentChild::Table(table) => push_table(&mut text, table),
            _ => {}
        }
    }

    Ok(text)
}

/// Append the text of paragraph content, descending into hyperlinks and
/// tracked insertions.
fn push_inline(out: &mut String, children: &[ParagraphChild]) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(out, run),
            ParagraphChild::Hyperlink(link) => push_inline(out, &link.children),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run(out, run);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(out: &mut String, run: &Run) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) | RunChild::PTab(_) => out.push('\t'),
            RunChild::Break(_) | RunChild::CarriageReturn(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// One line per row, cells separated by tabs.
fn push_table(out: &mut String, table: &Table) {
    for TableChild::TableRow(row) in &table.rows {
        for (i, TableRowChild::TableCell(cell)) in row.cells.iter().enumerate() {
            if i > 0 {
                out.push('\t');
            }
            for (j, content) in cell.children.iter().enumerate() {
                if j > 0 {
                    out.push(' ');
                }
                match content {
                    TableCellContent::Paragraph(paragraph) => {
                        push_inline(out, &paragraph.children)
                    }
                    TableCellContent::Table(nested) => push_table(out, nested),
                    _ => {}
                }
            }
        }
        out.push('\n');
    }
}

/// Render markdown to plain text, separating blocks with blank lines.
fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Item) => {
                end_with_newlines(&mut out, 1);
                out.push_str("- ");
            }
            Event::End(TagEnd::Item) => end_with_newlines(&mut out, 1),
            Event::End(
                TagEnd::Heading(_)
                | TagEnd::Paragraph
                | TagEnd::CodeBlock
                | TagEnd::List(_)
                | TagEnd::BlockQuote(_),
            ) => end_with_newlines(&mut out, 2),
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            _ => {}
        }
    }

    out.trim().to_string()
}

fn end_with_newlines(out: &mut String, count: usize) {
    if out.is_empty() {
        return;
    }
    let present = out.chars().rev().take_while(|&c| c == '\n').count();
    for _ in present..count {
        out.push('\n');
    }
}
