use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fs;
use tempfile::tempdir;

use super::process::{ensure_command, run_command};
use super::{BackendFuture, DocumentExtractor};

const PAGE_BREAK: char = '\u{c}';

/// PDF text extraction through poppler's `pdftotext`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pdftotext;

impl DocumentExtractor for Pdftotext {
    fn pdf_pages<'a>(&'a self, pdf: &'a [u8]) -> BackendFuture<'a, Vec<Option<String>>> {
        let bytes = pdf.to_vec();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || extract_pages(&bytes))
                .await
                .with_context(|| "pdf extraction task failed")?
        })
    }
}

fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<Option<String>>> {
    ensure_command(
        "pdftotext",
        "pdf extraction requires pdftotext (install poppler)",
    )?;
    let dir = tempdir().with_context(|| "failed to create temp dir for pdf")?;
    let input_path = dir.path().join("input.pdf");
    fs::write(&input_path, pdf_bytes).with_context(|| "failed to write temp pdf")?;

    let stdout = run_command(
        "pdftotext",
        [
            OsStr::new("-enc"),
            OsStr::new("UTF-8"),
            input_path.as_os_str(),
            OsStr::new("-"),
        ],
    )?;
    Ok(split_pages(&String::from_utf8_lossy(&stdout)))
}

/// `pdftotext` terminates every page with a form feed.
pub(crate) fn split_pages(output: &str) -> Vec<Option<String>> {
    let mut pages = output
        .split(PAGE_BREAK)
        .map(|page| {
            if page.trim().is_empty() {
                None
            } else {
                Some(page.to_string())
            }
        })
        .collect::<Vec<_>>();
    if output.ends_with(PAGE_BREAK) {
        pages.pop();
    }
    pages
}
