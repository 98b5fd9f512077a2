//! Turning OCR output, documents and transcripts into canonical text.
//!
//! Every path trims the final string and rejects it when nothing is left.

use crate::backends::{DocumentExtractor, OcrSegment};
use crate::error::{Result, WordWeaveError, backend_message};

/// Document kinds accepted by [`from_document_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Txt,
}

impl DocumentKind {
    /// Resolve an extension hint (with or without leading dot, any case).
    pub fn from_extension(extension: &str) -> Result<Self> {
        match normalize_extension(extension).as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" => Ok(DocumentKind::Txt),
            _ => Err(WordWeaveError::UnsupportedFileType(extension.to_string())),
        }
    }
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn canonical(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WordWeaveError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// Join recognized fragments with single spaces, in recognition order.
pub fn from_ocr_segments(segments: &[OcrSegment]) -> Result<String> {
    let joined = segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    canonical(&joined)
}

/// Join transcribed spans with single spaces, in temporal order.
pub fn from_transcript<S: AsRef<str>>(spans: &[S]) -> Result<String> {
    let joined = spans
        .iter()
        .map(|span| span.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    canonical(&joined)
}

/// Plain text documents are decoded as UTF-8; PDFs go through the extractor
/// and their pages are concatenated in order, unextractable pages adding
/// nothing.
pub async fn from_document_bytes(
    bytes: &[u8],
    kind: DocumentKind,
    extractor: &dyn DocumentExtractor,
) -> Result<String> {
    match kind {
        DocumentKind::Txt => {
            let text = std::str::from_utf8(bytes).map_err(|_| WordWeaveError::InvalidEncoding)?;
            canonical(text)
        }
        DocumentKind::Pdf => {
            let pages = extractor
                .pdf_pages(bytes)
                .await
                .map_err(|err| WordWeaveError::DocumentBackend(backend_message(&err)))?;
            let text = pages
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect::<String>();
            canonical(&text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::StubDocuments;

    #[test]
    fn ocr_segments_join_in_recognition_order() {
        let segments = [
            OcrSegment::from_text("Hello"),
            OcrSegment::from_text("world"),
        ];
        assert_eq!(from_ocr_segments(&segments).unwrap(), "Hello world");

        let repeated = [
            OcrSegment::from_text(" b "),
            OcrSegment::from_text("a"),
            OcrSegment::from_text("a"),
        ];
        assert_eq!(from_ocr_segments(&repeated).unwrap(), "b  a a");
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(from_ocr_segments(&[]), Err(WordWeaveError::EmptyContent));
        assert_eq!(
            from_ocr_segments(&[OcrSegment::from_text("  "), OcrSegment::from_text("\n")]),
            Err(WordWeaveError::EmptyContent)
        );
        assert_eq!(
            from_transcript::<&str>(&[]),
            Err(WordWeaveError::EmptyContent)
        );
    }

    #[test]
    fn transcript_spans_join_with_spaces() {
        assert_eq!(
            from_transcript(&[" Good morning.", "How are you? "]).unwrap(),
            "Good morning. How are you?"
        );
    }

    #[test]
    fn extension_hints_resolve_case_insensitively() {
        assert_eq!(DocumentKind::from_extension("PDF"), Ok(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension(".txt"), Ok(DocumentKind::Txt));
        assert_eq!(
            DocumentKind::from_extension("docx"),
            Err(WordWeaveError::UnsupportedFileType("docx".to_string()))
        );
    }

    #[tokio::test]
    async fn txt_documents_are_decoded_and_trimmed() {
        let extractor = StubDocuments::new(vec![]);
        let text = from_document_bytes(b"\n  Hola mundo \n", DocumentKind::Txt, &extractor)
            .await
            .unwrap();
        assert_eq!(text, "Hola mundo");
        assert_eq!(extractor.calls(), 0);

        let blank = from_document_bytes(b"   ", DocumentKind::Txt, &extractor).await;
        assert_eq!(blank, Err(WordWeaveError::EmptyContent));

        let binary = from_document_bytes(&[0xff, 0xfe, 0x00], DocumentKind::Txt, &extractor).await;
        assert_eq!(binary, Err(WordWeaveError::InvalidEncoding));
    }

    #[tokio::test]
    async fn pdf_pages_concatenate_with_blank_pages_contributing_nothing() {
        let extractor = StubDocuments::new(vec![
            Some("Page one. ".to_string()),
            None,
            Some("Page three.\n".to_string()),
        ]);
        let text = from_document_bytes(b"%PDF-1.4", DocumentKind::Pdf, &extractor)
            .await
            .unwrap();
        assert_eq!(text, "Page one. Page three.");
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn pdf_without_text_is_empty_content() {
        let extractor = StubDocuments::new(vec![None, None]);
        let text = from_document_bytes(b"%PDF-1.4", DocumentKind::Pdf, &extractor).await;
        assert_eq!(text, Err(WordWeaveError::EmptyContent));
    }
}
