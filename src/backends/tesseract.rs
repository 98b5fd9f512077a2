use anyhow::{Context, Result, anyhow};
use std::ffi::OsStr;
use std::io::Write;
use tracing::debug;

use super::process::{ensure_command, run_command};
use super::{BBoxPx, BackendFuture, OcrEngine, OcrSegment};

pub(crate) const DEFAULT_OCR_LANGUAGES: &str = "eng+hin";

/// OCR through the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct Tesseract {
    languages: String,
}

impl Tesseract {
    pub fn new(languages: impl Into<String>) -> Self {
        let languages = languages.into();
        let languages = if languages.trim().is_empty() {
            DEFAULT_OCR_LANGUAGES.to_string()
        } else {
            languages.trim().to_string()
        };
        Self { languages }
    }
}

impl OcrEngine for Tesseract {
    fn recognize<'a>(&'a self, image: &'a [u8]) -> BackendFuture<'a, Vec<OcrSegment>> {
        let bytes = image.to_vec();
        let languages = self.languages.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || recognize_blocking(&bytes, &languages))
                .await
                .with_context(|| "ocr task failed")?
        })
    }
}

fn recognize_blocking(image_bytes: &[u8], languages: &str) -> Result<Vec<OcrSegment>> {
    ensure_command("tesseract", "image translation requires tesseract")?;
    let image =
        image::load_from_memory(image_bytes).with_context(|| "failed to decode image for OCR")?;

    let mut tmp = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .with_context(|| "failed to create temp file for OCR")?;
    image
        .write_to(&mut tmp, image::ImageFormat::Png)
        .with_context(|| "failed to write temp image for OCR")?;
    tmp.flush().ok();

    let stdout = run_command(
        "tesseract",
        [
            tmp.path().as_os_str(),
            OsStr::new("stdout"),
            OsStr::new("-l"),
            OsStr::new(languages),
            OsStr::new("tsv"),
        ],
    )?;
    let tsv = String::from_utf8_lossy(&stdout);
    let segments = parse_tsv_segments(&tsv)?;
    debug!("ocr: {} segment(s) recognized", segments.len());
    Ok(segments)
}

struct LineAccumulator {
    key: (i32, i32, i32, i32),
    words: Vec<String>,
    conf_sum: f32,
    bbox: BBoxPx,
}

impl LineAccumulator {
    fn finish(self) -> OcrSegment {
        let count = self.words.len().max(1) as f32;
        OcrSegment {
            text: self.words.join(" "),
            conf: self.conf_sum / count,
            bbox: self.bbox,
        }
    }
}

/// Group word rows of tesseract TSV output into lines, keeping the order in
/// which tesseract reported them.
pub(crate) fn parse_tsv_segments(tsv: &str) -> Result<Vec<OcrSegment>> {
    let mut lines = tsv.lines();
    let header = lines.next().ok_or_else(|| anyhow!("empty tesseract output"))?;
    if !header.starts_with("level") {
        return Err(anyhow!("unexpected tesseract tsv header: {}", header));
    }

    let mut segments = Vec::new();
    let mut current: Option<LineAccumulator> = None;
    for row in lines {
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: i32 = cols[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }
        let key = (
            cols[1].parse().unwrap_or(0),
            cols[2].parse().unwrap_or(0),
            cols[3].parse().unwrap_or(0),
            cols[4].parse().unwrap_or(0),
        );
        let bbox = BBoxPx {
            x: cols[6].parse().unwrap_or(0),
            y: cols[7].parse().unwrap_or(0),
            w: cols[8].parse().unwrap_or(0),
            h: cols[9].parse().unwrap_or(0),
        };

        match current.as_mut() {
            Some(line) if line.key == key => {
                line.words.push(text.to_string());
                line.conf_sum += conf;
                line.bbox = union_bbox(&line.bbox, &bbox);
            }
            _ => {
                if let Some(done) = current.take() {
                    segments.push(done.finish());
                }
                current = Some(LineAccumulator {
                    key,
                    words: vec![text.to_string()],
                    conf_sum: conf,
                    bbox,
                });
            }
        }
    }
    if let Some(done) = current {
        segments.push(done.finish());
    }
    Ok(segments)
}

fn union_bbox(a: &BBoxPx, b: &BBoxPx) -> BBoxPx {
    let x0 = a.x.min(b.x);
    let y0 = a.y.min(b.y);
    let x1 = (a.x + a.w).max(b.x + b.w);
    let y1 = (a.y + a.h).max(b.y + b.h);
    BBoxPx {
        x: x0,
        y: y0,
        w: x1 - x0,
        h: y1 - y0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = concat!(
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\t",
        "left\ttop\twidth\theight\tconf\ttext"
    );

    #[test]
    fn words_are_grouped_per_line_in_order() {
        let tsv = [
            HEADER,
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t10\t50\t20\t96.5\tHello",
            "5\t1\t1\t1\t1\t2\t70\t12\t60\t20\t93.5\tworld",
            "5\t1\t2\t1\t1\t1\t10\t80\t40\t20\t90\tSecond",
            "5\t1\t2\t1\t1\t2\t55\t80\t10\t20\t-1\t ",
        ]
        .join("\n");
        let segments = parse_tsv_segments(&tsv).expect("parse");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[0].conf, 95.0);
        assert_eq!(
            segments[0].bbox,
            BBoxPx {
                x: 10,
                y: 10,
                w: 120,
                h: 22
            }
        );
        assert_eq!(segments[1].text, "Second");
    }

    #[test]
    fn header_only_output_has_no_segments() {
        assert!(parse_tsv_segments(HEADER).expect("parse").is_empty());
        assert!(parse_tsv_segments("").is_err());
    }

    #[test]
    fn blank_languages_fall_back_to_default() {
        assert_eq!(Tesseract::new(" ").languages, DEFAULT_OCR_LANGUAGES);
        assert_eq!(Tesseract::new("eng").languages, "eng");
    }
}
