use anyhow::{Context, Result, anyhow};
use futures_util::{Stream, StreamExt};
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::process::{ensure_command, run_command};
use super::{BackendFuture, SpeechToText};

pub(crate) const DEFAULT_WHISPER_MODEL: &str = "small";
const WHISPER_MODEL_BASE_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";
const ALLOWED_MODELS: [&str; 11] = [
    "tiny",
    "base",
    "small",
    "medium",
    "large",
    "large-v2",
    "large-v3",
    "tiny.en",
    "base.en",
    "small.en",
    "medium.en",
];

/// Local speech recognition with whisper.cpp.
///
/// `model` is either a path to a ggml model file or one of the published
/// model names, which are downloaded into the cache on first use. The loaded
/// model is kept for the lifetime of the adapter.
#[derive(Clone)]
pub struct Whisper {
    model: String,
    context: Arc<Mutex<Option<Arc<WhisperContext>>>>,
}

impl Whisper {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        let model = if model.trim().is_empty() {
            DEFAULT_WHISPER_MODEL.to_string()
        } else {
            model.trim().to_string()
        };
        Self {
            model,
            context: Arc::new(Mutex::new(None)),
        }
    }
}

impl SpeechToText for Whisper {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> BackendFuture<'a, Vec<String>> {
        Box::pin(async move {
            let model_path = whisper_model_path(&self.model).await?;
            let bytes = audio.to_vec();
            let slot = Arc::clone(&self.context);
            tokio::task::spawn_blocking(move || {
                let ctx = cached(&slot, || load_context(&model_path))?;
                transcribe_blocking(&bytes, &ctx)
            })
                .await
                .with_context(|| "transcription task failed")?
        })
    }
}

/// Returns the value held in `slot`, loading it on first use. A failed load
/// leaves the slot empty.
fn cached<T>(slot: &Mutex<Option<Arc<T>>>, load: impl FnOnce() -> Result<T>) -> Result<Arc<T>> {
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(value) = guard.as_ref() {
        return Ok(Arc::clone(value));
    }
    let value = Arc::new(load()?);
    *guard = Some(Arc::clone(&value));
    Ok(value)
}

fn load_context(model_path: &Path) -> Result<WhisperContext> {
    info!("whisper: loading model {}", model_path.display());
    let model = model_path.to_string_lossy();
    WhisperContext::new_with_params(model.as_ref(), WhisperContextParameters::default())
        .with_context(|| format!("failed to load whisper model: {}", model_path.display()))
}

fn transcribe_blocking(audio_bytes: &[u8], ctx: &WhisperContext) -> Result<Vec<String>> {
    ensure_command("ffmpeg", "audio transcription requires ffmpeg")?;
    let dir = tempdir().with_context(|| "failed to create temp dir for audio")?;
    let input_ext = infer::get(audio_bytes)
        .map(|kind| kind.extension())
        .unwrap_or("bin");
    let input_path = dir.path().join(format!("input.{}", input_ext));
    fs::write(&input_path, audio_bytes).with_context(|| "failed to write audio input")?;

    let wav_path = dir.path().join("input.wav");
    info!("audio: decoding with ffmpeg");
    run_command(
        "ffmpeg",
        [
            OsStr::new("-y"),
            OsStr::new("-i"),
            input_path.as_os_str(),
            OsStr::new("-ar"),
            OsStr::new("16000"),
            OsStr::new("-ac"),
            OsStr::new("1"),
            wav_path.as_os_str(),
        ],
    )
    .with_context(|| "failed to decode audio with ffmpeg")?;

    let audio = read_wav_mono_f32(&wav_path)?;
    let mut state = ctx
        .create_state()
        .with_context(|| "failed to init whisper state")?;
    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(false);
    params.set_language(Some("auto"));
    params.set_print_progress(false);

    state
        .full(params, &audio[..])
        .with_context(|| "whisper transcription failed")?;

    let num_segments = state
        .full_n_segments()
        .with_context(|| "failed to read segments")?;
    let mut spans = Vec::new();
    for idx in 0..num_segments {
        let text = state
            .full_get_segment_text(idx)
            .with_context(|| "failed to read segment text")?;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            spans.push(trimmed.to_string());
        }
    }
    info!("audio: transcribed {} span(s)", spans.len());
    Ok(spans)
}

async fn whisper_model_path(model: &str) -> Result<PathBuf> {
    let path = PathBuf::from(model);
    if path.exists() {
        return Ok(path);
    }
    let normalized = normalize_model_name(model)
        .ok_or_else(|| anyhow!("unknown whisper model '{}'", model))?;
    let dest = default_model_path(&normalized);
    if dest.exists() {
        return Ok(dest);
    }

    let url = format!("{}/ggml-{}.bin", WHISPER_MODEL_BASE_URL, normalized);
    info!("whisper model not found; downloading {} ...", normalized);
    download_whisper_model(&url, &dest).await?;
    Ok(dest)
}

fn default_model_path(model: &str) -> PathBuf {
    let file = format!("ggml-{}.bin", model);
    crate::settings::home_dir()
        .unwrap_or_else(|| PathBuf::from(".wordweave"))
        .join(".cache")
        .join("whisper")
        .join(file)
}

pub(crate) fn normalize_model_name(input: &str) -> Option<String> {
    let raw = input.trim().to_lowercase();
    let trimmed = raw.strip_prefix("ggml-").unwrap_or(raw.as_str());
    let trimmed = trimmed.strip_suffix(".bin").unwrap_or(trimmed);
    if ALLOWED_MODELS.contains(&trimmed) {
        return Some(trimmed.to_string());
    }
    None
}

async fn download_whisper_model(url: &str, dest: &Path) -> Result<()> {
    let dir = dest.parent().ok_or_else(|| anyhow!("invalid model path"))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create model dir: {}", dir.display()))?;

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to download whisper model: {}", url))?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "failed to download whisper model: {} (status {})",
            url,
            response.status()
        ));
    }

    write_streamed(response.bytes_stream(), dest).await
}

/// Stream `chunks` into a private temp file next to `dest`, then move it into
/// place. Concurrent writers never share a partial file; the last complete
/// download wins.
async fn write_streamed<S, B, E>(chunks: S, dest: &Path) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let dir = dest.parent().ok_or_else(|| anyhow!("invalid model path"))?;
    let mut file = tempfile::Builder::new()
        .prefix(".ggml-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("failed to create temp model in {}", dir.display()))?;
    let mut chunks = std::pin::pin!(chunks);
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.with_context(|| "failed to read model bytes")?;
        file.write_all(chunk.as_ref())
            .with_context(|| "failed to write model bytes")?;
    }
    file.persist(dest)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to finalize model: {}", dest.display()))?;
    Ok(())
}

fn read_wav_mono_f32(path: &Path) -> Result<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open wav: {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(anyhow!("wav has no channels"));
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().map(|s| s.unwrap_or(0.0)).collect(),
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max = (1i64 << (bits - 1)) as f32;
            if bits <= 16 {
                reader
                    .samples::<i16>()
                    .map(|s| s.unwrap_or(0) as f32 / max)
                    .collect()
            } else {
                reader
                    .samples::<i32>()
                    .map(|s| s.unwrap_or(0) as f32 / max)
                    .collect()
            }
        }
    };

    if channels == 1 {
        return Ok(samples);
    }
    Ok(samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_are_normalized() {
        assert_eq!(normalize_model_name("ggml-small.bin").as_deref(), Some("small"));
        assert_eq!(normalize_model_name(" Base.EN ").as_deref(), Some("base.en"));
        assert_eq!(normalize_model_name("huge"), None);
        assert_eq!(Whisper::new("").model, DEFAULT_WHISPER_MODEL);
    }

    #[test]
    fn loaded_model_is_reused() {
        let slot = Mutex::new(None);
        let mut loads = 0;
        let first = cached(&slot, || {
            loads += 1;
            Ok("model".to_string())
        })
        .expect("first load");
        let second = cached(&slot, || {
            loads += 1;
            Ok("other".to_string())
        })
        .expect("cached");
        assert_eq!(loads, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failed_load_is_retried() {
        let slot: Mutex<Option<Arc<String>>> = Mutex::new(None);
        assert!(cached(&slot, || Err(anyhow!("missing model"))).is_err());
        let value = cached(&slot, || Ok("model".to_string())).expect("second load");
        assert_eq!(value.as_str(), "model");
    }

    #[tokio::test]
    async fn concurrent_downloads_leave_one_complete_model() {
        let dir = tempdir().expect("tempdir");
        let dest = dir.path().join("ggml-tiny.bin");
        let chunks = |byte: u8| {
            futures_util::stream::iter(
                (0..64).map(move |_| Ok::<_, std::io::Error>(vec![byte; 1024])),
            )
        };

        let (a, b) = tokio::join!(
            write_streamed(chunks(b'a'), &dest),
            write_streamed(chunks(b'b'), &dest)
        );
        a.expect("first download");
        b.expect("second download");

        let model = fs::read(&dest).expect("model");
        assert_eq!(model.len(), 64 * 1024);
        assert!(model.iter().all(|byte| *byte == model[0]));
        let leftovers = fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn stereo_wav_is_downmixed() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("writer");
        for sample in [16384i16, 0, -16384, -16384] {
            writer.write_sample(sample).expect("sample");
        }
        writer.finalize().expect("finalize");

        let mono = read_wav_mono_f32(&path).expect("read wav");
        assert_eq!(mono, vec![0.25, -0.5]);
    }
}
