use anyhow::{Context, Result, anyhow};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use super::process::{command_exists, run_command};
use super::{BackendFuture, TextToSpeech};
use crate::languages::map_code_for_espeak;

/// Speech synthesis with `espeak-ng` (or classic `espeak`), producing WAV.
#[derive(Debug, Clone, Copy, Default)]
pub struct Espeak;

impl TextToSpeech for Espeak {
    fn synthesize<'a>(&'a self, text: &'a str, code: &'a str) -> BackendFuture<'a, Vec<u8>> {
        let text = text.replace('\n', " ");
        let voice = map_code_for_espeak(code).to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || synthesize_blocking(&text, &voice))
                .await
                .with_context(|| "speech synthesis task failed")?
        })
    }
}

fn synthesize_blocking(text: &str, voice: &str) -> Result<Vec<u8>> {
    let engine = ["espeak-ng", "espeak"]
        .into_iter()
        .find(|cmd| command_exists(cmd))
        .ok_or_else(|| anyhow!("no TTS engine found (install espeak-ng or espeak)"))?;

    let dir = tempdir().with_context(|| "failed to create temp dir for speech")?;
    let text_path = dir.path().join("speech.txt");
    let out_wav = dir.path().join("speech.wav");
    fs::write(&text_path, text).with_context(|| "failed to write speech text")?;
    run_command(engine, espeak_args(voice, &out_wav, &text_path))?;
    fs::read(&out_wav).with_context(|| "failed to read synthesized audio")
}

/// The text itself never appears on the command line; espeak reads it from
/// `text_path`.
fn espeak_args(voice: &str, out_wav: &Path, text_path: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-v"),
        OsString::from(voice),
        OsString::from("-w"),
        out_wav.as_os_str().to_os_string(),
        OsString::from("-f"),
        text_path.as_os_str().to_os_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_like_text_stays_off_the_command_line() {
        let args = espeak_args("en", Path::new("/tmp/out.wav"), Path::new("/tmp/speech.txt"));
        assert_eq!(
            args,
            ["-v", "en", "-w", "/tmp/out.wav", "-f", "/tmp/speech.txt"]
                .map(OsString::from)
                .to_vec()
        );
        assert!(!args.iter().any(|arg| arg == "-f/etc/passwd"));
    }
}
