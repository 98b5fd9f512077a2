//! Synthesized audio and the temporary files that hold it.
//!
//! A materialized artifact belongs to this module until its deletion timer
//! fires. Timers are detached: nothing waits on them, they cannot be
//! cancelled, and deleting a file that is already gone counts as success.

use anyhow::Context;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info, warn};

use crate::backends::TextToSpeech;
use crate::error::{Result, WordWeaveError, backend_message};
use crate::languages;
use crate::translator::prepare_for_speech;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralArtifact {
    pub path: PathBuf,
    pub created_at: OffsetDateTime,
    pub delete_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    AlreadyAbsent,
    Failed,
}

#[derive(Clone)]
pub struct ArtifactManager {
    tts: Arc<dyn TextToSpeech>,
    dir: PathBuf,
    ttl: Duration,
}

impl ArtifactManager {
    pub fn new(tts: Arc<dyn TextToSpeech>, dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            tts,
            dir: dir.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Encoded audio for `text` read in `language`. Parenthesized asides are
    /// dropped first; nothing is persisted.
    pub async fn synthesize_speech(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let code = languages::code_for(language)
            .ok_or_else(|| WordWeaveError::UnsupportedSpeechLanguage(language.to_string()))?;
        let cleaned = prepare_for_speech(text);
        if cleaned.is_empty() {
            return Err(WordWeaveError::EmptyContent);
        }
        info!("speech: synthesizing {} chars as {}", cleaned.chars().count(), code);
        self.tts
            .synthesize(&cleaned, code)
            .await
            .map_err(|err| WordWeaveError::SpeechBackend(backend_message(&err)))
    }

    /// Write `audio` to a fresh file and schedule its deletion. Returns at
    /// once; the file is valid until the deadline.
    pub fn materialize_ephemeral(&self, audio: &[u8]) -> Result<EphemeralArtifact> {
        let path = write_audio_file(&self.dir, audio)
            .map_err(|err| WordWeaveError::ArtifactStorage(backend_message(&err)))?;
        let created_at = OffsetDateTime::now_utc();
        let delete_at = created_at + self.ttl;
        info!(
            "artifact: {} expires at {}",
            path.display(),
            delete_at.format(&Rfc3339).unwrap_or_default()
        );
        schedule_deletion(path.clone(), self.ttl);
        Ok(EphemeralArtifact {
            path,
            created_at,
            delete_at,
        })
    }
}

fn write_audio_file(dir: &Path, audio: &[u8]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create tmp dir: {}", dir.display()))?;
    let file = tempfile::Builder::new()
        .prefix("wordweave-tts-")
        .suffix(".wav")
        .tempfile_in(dir)?;
    fs::write(file.path(), audio).with_context(|| "failed to write audio file")?;
    file.into_temp_path()
        .keep()
        .with_context(|| "failed to persist audio file")
}

/// Delete `path` once `delay` has elapsed, on the current tokio runtime when
/// there is one and on a detached thread otherwise.
pub fn schedule_deletion(path: PathBuf, delay: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                delete_artifact(&path);
            });
        }
        Err(_) => {
            std::thread::spawn(move || {
                std::thread::sleep(delay);
                delete_artifact(&path);
            });
        }
    }
}

/// Remove an artifact. Never fails: a missing file is a no-op and any other
/// error is logged.
pub fn delete_artifact(path: &Path) -> DeletionOutcome {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("artifact: deleted {}", path.display());
            DeletionOutcome::Deleted
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("artifact: {} already removed", path.display());
            DeletionOutcome::AlreadyAbsent
        }
        Err(err) => {
            warn!("artifact: failed to delete {}: {}", path.display(), err);
            DeletionOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::StubSpeech;
    use tempfile::tempdir;

    fn manager(tts: Arc<StubSpeech>, dir: &Path, ttl: Duration) -> ArtifactManager {
        ArtifactManager::new(tts, dir, ttl)
    }

    #[tokio::test]
    async fn speech_is_synthesized_from_cleaned_text() {
        let dir = tempdir().expect("tempdir");
        let tts = Arc::new(StubSpeech::new(&[], b"RIFF"));
        let artifacts = manager(tts.clone(), dir.path(), Duration::from_secs(15));

        let audio = artifacts
            .synthesize_speech("Bonjour (informal)", "French")
            .await
            .expect("audio");
        assert_eq!(audio, b"RIFF");
        assert_eq!(
            tts.last_synthesis(),
            Some(("Bonjour".to_string(), "fr".to_string()))
        );
    }

    #[tokio::test]
    async fn speech_rejects_unknown_language_and_empty_text() {
        let dir = tempdir().expect("tempdir");
        let tts = Arc::new(StubSpeech::new(&[], b"RIFF"));
        let artifacts = manager(tts.clone(), dir.path(), Duration::from_secs(15));

        assert_eq!(
            artifacts.synthesize_speech("Hello", "Klingon").await,
            Err(WordWeaveError::UnsupportedSpeechLanguage("Klingon".into()))
        );
        assert_eq!(
            artifacts.synthesize_speech(" (aside only) ", "French").await,
            Err(WordWeaveError::EmptyContent)
        );
        assert_eq!(tts.calls(), 0);
    }

    #[tokio::test]
    async fn artifact_exists_until_its_deadline() {
        let dir = tempdir().expect("tempdir");
        let tts = Arc::new(StubSpeech::new(&[], b""));
        let ttl = Duration::from_millis(200);
        let artifacts = manager(tts, dir.path(), ttl);

        let artifact = artifacts.materialize_ephemeral(b"audio").expect("artifact");
        assert!(artifact.path.exists());
        assert_eq!(fs::read(&artifact.path).expect("read"), b"audio");
        assert_eq!(artifact.delete_at - artifact.created_at, ttl);
        assert!(artifact.path.starts_with(dir.path()));

        tokio::time::sleep(ttl + Duration::from_millis(500)).await;
        assert!(!artifact.path.exists());
        assert_eq!(delete_artifact(&artifact.path), DeletionOutcome::AlreadyAbsent);
    }

    #[tokio::test]
    async fn early_removal_by_someone_else_is_harmless() {
        let dir = tempdir().expect("tempdir");
        let tts = Arc::new(StubSpeech::new(&[], b""));
        let artifacts = manager(tts, dir.path(), Duration::from_millis(100));

        let artifact = artifacts.materialize_ephemeral(b"audio").expect("artifact");
        assert_eq!(delete_artifact(&artifact.path), DeletionOutcome::Deleted);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!artifact.path.exists());
    }

    #[test]
    fn deletion_is_scheduled_without_a_runtime() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("orphan.wav");
        fs::write(&path, b"audio").expect("write");

        schedule_deletion(path.clone(), Duration::from_millis(100));
        assert!(path.exists());
        std::thread::sleep(Duration::from_millis(600));
        assert!(!path.exists());
    }

    #[test]
    fn deleting_a_directory_fails_quietly() {
        let dir = tempdir().expect("tempdir");
        assert_eq!(delete_artifact(dir.path()), DeletionOutcome::Failed);
        assert!(dir.path().exists());
    }
}
