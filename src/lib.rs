use anyhow::{Context, Result, anyhow};
use std::path::Path;

pub mod artifacts;
pub mod backends;
pub mod error;
pub mod history;
pub mod languages;
pub mod logging;
pub mod normalize;
pub mod server;
pub mod service;
pub mod settings;
mod test_util;
pub mod translations;
pub mod translator;
pub mod validate;

pub use artifacts::EphemeralArtifact;
pub use error::{ErrorKind, WordWeaveError};
pub use history::{FavouriteOutcome, HistoryEntry, SessionHistoryStore};
pub use service::{Upload, WordWeave};
pub use settings::Settings;

#[derive(Debug, Clone)]
pub struct Config {
    pub source_lang: String,
    pub lang: String,
    pub tone: String,
    pub data: Option<String>,
    pub explain: bool,
    pub speak: bool,
    pub transcribe: bool,
    pub settings_path: Option<String>,
    pub show_languages: bool,
    pub show_tones: bool,
}

/// Result of one CLI request: the text to print and, for `--speak`, the
/// audio file awaiting deletion.
#[derive(Debug)]
pub struct ExecutionOutput {
    pub text: String,
    pub artifact: Option<EphemeralArtifact>,
}

pub fn load_settings(config: &Config) -> Result<Settings> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    settings::load_settings(settings_path)
}

pub async fn run(config: Config, input: Option<String>) -> Result<ExecutionOutput> {
    if config.show_languages || config.show_tones {
        return Ok(ExecutionOutput {
            text: format_show_output(&config),
            artifact: None,
        });
    }
    let settings = load_settings(&config)?;
    let service = WordWeave::from_settings(&settings);
    execute(&service, &config, input).await
}

/// Runs one request against an existing service so interactive sessions
/// share history.
pub async fn execute(
    service: &WordWeave,
    config: &Config,
    input: Option<String>,
) -> Result<ExecutionOutput> {
    let translated = match config.data.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read data file: {}", path.display()))?;
            if config.transcribe {
                return Ok(ExecutionOutput {
                    text: service.transcribe(&bytes).await?,
                    artifact: None,
                });
            }
            translate_file(service, config, path, &bytes).await?
        }
        None => {
            if config.transcribe {
                return Err(anyhow!("--transcribe requires --data <audio file>"));
            }
            let input = input.unwrap_or_default();
            service
                .translate(input.trim(), &config.source_lang, &config.lang, &config.tone)
                .await?
        }
    };

    let mut text = translated.clone();
    if config.explain {
        let explanation = service
            .explain(&translated, &config.source_lang, &config.lang)
            .await?;
        text.push_str("\n\nExplanation:\n");
        text.push_str(&explanation);
    }

    let artifact = if config.speak {
        Some(service.speak(&translated, &config.lang).await?)
    } else {
        None
    };
    Ok(ExecutionOutput { text, artifact })
}

/// Audio is transcribed first; anything else is routed by extension.
async fn translate_file(
    service: &WordWeave,
    config: &Config,
    path: &Path,
    bytes: &[u8],
) -> Result<String> {
    if infer::is_audio(bytes) {
        let transcript = service.transcribe(bytes).await?;
        return Ok(service
            .translate(&transcript, &config.source_lang, &config.lang, &config.tone)
            .await?);
    }

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string());
    let upload = Upload {
        bytes,
        extension: &extension,
        file_name: file_name.as_deref(),
    };
    let translated = if service::is_image_extension(&extension) {
        service
            .translate_from_image(upload, &config.source_lang, &config.lang, &config.tone)
            .await?
    } else {
        service
            .translate_from_document(upload, &config.source_lang, &config.lang, &config.tone)
            .await?
    };
    Ok(translated)
}

pub fn format_show_output(config: &Config) -> String {
    let mut sections = Vec::new();

    if config.show_languages {
        let lines = languages::LANGUAGE_NAMES
            .iter()
            .map(|name| match languages::code_for(name) {
                Some(code) => format!("{}\t{}", name, code),
                None => name.to_string(),
            })
            .collect::<Vec<_>>();
        sections.push(lines.join("\n"));
    }

    if config.show_tones {
        sections.push(languages::TONE_NAMES.join("\n"));
    }

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            source_lang: "English".to_string(),
            lang: "French".to_string(),
            tone: "Neutral".to_string(),
            data: None,
            explain: false,
            speak: false,
            transcribe: false,
            settings_path: None,
            show_languages: false,
            show_tones: false,
        }
    }

    #[test]
    fn show_output_lists_languages_with_codes() {
        let output = format_show_output(&Config {
            show_languages: true,
            ..config()
        });
        let lines = output.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), languages::LANGUAGE_NAMES.len());
        assert_eq!(lines[0], "Albanian\tsq");
        assert!(lines.contains(&"Hebrew\tiw"));
    }

    #[test]
    fn show_output_joins_sections() {
        let output = format_show_output(&Config {
            show_languages: true,
            show_tones: true,
            ..config()
        });
        assert!(output.ends_with("Relaxed\nEnthusiastic"));
    }

    #[tokio::test]
    async fn run_prints_vocabulary_without_backends() {
        let output = run(
            Config {
                show_tones: true,
                ..config()
            },
            None,
        )
        .await
        .expect("run");
        assert_eq!(output.text.lines().next(), Some("Neutral"));
        assert!(output.artifact.is_none());
    }
}
