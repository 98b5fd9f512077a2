use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backends;

pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub ocr_languages: String,
    pub whisper_model: String,
    pub artifact_ttl_secs: u64,
    pub tmp_dir: Option<String>,
    pub server_addr: String,
    /// Upper bound for HTTP request bodies; uploads arrive base64-encoded.
    pub server_max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ollama_base_url: backends::ollama::DEFAULT_BASE_URL.to_string(),
            ollama_model: backends::ollama::DEFAULT_MODEL.to_string(),
            ocr_languages: backends::tesseract::DEFAULT_OCR_LANGUAGES.to_string(),
            whisper_model: backends::whisper::DEFAULT_WHISPER_MODEL.to_string(),
            artifact_ttl_secs: 15,
            tmp_dir: None,
            server_addr: "127.0.0.1:8000".to_string(),
            server_max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Settings {
    pub fn artifact_ttl(&self) -> Duration {
        Duration::from_secs(self.artifact_ttl_secs)
    }

    pub fn artifact_dir(&self) -> PathBuf {
        match self.tmp_dir.as_deref() {
            Some(dir) => PathBuf::from(dir),
            None => std::env::temp_dir().join("wordweave"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    ollama: Option<OllamaSettings>,
    ocr: Option<OcrSettings>,
    whisper: Option<WhisperSettings>,
    artifacts: Option<ArtifactSettings>,
    server: Option<ServerSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaSettings {
    base_url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSettings {
    languages: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WhisperSettings {
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtifactSettings {
    ttl_secs: Option<u64>,
    tmp_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
    max_body_bytes: Option<usize>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    settings.apply_env();
    Ok(settings)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(ollama) = incoming.ollama {
            if let Some(url) = non_empty(ollama.base_url) {
                self.ollama_base_url = url;
            }
            if let Some(model) = non_empty(ollama.model) {
                self.ollama_model = model;
            }
        }
        if let Some(languages) = incoming.ocr.and_then(|ocr| non_empty(ocr.languages)) {
            self.ocr_languages = languages;
        }
        if let Some(model) = incoming.whisper.and_then(|whisper| non_empty(whisper.model)) {
            self.whisper_model = model;
        }
        if let Some(artifacts) = incoming.artifacts {
            if let Some(ttl) = artifacts.ttl_secs {
                self.artifact_ttl_secs = ttl;
            }
            if let Some(dir) = non_empty(artifacts.tmp_dir) {
                self.tmp_dir = Some(dir);
            }
        }
        if let Some(server) = incoming.server {
            if let Some(addr) = non_empty(server.addr) {
                self.server_addr = addr;
            }
            if let Some(limit) = server.max_body_bytes {
                self.server_max_body_bytes = limit;
            }
        }
    }

    fn apply_env(&mut self) {
        if let Some(host) = get_env("OLLAMA_HOST") {
            self.ollama_base_url = if host.starts_with("http://") || host.starts_with("https://")
            {
                host
            } else {
                format!("http://{}", host)
            };
        }
        if let Some(model) = get_env("WORDWEAVE_WHISPER_MODEL") {
            self.whisper_model = model;
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

pub(crate) fn home_dir() -> Option<PathBuf> {
    get_env("HOME").map(|home| Path::new(home.trim()).join(".wordweave"))
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn embedded_defaults_match_code_defaults() {
        let parsed: SettingsFile = toml::from_str(DEFAULT_SETTINGS_TOML).expect("parse defaults");
        let mut settings = Settings::default();
        settings.merge(parsed);
        let defaults = Settings::default();
        assert_eq!(settings.ollama_base_url, defaults.ollama_base_url);
        assert_eq!(settings.ollama_model, defaults.ollama_model);
        assert_eq!(settings.ocr_languages, defaults.ocr_languages);
        assert_eq!(settings.whisper_model, defaults.whisper_model);
        assert_eq!(settings.artifact_ttl(), Duration::from_secs(15));
        assert_eq!(settings.server_addr, defaults.server_addr);
        assert_eq!(settings.server_max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn extra_file_overrides_home_settings() {
        with_temp_home(|home| {
            let extra = home.join("extra.toml");
            let content = concat!(
                "[artifacts]\nttl_secs = 2\ntmp_dir = \"/tmp/ww-test\"\n",
                "[ollama]\nmodel = \"gemma3\"\nbase_url = \"  \"\n",
                "[server]\nmax_body_bytes = 1048576\n",
            );
            fs::write(&extra, content).expect("write extra");

            let settings = load_settings(Some(&extra)).expect("load settings");
            assert!(home.join(".wordweave").join("settings.toml").exists());
            assert_eq!(settings.artifact_ttl_secs, 2);
            assert_eq!(settings.artifact_dir(), PathBuf::from("/tmp/ww-test"));
            assert_eq!(settings.ollama_model, "gemma3");
            assert_eq!(settings.server_max_body_bytes, 1_048_576);
            assert!(!settings.ollama_base_url.trim().is_empty());
        });
    }

    #[test]
    fn missing_extra_file_is_an_error() {
        with_temp_home(|home| {
            let err = load_settings(Some(&home.join("nope.toml"))).expect_err("missing file");
            assert!(err.to_string().contains("settings file not found"));
        });
    }
}
