//! Recent translations and saved favourites for the running process.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, WordWeaveError};

pub const HISTORY_CAPACITY: usize = 3;

const NO_HISTORY: &str = "No history yet.";
const NO_FAVOURITES: &str = "No favourites saved.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input_text: String,
    pub source_language: String,
    pub target_language: String,
    pub tone: String,
    pub translated_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FavouriteOutcome {
    Saved,
    AlreadyFavourited,
}

impl FavouriteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            FavouriteOutcome::Saved => "Saved to favourites.",
            FavouriteOutcome::AlreadyFavourited => "Already in favourites.",
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    history: VecDeque<HistoryEntry>,
    favourites: Vec<HistoryEntry>,
}

/// Bounded newest-first history plus a deduplicated favourites list.
///
/// All mutation happens under one write lock, so eviction and favourite
/// deduplication are atomic with respect to each other and to readers.
#[derive(Debug, Default)]
pub struct SessionHistoryStore {
    state: RwLock<SessionState>,
}

impl SessionHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, entry: HistoryEntry) {
        let mut state = self.write();
        state.history.push_front(entry);
        state.history.truncate(HISTORY_CAPACITY);
    }

    pub fn latest(&self) -> Option<HistoryEntry> {
        self.read().history.front().cloned()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.read().history.iter().cloned().collect()
    }

    pub fn favourite_entries(&self) -> Vec<HistoryEntry> {
        self.read().favourites.clone()
    }

    pub fn add_favourite(&self) -> Result<FavouriteOutcome> {
        let mut state = self.write();
        let latest = state
            .history
            .front()
            .cloned()
            .ok_or(WordWeaveError::NoHistory)?;
        if state.favourites.contains(&latest) {
            return Ok(FavouriteOutcome::AlreadyFavourited);
        }
        state.favourites.push(latest);
        Ok(FavouriteOutcome::Saved)
    }

    pub fn format_history(&self) -> String {
        format_entries(self.read().history.iter(), NO_HISTORY)
    }

    pub fn format_favourites(&self) -> String {
        format_entries(self.read().favourites.iter(), NO_FAVOURITES)
    }
}

fn format_entries<'a>(
    entries: impl ExactSizeIterator<Item = &'a HistoryEntry>,
    placeholder: &str,
) -> String {
    if entries.len() == 0 {
        return placeholder.to_string();
    }
    let blocks = entries
        .enumerate()
        .map(|(idx, entry)| {
            format!(
                "#{}: [{} → {} | Tone: {}]\nInput: {}\nTranslated: {}",
                idx + 1,
                entry.source_language,
                entry.target_language,
                entry.tone,
                entry.input_text,
                entry.translated_text
            )
        })
        .collect::<Vec<_>>();
    blocks.join("\n\n").trim().to_string()
}
