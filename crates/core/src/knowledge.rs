//! Knowledge base: the text the persona answers from.
//!
//! Loaded once at startup from a profile export, a free-text summary and any
//! number of extra text files (e.g. scraped website content). Every source is
//! optional; a missing file contributes nothing. The result is immutable and
//! shared between sessions behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where to read knowledge from.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeSources {
    /// Profile text (e.g. an exported LinkedIn profile, already converted to text)
    pub profile: Option<PathBuf>,

    /// Free-text bio / summary
    pub summary: Option<PathBuf>,

    /// Additional text files, appended in order
    pub extra: Vec<PathBuf>,
}

/// An additional knowledge section with its origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSection {
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub profile_text: String,
    pub summary_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<KnowledgeSection>,
    /// Which files were actually read (for diagnostics)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loaded_files: Vec<String>,
}

impl KnowledgeBase {
    /// Build a knowledge base from in-memory text.
    pub fn from_text(profile_text: impl Into<String>, summary_text: impl Into<String>) -> Self {
        Self {
            profile_text: profile_text.into(),
            summary_text: summary_text.into(),
            ..Self::default()
        }
    }

    /// Load every configured source. Missing or unreadable files are skipped.
    pub fn load(sources: &KnowledgeSources) -> Self {
        let mut kb = Self::default();

        if let Some(path) = &sources.profile {
            if let Some(text) = Self::read_source(path, &mut kb.loaded_files) {
                kb.profile_text = text;
            }
        }

        if let Some(path) = &sources.summary {
            if let Some(text) = Self::read_source(path, &mut kb.loaded_files) {
                kb.summary_text = text;
            }
        }

        for path in &sources.extra {
            if let Some(text) = Self::read_source(path, &mut kb.loaded_files) {
                kb.extra.push(KnowledgeSection {
                    source: path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("extra")
                        .to_string(),
                    text,
                });
            }
        }

        debug!(
            files_loaded = kb.loaded_files.len(),
            chars = kb.combined().len(),
            "Knowledge base loaded"
        );
        kb
    }

    fn read_source(path: &Path, loaded_files: &mut Vec<String>) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => {
                loaded_files.push(path.display().to_string());
                Some(content.trim().to_string())
            }
            Ok(_) => {
                warn!(file = %path.display(), "Knowledge file is empty, skipping");
                None
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Knowledge file not readable, skipping");
                None
            }
        }
    }

    /// All knowledge as one blob: summary, then profile, then extras.
    pub fn combined(&self) -> String {
        let mut parts: Vec<&str> = vec![self.summary_text.as_str(), self.profile_text.as_str()];
        parts.extend(self.extra.iter().map(|s| s.text.as_str()));
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.combined().is_empty()
    }
}
