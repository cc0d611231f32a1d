// Message code vocabulary

use serde::Deserialize;
use std::collections::HashMap;


/// Built-in code tables shipped with the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Four-state cell: arrival, dispatch, lock, unlock
    #[default]
    Standard,
    /// Six-state cell: adds lid open/closed
    Extended,
}

/// Fixed mapping from message code to human-readable state label.
///
/// Built once at startup and shared read-only; lookups need no locking.
/// Codes are matched case-sensitively against the trimmed wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    codes: HashMap<String, String>,
}

impl Vocabulary {
    /// Build a vocabulary from `(code, label)` pairs
    pub fn new<I, C, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, L)>,
        C: Into<String>,
        L: Into<String>,
    {
        Self {
            codes: pairs
                .into_iter()
                .map(|(code, label)| (code.into(), label.into()))
                .collect(),
        }
    }

    /// Four-code vocabulary used by the production cell
    pub fn standard() -> Self {
        Self::new([
            ("PRISPELO", "Prispelo"),
            ("ODPRAVLJENO", "Odpravljeno"),
            ("ZAKLENJENA", "Zaklenjena"),
            ("ODKLENJENA", "Odklenjena"),
        ])
    }

    /// Six-code vocabulary with lid open/closed reporting
    pub fn extended() -> Self {
        Self::new([
            ("PRISPELA", "Prispela škatla"),
            ("ODPRAVLJENA", "Odpravljena škatla"),
            ("ZAKLENJENA", "Zaklenjena škatla"),
            ("ODKLENJENA", "Odklenjena škatla"),
            ("ODPRTA", "Odprta škatla"),
            ("ZAPRTA", "Zaprta škatla"),
        ])
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Standard => Self::standard(),
            Preset::Extended => Self::extended(),
        }
    }

    /// Resolve a message code to its state label
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }

    /// All known codes, sorted for stable iteration
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.codes.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}
