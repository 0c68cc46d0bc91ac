// WHY: flags and data units must pass through the exact same transformation
// so that substring matching compares like with like

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// ASCII punctuation characters stripped by default
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
/// ASCII whitespace characters stripped by default (space, tab, LF, CR, VT, FF)
pub const WHITESPACE: &str = " \t\n\r\x0b\x0c";
/// ASCII digits stripped by default
pub const DIGITS: &str = "0123456789";

/// Set of characters removed during normalization
///
/// Entries are collapsed into individual characters, so `["ab", "b"]` and
/// `["a", "b"]` describe the same set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSet {
    chars: BTreeSet<char>,
}

impl TranslationSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let chars = entries
            .into_iter()
            .flat_map(|entry| entry.as_ref().chars().collect::<Vec<_>>())
            .collect();
        Self { chars }
    }

    /// A set that strips nothing
    pub fn empty() -> Self {
        Self { chars: BTreeSet::new() }
    }

    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl Default for TranslationSet {
    fn default() -> Self {
        Self::new([PUNCTUATION, WHITESPACE, DIGITS])
    }
}

/// Normalization settings shared by flags and data units
#[derive(Debug, Clone, Default)]
pub struct NormalizationConfig {
    /// Characters stripped before comparison
    pub translations: TranslationSet,
    /// Keep original casing when true; lowercase everything otherwise
    pub case_sensitive: bool,
}

/// One unit of input: a text string or an ordered row of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DataUnit {
    Text(String),
    Row(Vec<String>),
}

impl DataUnit {
    /// Text used for normalization: strings as-is, rows joined with a single space
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            DataUnit::Text(text) => Cow::Borrowed(text),
            DataUnit::Row(fields) => Cow::Owned(fields.join(" ")),
        }
    }
}

impl fmt::Display for DataUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl From<&str> for DataUnit {
    fn from(text: &str) -> Self {
        DataUnit::Text(text.to_string())
    }
}

impl From<String> for DataUnit {
    fn from(text: String) -> Self {
        DataUnit::Text(text)
    }
}

impl From<Vec<String>> for DataUnit {
    fn from(fields: Vec<String>) -> Self {
        DataUnit::Row(fields)
    }
}

/// A data unit paired with its normalized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUnit {
    pub original: DataUnit,
    pub normalized: String,
}

/// Stateless text normalizer: strip configured characters, then fold case
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    pub fn new(config: NormalizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Normalize a data unit, keeping the original alongside the result
    pub fn normalize(&self, unit: DataUnit) -> NormalizedUnit {
        let normalized = self.normalize_str(&unit.joined());
        NormalizedUnit {
            original: unit,
            normalized,
        }
    }

    /// Normalize a single string with a new allocation
    pub fn normalize_str(&self, text: &str) -> String {
        let mut buffer = String::with_capacity(text.len());
        self.normalize_into(text, &mut buffer);
        buffer
    }

    /// Normalize into supplied buffer, clearing it first
    ///
    /// Characters are stripped before case folding. With the default set the
    /// result is a fixed point, but a translation set holding a lowercase
    /// letter leaves its uppercase form in place, lowercased, so normalizing
    /// the output again strips it.
    pub fn normalize_into(&self, text: &str, buffer: &mut String) {
        buffer.clear();
        buffer.reserve(text.len());

        let kept = text
            .chars()
            .filter(|ch| !self.config.translations.contains(*ch));

        if self.config.case_sensitive {
            buffer.extend(kept);
        } else {
            for ch in kept {
                buffer.extend(ch.to_lowercase());
            }
        }
    }
}
