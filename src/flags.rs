use serde::Deserialize;
use tracing::debug;

use crate::error::{FilterError, Result};
use crate::normalizer::Normalizer;

/// A string to search for, normalized once when the filter is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flag {
    original: String,
    normalized: String,
}

impl Flag {
    /// Normalize `original` with the filter's normalizer
    ///
    /// Empty flags, and flags that normalize to nothing, are rejected: the
    /// empty string is a substring of every unit and would flag everything.
    pub fn new(original: impl Into<String>, normalizer: &Normalizer) -> Result<Self> {
        let original = original.into();
        if original.is_empty() {
            return Err(FilterError::Configuration(
                "\"tokens\" must not contain empty strings".to_string(),
            ));
        }

        let normalized = normalizer.normalize_str(&original);
        if normalized.is_empty() {
            return Err(FilterError::Configuration(format!(
                "token {original:?} is empty after normalization"
            )));
        }

        debug!("Normalized flag {:?} -> {:?}", original, normalized);
        Ok(Self {
            original,
            normalized,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// A labelled list of related tokens, e.g. "words" vs "phrases"
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagGroup {
    #[serde(default)]
    pub label: Option<String>,
    pub tokens: Vec<String>,
}

impl FlagGroup {
    pub fn new<I, S>(label: impl Into<String>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: Some(label.into()),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Group without a label
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: None,
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
