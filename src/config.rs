use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{FilterError, Result};
use crate::filter::{Filter, FilterConfig};
use crate::flags::FlagGroup;
use crate::normalizer::{NormalizationConfig, TranslationSet};

/// Filter definition loaded from a TOML flag file
///
/// ```toml
/// case_sensitive = false
/// bidirectional = true
/// translations = ["!?.,", " "]
///
/// [[groups]]
/// label = "words"
/// tokens = ["Lorem", "dolor"]
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FlagFile {
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
    /// Replaces the default translation set when present
    #[serde(default)]
    pub translations: Option<Vec<String>>,
    #[serde(default)]
    pub groups: Vec<FlagGroup>,
}

fn default_bidirectional() -> bool {
    true
}

impl Default for FlagFile {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            bidirectional: default_bidirectional(),
            translations: None,
            groups: Vec::new(),
        }
    }
}

impl FlagFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FilterError::ResourceNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let flag_file = Self::parse(&content).map_err(|e| match e {
            FilterError::Configuration(msg) => {
                FilterError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        info!(
            "Loaded {} flag groups from {}",
            flag_file.groups.len(),
            path.display()
        );
        Ok(flag_file)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FilterError::Configuration(e.to_string()))
    }

    pub fn filter_config(&self) -> FilterConfig {
        let translations = match &self.translations {
            Some(entries) => TranslationSet::new(entries),
            None => TranslationSet::default(),
        };
        FilterConfig {
            normalization: NormalizationConfig {
                translations,
                case_sensitive: self.case_sensitive,
            },
            bidirectional: self.bidirectional,
        }
    }

    pub fn build_filter(&self) -> Result<Filter> {
        Filter::new(&self.groups, self.filter_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_file() {
        let content = r#"
case_sensitive = true
bidirectional = false
translations = [",", " "]

[[groups]]
label = "words"
tokens = ["Lorem", "dolor"]

[[groups]]
tokens = ["sit amet"]
"#;
        let flag_file = FlagFile::parse(content).unwrap();
        assert!(flag_file.case_sensitive);
        assert!(!flag_file.bidirectional);
        assert_eq!(flag_file.groups.len(), 2);
        assert_eq!(flag_file.groups[0].label.as_deref(), Some("words"));
        assert!(flag_file.groups[1].label.is_none());

        let config = flag_file.filter_config();
        assert_eq!(config.normalization.translations.len(), 2);
        assert!(config.normalization.case_sensitive);
    }

    #[test]
    fn test_parse_defaults() {
        let flag_file = FlagFile::parse("").unwrap();
        assert_eq!(flag_file, FlagFile::default());

        let config = flag_file.filter_config();
        assert!(config.bidirectional);
        assert_eq!(config.normalization.translations, TranslationSet::default());
    }

    #[test]
    fn test_tokens_must_be_list() {
        let result = FlagFile::parse("[[groups]]\ntokens = \"Lorem\"\n");
        assert!(matches!(result, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn test_tokens_must_be_strings() {
        let result = FlagFile::parse("[[groups]]\ntokens = [1]\n");
        assert!(matches!(result, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn test_translations_must_be_strings() {
        let result = FlagFile::parse("translations = [1, 2]\n");
        assert!(matches!(result, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = FlagFile::parse("casesensitive = true\n");
        assert!(matches!(result, Err(FilterError::Configuration(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = FlagFile::load(&temp_dir.path().join("flags.toml"));
        assert!(matches!(result, Err(FilterError::ResourceNotFound(_))));
    }

    #[test]
    fn test_load_and_build_filter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.toml");
        fs::write(&path, "[[groups]]\nlabel = \"words\"\ntokens = [\"Lorem\"]\n").unwrap();

        let filter = FlagFile::load(&path).unwrap().build_filter().unwrap();
        assert_eq!(filter.flags().len(), 1);
        assert!(filter.evaluate_text("lorem ipsum").flagged);
    }

    #[test]
    fn test_load_reports_path_on_bad_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flags.toml");
        fs::write(&path, "groups = 3\n").unwrap();

        match FlagFile::load(&path) {
            Err(FilterError::Configuration(msg)) => assert!(msg.contains("flags.toml")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }
}
