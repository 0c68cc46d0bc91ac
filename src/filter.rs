// WHY: the filter owns everything that is fixed at construction (normalizer and
// normalized flags) so evaluating a unit never re-normalizes a flag

use std::collections::HashSet;

use tracing::{debug, info};

use crate::error::Result;
use crate::flags::{Flag, FlagGroup};
use crate::matcher::{Matcher, ResultRecord};
use crate::normalizer::{DataUnit, NormalizationConfig, Normalizer};
use crate::source::{Source, Units};

/// Configuration for a filter
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub normalization: NormalizationConfig,
    /// Also count flags found in the character-reversed unit
    pub bidirectional: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            normalization: NormalizationConfig::default(),
            bidirectional: true,
        }
    }
}

/// Label and size of a flag group, as the filter saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub label: Option<String>,
    pub tokens: usize,
}

/// Flattens flag groups and evaluates data units against them
#[derive(Debug, Clone)]
pub struct Filter {
    normalizer: Normalizer,
    matcher: Matcher,
    groups: Vec<GroupSummary>,
}

impl Filter {
    /// Build a filter from ordered flag groups
    ///
    /// Flags keep group order, then token order within each group. A token
    /// repeating an earlier original is skipped.
    pub fn new(groups: &[FlagGroup], config: FilterConfig) -> Result<Self> {
        let normalizer = Normalizer::new(config.normalization);

        let mut seen = HashSet::new();
        let mut flags = Vec::new();
        for group in groups {
            for token in &group.tokens {
                if !seen.insert(token.as_str()) {
                    debug!("Skipping duplicate token {:?}", token);
                    continue;
                }
                flags.push(Flag::new(token.as_str(), &normalizer)?);
            }
        }

        let summaries = groups
            .iter()
            .map(|group| GroupSummary {
                label: group.label.clone(),
                tokens: group.len(),
            })
            .collect();

        info!(
            "Built filter with {} flags from {} groups (bidirectional: {}, case sensitive: {})",
            flags.len(),
            groups.len(),
            config.bidirectional,
            normalizer.config().case_sensitive
        );

        Ok(Self {
            normalizer,
            matcher: Matcher::new(flags, config.bidirectional),
            groups: summaries,
        })
    }

    /// Build a filter from a single unlabelled list of tokens
    pub fn from_tokens<I, S>(tokens: I, config: FilterConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(&[FlagGroup::from_tokens(tokens)], config)
    }

    pub fn flags(&self) -> &[Flag] {
        self.matcher.flags()
    }

    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn is_bidirectional(&self) -> bool {
        self.matcher.is_bidirectional()
    }

    /// Evaluate one unit
    pub fn evaluate(&self, unit: DataUnit) -> ResultRecord {
        self.matcher.evaluate(self.normalizer.normalize(unit))
    }

    pub fn evaluate_text(&self, text: &str) -> ResultRecord {
        self.evaluate(DataUnit::from(text))
    }

    /// Lazily evaluate every unit the source produces, in input order
    pub fn results<'a>(&'a self, source: &'a Source) -> Result<Results<'a>> {
        Ok(Results {
            filter: self,
            units: source.units()?,
        })
    }
}

/// Lazy stream of result records for one source
pub struct Results<'a> {
    filter: &'a Filter,
    units: Units<'a>,
}

impl Iterator for Results<'_> {
    type Item = Result<ResultRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let unit = self.units.next()?;
        Some(unit.map(|unit| self.filter.evaluate(unit)))
    }
}
