// WHY: matching is a pure function of the normalized unit and the precomputed flags,
// so every unit can be evaluated independently and in input order

use indexmap::IndexMap;
use serde::Serialize;

use crate::flags::Flag;
use crate::normalizer::{DataUnit, NormalizedUnit};

/// Outcome of evaluating one data unit against every flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    /// The unit exactly as the source produced it
    pub data: DataUnit,
    pub flagged: bool,
    /// Originals of matched flags, in flag-list order
    pub detected: Vec<String>,
    pub count: usize,
    /// Occurrences per flag original, zero for flags that were not found
    pub frequency: IndexMap<String, usize>,
}

/// Number of non-overlapping occurrences of `needle`, scanning left to right
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

/// Scans precomputed flags against normalized units
#[derive(Debug, Clone)]
pub struct Matcher {
    flags: Vec<Flag>,
    bidirectional: bool,
}

impl Matcher {
    pub fn new(flags: Vec<Flag>, bidirectional: bool) -> Self {
        Self {
            flags,
            bidirectional,
        }
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// Evaluate a normalized unit against every flag
    pub fn evaluate(&self, unit: NormalizedUnit) -> ResultRecord {
        evaluate(unit, &self.flags, self.bidirectional)
    }
}

/// Count each flag in the unit (and in its reverse when `bidirectional`)
///
/// Forward and reverse counts are taken independently and summed, so a
/// palindromic flag is reported once per orientation.
pub fn evaluate(unit: NormalizedUnit, flags: &[Flag], bidirectional: bool) -> ResultRecord {
    let NormalizedUnit {
        original,
        normalized,
    } = unit;

    let reversed: Option<String> = bidirectional.then(|| normalized.chars().rev().collect());

    let mut detected = Vec::new();
    let mut frequency = IndexMap::with_capacity(flags.len());

    for flag in flags {
        let forward = count_occurrences(&normalized, flag.normalized());
        let reverse = reversed
            .as_deref()
            .map_or(0, |rev| count_occurrences(rev, flag.normalized()));
        let total = forward + reverse;

        if total > 0 {
            detected.push(flag.original().to_string());
        }
        frequency.insert(flag.original().to_string(), total);
    }

    ResultRecord {
        data: original,
        flagged: !detected.is_empty(),
        count: detected.len(),
        detected,
        frequency,
    }
}
