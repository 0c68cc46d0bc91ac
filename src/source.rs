// WHY: input sources only produce raw data units; they never look at flags
// File handles live inside the returned iterator and close when it is dropped

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use regex_automata::meta::Regex;
use tracing::{debug, info, warn};

use crate::error::{FilterError, Result};
use crate::normalizer::DataUnit;

/// Lazy stream of data units; I/O failures surface as `Err` items
pub type Units<'a> = Box<dyn Iterator<Item = Result<DataUnit>> + 'a>;

/// Regular expression used to split text into several units
#[derive(Debug, Clone)]
pub struct Splitter {
    pattern: String,
    regex: Regex,
}

impl Splitter {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        debug!("Compiled split pattern: {}", pattern);
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Pieces of `haystack` between matches, including empty leading/trailing pieces
    ///
    /// Text captured by groups in the pattern is emitted between the pieces it
    /// separates; groups that did not take part in a match are skipped.
    pub fn split<'h>(&self, haystack: &'h str) -> impl Iterator<Item = &'h str> + 'h {
        let mut pieces = Vec::new();
        let mut last = 0;

        for caps in self.regex.captures_iter(haystack) {
            let Some(found) = caps.get_match() else {
                continue;
            };
            pieces.push(haystack.get(last..found.start()).unwrap_or_default());
            for index in 1..caps.group_len() {
                if let Some(span) = caps.get_group(index) {
                    pieces.push(haystack.get(span.start..span.end).unwrap_or_default());
                }
            }
            last = found.end();
        }
        pieces.push(haystack.get(last..).unwrap_or_default());

        pieces.into_iter()
    }
}

/// Rows of a delimited file, one unit per row
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    /// Fails immediately when `path` does not exist
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = existing_path(path.into())?;
        Ok(Self {
            path,
            delimiter: b',',
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn units(&self) -> Result<Units<'_>> {
        info!("Opening CSV source: {}", self.path.display());
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_path(&self.path)?;

        Ok(Box::new(reader.into_records().map(|record| {
            record
                .map(|row| DataUnit::Row(row.iter().map(str::to_string).collect()))
                .map_err(|e| {
                    warn!("CSV read failed: {}", e);
                    FilterError::from(e)
                })
        })))
    }
}

/// An in-memory string, optionally split into several units
#[derive(Debug, Clone)]
pub struct TextSource {
    text: String,
    split: Option<Splitter>,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            split: None,
        }
    }

    pub fn with_split(mut self, pattern: &str) -> Result<Self> {
        self.split = Some(Splitter::new(pattern)?);
        Ok(self)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn units(&self) -> Units<'_> {
        match &self.split {
            Some(splitter) => Box::new(
                splitter
                    .split(&self.text)
                    .map(|piece| -> Result<DataUnit> { Ok(DataUnit::from(piece)) }),
            ),
            None => Box::new(std::iter::once(Ok::<_, FilterError>(DataUnit::from(
                self.text.as_str(),
            )))),
        }
    }
}

/// Lines of a text file, each optionally re-split into several units
#[derive(Debug, Clone)]
pub struct TextFileSource {
    path: PathBuf,
    split: Option<Splitter>,
}

impl TextFileSource {
    /// Fails immediately when `path` does not exist
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = existing_path(path.into())?;
        Ok(Self { path, split: None })
    }

    pub fn with_split(mut self, pattern: &str) -> Result<Self> {
        self.split = Some(Splitter::new(pattern)?);
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn units(&self) -> Result<Units<'_>> {
        info!("Opening text file source: {}", self.path.display());
        let file = File::open(&self.path)?;
        let path = self.path.clone();
        let split = self.split.as_ref();

        let units = LineReader::new(BufReader::new(file))
            .enumerate()
            .flat_map(move |(index, line)| -> Vec<Result<DataUnit>> {
                match line.map(String::from_utf8) {
                    Ok(Ok(line)) => match split {
                        Some(splitter) => splitter
                            .split(&line)
                            .map(|piece| Ok(DataUnit::from(piece)))
                            .collect(),
                        None => vec![Ok(DataUnit::Text(line))],
                    },
                    Ok(Err(_)) => {
                        warn!("Line {} of {} is not valid UTF-8", index + 1, path.display());
                        vec![Err(FilterError::InputType(format!(
                            "line {} of {} is not valid UTF-8",
                            index + 1,
                            path.display()
                        )))]
                    }
                    Err(e) => {
                        warn!("Read failed in {} at line {}: {}", path.display(), index + 1, e);
                        vec![Err(FilterError::Io(e))]
                    }
                }
            });

        Ok(Box::new(units))
    }
}

/// Raw lines of a reader, ending at `\n`, `\r\n` or a lone `\r`
///
/// Terminators are removed. Iteration stops after the first read error.
struct LineReader<R> {
    reader: R,
    pending: VecDeque<Vec<u8>>,
    failed: bool,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.pending.pop_front() {
            return Some(Ok(line));
        }
        if self.failed {
            return None;
        }

        let mut chunk = Vec::new();
        match self.reader.read_until(b'\n', &mut chunk) {
            Ok(0) => None,
            Ok(_) => {
                if chunk.last() == Some(&b'\n') {
                    chunk.pop();
                }
                if chunk.last() == Some(&b'\r') {
                    chunk.pop();
                }
                // any '\r' left inside the chunk ends a line of its own
                self.pending
                    .extend(chunk.split(|&byte| byte == b'\r').map(<[u8]>::to_vec));
                self.pending.pop_front().map(Ok)
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// The three input shapes a filter can read from
#[derive(Debug, Clone)]
pub enum Source {
    Csv(CsvSource),
    Text(TextSource),
    TextFile(TextFileSource),
}

impl Source {
    /// Open the source and return its units in input order
    pub fn units(&self) -> Result<Units<'_>> {
        match self {
            Source::Csv(source) => source.units(),
            Source::Text(source) => Ok(source.units()),
            Source::TextFile(source) => source.units(),
        }
    }

    /// Whether units are CSV rows (and should be saved as CSV)
    pub fn is_tabular(&self) -> bool {
        matches!(self, Source::Csv(_))
    }
}

impl From<CsvSource> for Source {
    fn from(source: CsvSource) -> Self {
        Source::Csv(source)
    }
}

impl From<TextSource> for Source {
    fn from(source: TextSource) -> Self {
        Source::Text(source)
    }
}

impl From<TextFileSource> for Source {
    fn from(source: TextFileSource) -> Self {
        Source::TextFile(source)
    }
}

fn existing_path(path: PathBuf) -> Result<PathBuf> {
    if !path.exists() {
        return Err(FilterError::ResourceNotFound(path));
    }
    if path.is_dir() {
        return Err(FilterError::InputType(format!(
            "{} is a directory, expected a file",
            path.display()
        )));
    }
    Ok(path)
}
