// WHY: saving is a pass-through of unflagged units; it never re-evaluates anything

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::filter::Filter;
use crate::matcher::ResultRecord;
use crate::normalizer::DataUnit;
use crate::source::Source;

/// Default string written after each unit by [`LineSink`]
pub const DEFAULT_END_OF_LINE: &str = "\n";

/// Counts from one save run
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStats {
    /// Records seen in the result stream
    pub units_read: u64,
    /// Unflagged units written to the destination
    pub units_written: u64,
}

/// Destination for units that passed the filter
pub trait UnitSink {
    fn write_unit(&mut self, unit: &DataUnit) -> Result<()>;

    /// Flush buffered output
    fn finish(&mut self) -> Result<()>;
}

/// Writes units as CSV rows; text units become single-field rows
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(destination),
        }
    }

    pub fn with_delimiter(destination: W, delimiter: u8) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .flexible(true)
                .delimiter(delimiter)
                .from_writer(destination),
        }
    }
}

impl<W: Write> UnitSink for CsvSink<W> {
    fn write_unit(&mut self, unit: &DataUnit) -> Result<()> {
        match unit {
            DataUnit::Row(fields) => self.writer.write_record(fields)?,
            DataUnit::Text(text) => self.writer.write_record([text])?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes each unit followed by a configurable end-of-line string
pub struct LineSink<W: Write> {
    writer: BufWriter<W>,
    end_of_line: String,
}

impl<W: Write> LineSink<W> {
    pub fn new(destination: W, end_of_line: impl Into<String>) -> Self {
        Self {
            writer: BufWriter::new(destination),
            end_of_line: end_of_line.into(),
        }
    }
}

impl<W: Write> UnitSink for LineSink<W> {
    fn write_unit(&mut self, unit: &DataUnit) -> Result<()> {
        write!(self.writer, "{}{}", unit, self.end_of_line)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Write every unflagged unit of `results` to `sink`
///
/// Stops at the first error in the stream and returns it.
pub fn save<I, S>(results: I, sink: &mut S) -> Result<SaveStats>
where
    I: IntoIterator<Item = Result<ResultRecord>>,
    S: UnitSink + ?Sized,
{
    let mut stats = SaveStats::default();

    for record in results {
        let record = record?;
        stats.units_read += 1;
        if !record.flagged {
            sink.write_unit(&record.data)?;
            stats.units_written += 1;
        }
    }

    sink.finish()?;
    Ok(stats)
}

/// Run `filter` over `source` and save unflagged units to `path`
///
/// CSV sources are written back as CSV with the same delimiter; text sources
/// are written as lines terminated by `end_of_line`.
pub fn save_to_path(
    filter: &Filter,
    source: &Source,
    path: &Path,
    end_of_line: &str,
) -> Result<SaveStats> {
    let results = filter.results(source)?;
    let file = File::create(path)?;

    let stats = match source {
        Source::Csv(csv_source) => {
            let mut sink = CsvSink::with_delimiter(file, csv_source.delimiter());
            save(results, &mut sink)?
        }
        Source::Text(_) | Source::TextFile(_) => {
            let mut sink = LineSink::new(file, end_of_line);
            save(results, &mut sink)?
        }
    };

    info!(
        "Saved {} of {} units to {}",
        stats.units_written,
        stats.units_read,
        path.display()
    );
    Ok(stats)
}
