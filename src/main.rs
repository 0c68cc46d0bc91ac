use anyhow::{Context, Result};
use clap::Parser;
use datafilter::config::FlagFile;
use datafilter::save::DEFAULT_END_OF_LINE;
use datafilter::{
    save_to_path, CsvSource, Filter, FlagGroup, Source, TextFileSource, TextSource,
    TranslationSet,
};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// CSV file; every row is one unit
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Literal text to scan
    #[arg(long)]
    text: Option<String>,

    /// Text file; every line is one unit
    #[arg(long)]
    text_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(name = "datafilter")]
#[command(about = "Find flags (words, phrases, etc) within text, text files and CSV rows")]
#[command(version)]
struct Args {
    #[command(flatten)]
    input: InputArgs,

    /// Flag to search for (repeatable)
    #[arg(short, long = "flag")]
    flags: Vec<String>,

    /// TOML file with flag groups and normalization settings
    #[arg(long)]
    flags_file: Option<PathBuf>,

    /// Regular expression used to split text (or each line) into units
    #[arg(long)]
    split: Option<String>,

    /// Characters to strip before matching (repeatable, replaces the defaults)
    #[arg(long)]
    translations: Vec<String>,

    /// Match case exactly
    #[arg(long)]
    case_sensitive: bool,

    /// Do not search the reversed text
    #[arg(long)]
    unidirectional: bool,

    /// CSV field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Write unflagged units to this file instead of printing results
    #[arg(long)]
    save: Option<PathBuf>,

    /// String written after each saved text unit
    #[arg(long, default_value = DEFAULT_END_OF_LINE)]
    end_of_line: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .json()
        .init();

    info!(?args, "Parsed CLI arguments");

    let filter = build_filter(&args)?;
    let source = build_source(&args)?;

    if let Some(path) = &args.save {
        let stats = save_to_path(&filter, &source, path, &args.end_of_line)
            .with_context(|| format!("Failed to save unflagged units to {}", path.display()))?;
        println!("{}", serde_json::to_string(&stats)?);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut flagged = 0u64;
    let mut total = 0u64;

    for record in filter.results(&source)? {
        let record = record?;
        total += 1;
        if record.flagged {
            flagged += 1;
        }
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    info!("Processed {} units, {} flagged", total, flagged);
    Ok(())
}

fn build_filter(args: &Args) -> Result<Filter> {
    let mut flag_file = match &args.flags_file {
        Some(path) => FlagFile::load(path)?,
        None => FlagFile::default(),
    };

    if !args.flags.is_empty() {
        flag_file.groups.push(FlagGroup::new("cli", args.flags.iter().cloned()));
    }
    if flag_file.groups.iter().all(FlagGroup::is_empty) {
        anyhow::bail!("No flags given: use --flag or --flags-file");
    }

    let mut config = flag_file.filter_config();
    if !args.translations.is_empty() {
        config.normalization.translations = TranslationSet::new(&args.translations);
    }
    config.normalization.case_sensitive |= args.case_sensitive;
    config.bidirectional &= !args.unidirectional;

    Ok(Filter::new(&flag_file.groups, config)?)
}

fn build_source(args: &Args) -> Result<Source> {
    let input = &args.input;

    if let Some(path) = &input.csv {
        if args.split.is_some() {
            anyhow::bail!("--split cannot be used with --csv");
        }
        if !args.delimiter.is_ascii() {
            anyhow::bail!("CSV delimiter must be a single ASCII character");
        }
        let source = CsvSource::new(path)?.with_delimiter(args.delimiter as u8);
        return Ok(source.into());
    }

    if let Some(text) = &input.text {
        let mut source = TextSource::new(text.as_str());
        if let Some(pattern) = &args.split {
            source = source.with_split(pattern)?;
        }
        return Ok(source.into());
    }

    if let Some(path) = &input.text_file {
        let mut source = TextFileSource::new(path)?;
        if let Some(pattern) = &args.split {
            source = source.with_split(pattern)?;
        }
        return Ok(source.into());
    }

    anyhow::bail!("One of --csv, --text or --text-file is required")
}
