use datafilter::config::FlagFile;
use datafilter::{
    CsvSource, Filter, FilterConfig, FilterError, FlagGroup, Source, TextFileSource, TextSource,
};

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::TestFixture;

/// Missing paths fail when the source is built, before any data is read
#[test]
fn test_csv_path_not_found() {
    let err = CsvSource::new("invalid.csv").expect_err("Missing CSV should be rejected");
    assert!(matches!(err, FilterError::ResourceNotFound(_)));
    assert_eq!(err.to_string(), "File does not exist: invalid.csv");
}

#[test]
fn test_textfile_path_not_found() {
    let err = TextFileSource::new("invalid.csv").expect_err("Missing text file should be rejected");
    assert_eq!(err.to_string(), "File does not exist: invalid.csv");
}

#[test]
fn test_invalid_split_pattern() {
    let err = TextSource::new("Lorem")
        .with_split("[unclosed")
        .expect_err("Bad pattern should be rejected");
    assert!(matches!(err, FilterError::InvalidPattern { .. }));
}

#[test]
fn test_empty_flag_rejected() {
    let err = Filter::new(&[FlagGroup::new("words", ["Lorem", ""])], FilterConfig::default())
        .expect_err("Empty flag should be rejected");
    assert!(matches!(err, FilterError::Configuration(_)));
}

#[test]
fn test_flag_file_wrong_types() {
    let fixture = TestFixture::new();
    let path = fixture.create_file("flags.toml", "[[groups]]\ntokens = \"Lorem\"\n");

    let err = FlagFile::load(&path).expect_err("String tokens should be rejected");
    assert!(matches!(err, FilterError::Configuration(_)));
}

/// Invalid UTF-8 surfaces as an error item while iterating, after the good lines
#[test]
fn test_textfile_invalid_utf8_line() {
    let fixture = TestFixture::new();
    let path = fixture.path("mixed.txt");
    std::fs::write(&path, [b'L', b'o', b'r', b'e', b'm', b'\n', 0xFF, 0xFE, b'\n'])
        .expect("Failed to write test file");

    let filter = Filter::from_tokens(["Lorem"], FilterConfig::default())
        .expect("Filter creation should succeed");
    let source = Source::from(TextFileSource::new(&path).expect("File should exist"));
    let results: Vec<_> = filter.results(&source).expect("Source should open").collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].as_ref().expect("First line is valid").flagged);
    assert!(matches!(results[1], Err(FilterError::InputType(_))));
}

/// A row that is not valid UTF-8 fails on its own, the rows before it still evaluate
#[test]
fn test_csv_invalid_utf8_row() {
    let fixture = TestFixture::new();
    let path = fixture.path("bad.csv");
    std::fs::write(&path, [b'a', b',', b'b', b'\n', 0xFF, b',', b'c', b'\n'])
        .expect("Failed to write test file");

    let filter = Filter::from_tokens(["a"], FilterConfig::default())
        .expect("Filter creation should succeed");
    let source = Source::from(CsvSource::new(&path).expect("File should exist"));
    let results: Vec<_> = filter.results(&source).expect("Source should open").collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(FilterError::Csv(_))));
}
