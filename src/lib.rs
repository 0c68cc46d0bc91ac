pub mod config;
pub mod error;
pub mod filter;
pub mod flags;
pub mod matcher;
pub mod normalizer;
pub mod save;
pub mod source;

// Re-export main types for convenient access
pub use error::{FilterError, Result};
pub use filter::{Filter, FilterConfig, Results};
pub use flags::{Flag, FlagGroup};
pub use matcher::ResultRecord;
pub use normalizer::{DataUnit, NormalizationConfig, Normalizer, TranslationSet};

// Re-export input sources and the save step
pub use source::{CsvSource, Source, TextFileSource, TextSource};
pub use save::{save, save_to_path, SaveStats};
