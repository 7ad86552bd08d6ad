use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MetaError {
    #[error("couldn't read data directory {path}: {message}")]
    DataDirRead { path: Utf8PathBuf, message: String },

    #[error("couldn't read CSV file {path}: {message}")]
    CsvRead { path: Utf8PathBuf, message: String },

    #[error("CSV input has no header row")]
    EmptyCsv,

    #[error("couldn't find \"{column}\" in CSV header: {header:?}")]
    #[diagnostic(help("the header row must contain a column labeled exactly \"{column}\""))]
    MissingIdColumn { column: String, header: Vec<String> },

    #[error("CSV row {row} has {len} fields, but \"{column}\" is field {needed}")]
    ShortRow {
        row: usize,
        len: usize,
        needed: usize,
        column: String,
    },

    #[error("empty identifier")]
    EmptyIdentifier,

    #[error("identifier is not a valid file name: {0:?}")]
    InvalidIdentifier(String),

    #[error("couldn't read metas directory {path}: {message}")]
    CacheRead { path: Utf8PathBuf, message: String },

    #[error("couldn't write meta file {path}: {message}")]
    CacheWrite { path: Utf8PathBuf, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    ConfigValue(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
