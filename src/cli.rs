//! Command-line surface: argument parsing, logger setup, and writer
//! construction.
//!
//! The binary is a thin wrapper; everything here turns CLI options into the
//! values the library works with (table specs, a sink, a format writer).

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::LevelFilter;

use crate::config::{load_table_list, DumpOptions, TableSpec};
use crate::error::ExportError;
use crate::writer::{
    CsvWriter, FormatWriter, JsonArrayWriter, JsonLinesWriter, PgDumpWriter, XmlWriter,
};

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Destination format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Transactional PostgreSQL bulk-load dump
    Pgdump,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Newline-delimited JSON objects
    Jsonl,
    /// Single JSON array document
    Json,
    /// XML document
    Xml,
}

/// Command-line options.
#[derive(Parser, Debug)]
#[command(
    name = "tabcopy",
    version,
    about = "Export relational tables into text formats, including transactional PostgreSQL bulk-load dumps."
)]
pub struct Cli {
    /// SQLite database to export from
    #[arg(long, value_name = "PATH")]
    pub db: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Destination format
    #[arg(short, long, value_enum, default_value = "pgdump")]
    pub format: Format,

    /// TOML table list driving a multi-table session
    #[arg(long, value_name = "PATH")]
    pub tables: Option<PathBuf>,

    /// Single table to export
    #[arg(long, conflicts_with = "tables")]
    pub table: Option<String>,

    /// Query override for --table
    #[arg(short = 'c', long, requires = "table")]
    pub query: Option<String>,

    /// Emit a cascading truncate before each table's load block (pgdump only)
    #[arg(long)]
    pub truncate: bool,

    /// Defer constraints and load under replica role (pgdump only)
    #[arg(long)]
    pub replica: bool,

    /// Field delimiter for csv output
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Emit a header row for csv/tsv output
    #[arg(long)]
    pub header: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Cli {
    /// Resolves the ordered table list for this invocation.
    ///
    /// # Errors
    ///
    /// [`ExportError::Config`] when neither `--tables` nor `--table` is given
    /// or the table list cannot be loaded.
    pub fn table_specs(&self) -> Result<Vec<TableSpec>, ExportError> {
        if let Some(path) = &self.tables {
            return load_table_list(path);
        }
        if let Some(name) = &self.table {
            let mut spec = TableSpec::new(name.clone());
            spec.sql = self.query.clone();
            return Ok(vec![spec]);
        }
        Err(ExportError::Config(
            "either --tables or --table is required".into(),
        ))
    }

    /// Dump-writer toggles from the CLI flags.
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            truncate: self.truncate,
            replica_mode: self.replica,
        }
    }

    /// Opens the destination sink: the `--output` file, or stdout.
    ///
    /// # Errors
    ///
    /// Propagates the file-creation error for `--output`.
    pub fn open_sink(&self) -> io::Result<Box<dyn Write>> {
        match &self.output {
            Some(path) => Ok(Box::new(std::fs::File::create(path)?)),
            None => Ok(Box::new(io::stdout())),
        }
    }

    /// Builds the format writer selected by `--format` over `sink`.
    ///
    /// # Errors
    ///
    /// [`ExportError::Config`] for a non-ASCII `--delimiter`.
    pub fn make_writer(
        &self,
        sink: Box<dyn Write>,
    ) -> Result<Box<dyn FormatWriter>, ExportError> {
        let writer: Box<dyn FormatWriter> = match self.format {
            Format::Pgdump => Box::new(PgDumpWriter::new(sink, self.dump_options())),
            Format::Csv => {
                let delimiter = u8::try_from(self.delimiter).map_err(|_| {
                    ExportError::Config(format!(
                        "delimiter {:?} is not an ASCII character",
                        self.delimiter
                    ))
                })?;
                Box::new(CsvWriter::new(sink, delimiter, self.header))
            }
            Format::Tsv => Box::new(CsvWriter::new(sink, b'\t', self.header)),
            Format::Jsonl => Box::new(JsonLinesWriter::new(sink)),
            Format::Json => Box::new(JsonArrayWriter::new(sink)),
            Format::Xml => Box::new(XmlWriter::new(sink)),
        };
        Ok(writer)
    }
}

/// Initializes `env_logger` with colored level output.
///
/// `RUST_LOG` is honored first; the `--log-level` argument overrides it.
/// Uses `try_init` so repeated initialization (tests) does not panic.
///
/// # Errors
///
/// Returns an error when a logger is already installed.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.format(|buf, record| {
        let level = record.level();
        let colored_level = match level {
            log::Level::Error => level.to_string().red(),
            log::Level::Warn => level.to_string().yellow(),
            log::Level::Info => level.to_string().green(),
            log::Level::Debug => level.to_string().blue(),
            log::Level::Trace => level.to_string().purple(),
        };
        writeln!(
            buf,
            "{} [{}] {}",
            record.target().cyan(),
            colored_level,
            record.args()
        )
    });
    builder.try_init()
}
