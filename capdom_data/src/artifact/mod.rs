//! The persisted market cap artifact: a CSV file in the [`SchemaVersion::CURRENT`] layout.

use std::fmt;
use std::io;
use std::path::PathBuf;

use snafu::Snafu;

use capdom_domain::schema::{Column, SchemaVersion};

mod writer;
pub use writer::{write_artifact, format_timestamp};

mod reader;
pub use reader::{read_artifact, parse_timestamp};

#[derive(Clone, Debug, PartialEq)]
pub enum Violation {
    MissingColumns(Vec<Column>),

    /// No complete row left after dropping incomplete ones.
    Empty,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingColumns(columns) => {
                let names: Vec<&str> = columns.iter().map(Column::header).collect();
                write!(f, "missing required columns {:?}", names)
            }
            Violation::Empty => f.write_str("no complete rows"),
        }
    }
}

#[derive(Snafu, Debug)]
pub enum ArtifactError {
    #[snafu(display("I/O error on '{}': {}", path.display(), source))]
    Io {
        path: PathBuf,
        source: io::Error,
    },

    #[snafu(display("Malformed CSV in '{}': {}", path.display(), source))]
    Csv {
        path: PathBuf,
        source: csv::Error,
    },

    #[snafu(display("'{}' does not satisfy schema {}: {}", path.display(), schema, violation))]
    SchemaViolation {
        path: PathBuf,
        schema: SchemaVersion,
        violation: Violation,
    },

    #[snafu(display("'{}' line {}: invalid value '{}' in column '{}'", path.display(), line, value, column))]
    InvalidValue {
        path: PathBuf,
        column: Column,
        line: u64,
        value: String,
    },
}

impl ArtifactError {
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ArtifactError::SchemaViolation { violation, .. } => Some(violation),
            _ => None,
        }
    }
}
