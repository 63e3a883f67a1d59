//! Loads the placement schedule: a human-edited, tab-separated table mapping
//! calendar dates to the sponsor booked for that day. One row per booking:
//!
//! ```text
//! 2021-05-04<TAB>Acme<TAB>https://acme.example/
//! ```
//!
//! Blank lines and lines beginning with `#` are ignored. The table is loaded
//! once per run and is immutable afterwards.

use chrono::NaiveDate;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// A single booked placement: the sponsor's display label and the outbound
/// destination the redirect page will point at. The destination is parsed as
/// a [`Url`] at load time so a typo in the schedule surfaces as a
/// configuration error rather than as a broken redirect page.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub label: String,
    pub target: Url,
}

/// The loaded schedule. Lookups are by exact date.
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn from_file(path: &Path) -> Result<Schedule> {
        match fs::read_to_string(path) {
            Ok(contents) => contents.parse(),
            Err(err) => Err(Error::Open {
                path: path.to_owned(),
                err,
            }),
        }
    }

    /// Returns the placement booked for `date`, if any. An entry whose label
    /// is empty is treated as absent. If the table contains duplicate rows
    /// for one date, the first row wins; a later append never silently
    /// overrides an existing booking.
    pub fn placement_for(&self, date: NaiveDate) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .find(|entry| entry.date == date && !entry.label.is_empty())
    }
}

impl std::str::FromStr for Schedule {
    type Err = Error;

    fn from_str(input: &str) -> Result<Schedule> {
        let mut entries = Vec::new();
        for (number, line) in input.lines().enumerate() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.splitn(3, '\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(date), Some(label), Some(target)) => entries.push(ScheduleEntry {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|err| {
                        Error::Date {
                            line: number + 1,
                            err,
                        }
                    })?,
                    label: label.to_owned(),
                    target: Url::parse(target).map_err(|err| Error::Target {
                        line: number + 1,
                        err,
                    })?,
                }),
                _ => {
                    return Err(Error::MalformedRow { line: number + 1 });
                }
            }
        }
        Ok(Schedule { entries })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the schedule table.
#[derive(Debug)]
pub enum Error {
    /// Returned when the schedule file itself can't be read.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned for a row with fewer than three tab-separated fields.
    MalformedRow { line: usize },

    /// Returned for a row whose date field isn't an ISO `YYYY-MM-DD` date.
    Date {
        line: usize,
        err: chrono::ParseError,
    },

    /// Returned for a row whose destination field isn't a valid URL.
    Target { line: usize, err: url::ParseError },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening schedule file '{}': {}", path.display(), err)
            }
            Error::MalformedRow { line } => write!(
                f,
                "Schedule line {}: expected `date<TAB>label<TAB>url`",
                line
            ),
            Error::Date { line, err } => write!(f, "Schedule line {}: {}", line, err),
            Error::Target { line, err } => write!(f, "Schedule line {}: {}", line, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::MalformedRow { line: _ } => None,
            Error::Date { line: _, err } => Some(err),
            Error::Target { line: _, err } => Some(err),
        }
    }
}
