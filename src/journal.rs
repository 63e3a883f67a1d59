//! The activity journal: one appended line per run recording what was
//! published. The journal is best-effort: the caller reports a failed
//! append and moves on, because a published landing page must never be
//! rolled back over a logging problem. The converse also holds, in that
//! the caller only records outcomes that were actually published.

use crate::select::ContentDecision;
use chrono::NaiveDate;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

pub struct Journal {
    path: PathBuf,
}

impl Journal {
    /// The journal path is threaded in explicitly; nothing here reads
    /// ambient process state.
    pub fn new(path: impl Into<PathBuf>) -> Journal {
        Journal { path: path.into() }
    }

    /// Appends one line of the form `<date> <kind>[: <label>]`, creating the
    /// file if absent. The line is written with a single call so concurrent
    /// appenders can't interleave within a line.
    pub fn record(&self, date: NaiveDate, decision: &ContentDecision) -> io::Result<()> {
        let line = match decision.label() {
            Some(label) => format!("{} {}: {}\n", date, decision.kind(), label),
            None => format!("{} {}\n", date, decision.kind()),
        };
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use url::Url;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_record_appends_one_line_per_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path().join("journal.log"));

        journal
            .record(
                date("2021-05-04"),
                &ContentDecision::Placement {
                    label: "Acme".to_owned(),
                    target: Url::parse("https://acme.example/").unwrap(),
                },
            )
            .unwrap();
        journal
            .record(date("2021-05-05"), &ContentDecision::Default)
            .unwrap();
        journal
            .record(
                date("2021-05-06"),
                &ContentDecision::Cause {
                    label: "Clean Water".to_owned(),
                    page: "water.html".to_owned(),
                },
            )
            .unwrap();

        let contents = std::fs::read_to_string(dir.path().join("journal.log")).unwrap();
        assert_eq!(
            "2021-05-04 placement: Acme\n2021-05-05 default\n2021-05-06 cause: Clean Water\n",
            contents,
        );
    }

    #[test]
    fn test_record_fails_without_aborting_caller() {
        let journal = Journal::new("/nonexistent/journal.log");
        assert!(journal
            .record(date("2021-05-04"), &ContentDecision::Promotion)
            .is_err());
    }
}
