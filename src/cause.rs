//! The seam to the cause-selection subprogram. Cause rotation lives in a
//! separate executable whose selection policy is opaque to the composer: we
//! invoke it with no arguments and it prints one line of the form
//! `label|page_slug` on stdout. Empty output means no cause is available
//! today.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

/// One candidate cause: its display label and the page slug under the
/// `causes/` subtree the landing page should link to.
#[derive(Debug, PartialEq)]
pub struct Cause {
    pub label: String,
    pub page: String,
}

/// Anything that can produce a candidate cause. The production
/// implementation shells out to the configured executable
/// ([`CommandCauseSource`]); tests substitute fixed sources.
pub trait CauseSource {
    /// Returns one candidate cause, or `None` when no cause is available.
    fn draw_cause(&self) -> Result<Option<Cause>>;
}

/// A project with no cause selector configured simply never has a cause
/// available.
impl<C: CauseSource> CauseSource for Option<C> {
    fn draw_cause(&self) -> Result<Option<Cause>> {
        match self {
            Some(source) => source.draw_cause(),
            None => Ok(None),
        }
    }
}

/// Invokes an external executable and parses its stdout.
pub struct CommandCauseSource {
    program: PathBuf,
}

impl CommandCauseSource {
    pub fn new(program: impl Into<PathBuf>) -> CommandCauseSource {
        CommandCauseSource {
            program: program.into(),
        }
    }
}

impl CauseSource for CommandCauseSource {
    fn draw_cause(&self) -> Result<Option<Cause>> {
        let output = Command::new(&self.program).output().map_err(|err| Error::Spawn {
            program: self.program.clone(),
            err,
        })?;
        if !output.status.success() {
            return Err(Error::Status {
                program: self.program.clone(),
                status: output.status,
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_cause(stdout.lines().next().unwrap_or(""))
    }
}

/// Parses one `label|page_slug` line. An empty line means no cause is
/// available; a line without the separator or with an empty half is
/// malformed.
fn parse_cause(line: &str) -> Result<Option<Cause>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    match line.split_once('|') {
        Some((label, page)) if !label.is_empty() && !page.is_empty() => Ok(Some(Cause {
            label: label.to_owned(),
            page: page.to_owned(),
        })),
        _ => Err(Error::Malformed(line.to_owned())),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a failure of the cause-selection subprogram. Callers recover
/// from all of these by treating the day as having no cause available.
#[derive(Debug)]
pub enum Error {
    /// Returned when the executable can't be started at all.
    Spawn {
        program: PathBuf,
        err: std::io::Error,
    },

    /// Returned when the executable exits unsuccessfully.
    Status {
        program: PathBuf,
        status: std::process::ExitStatus,
    },

    /// Returned when stdout isn't a `label|page_slug` line.
    Malformed(String),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spawn { program, err } => {
                write!(f, "Running cause selector '{}': {}", program.display(), err)
            }
            Error::Status { program, status } => write!(
                f,
                "Cause selector '{}' exited with {}",
                program.display(),
                status
            ),
            Error::Malformed(line) => {
                write!(f, "Cause selector output `{}`: expected `label|page`", line)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Spawn { program: _, err } => Some(err),
            Error::Status { .. } => None,
            Error::Malformed(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_cause() {
        assert_eq!(
            Some(Cause {
                label: "Clean Water".to_owned(),
                page: "water.html".to_owned(),
            }),
            parse_cause("Clean Water|water.html").unwrap(),
        );
    }

    #[test]
    fn test_parse_empty_output_means_no_cause() {
        assert_eq!(None, parse_cause("").unwrap());
        assert_eq!(None, parse_cause("   ").unwrap());
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(parse_cause("Clean Water").is_err());
        assert!(parse_cause("|water.html").is_err());
        assert!(parse_cause("Clean Water|").is_err());
    }

    #[test]
    fn test_unconfigured_source_has_no_cause() {
        let source: Option<CommandCauseSource> = None;
        assert_eq!(None, source.draw_cause().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_runs_executable() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("select-cause");
        let mut file = std::fs::File::create(&program).unwrap();
        writeln!(file, "#!/bin/sh\necho 'Clean Water|water.html'").unwrap();
        drop(file);
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let cause = CommandCauseSource::new(&program).draw_cause().unwrap().unwrap();
        assert_eq!("Clean Water", cause.label);
        assert_eq!("water.html", cause.page);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_source_missing_executable_is_a_spawn_error() {
        match CommandCauseSource::new("/nonexistent/select-cause").draw_cause() {
            Err(Error::Spawn { .. }) => (),
            other => panic!("expected Spawn error, got {:?}", other),
        }
    }
}
