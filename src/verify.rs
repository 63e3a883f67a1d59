//! The golden-output verifier: runs the composer once against fixture
//! inputs, then walks the output tree and a golden expected tree and
//! reports every path where they disagree. An empty mismatch list is the
//! pass condition; a single differing byte, a missing file, or an
//! unexpected extra file all fail. Mismatches are reported per path so a
//! broken run can be debugged from the report alone.

use crate::build::{self, build_site};
use crate::config::Config;
use crate::select::Draw;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One disagreement between the golden tree and the output tree. Paths are
/// relative to the respective tree roots.
#[derive(Debug, PartialEq)]
pub enum Mismatch {
    /// Present in the golden tree, absent from the output.
    Missing(PathBuf),

    /// Present in the output, absent from the golden tree.
    Unexpected(PathBuf),

    /// Present in both, but with different bytes.
    Differs(PathBuf),
}

impl fmt::Display for Mismatch {
    /// Implements [`fmt::Display`] for [`Mismatch`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mismatch::Missing(path) => write!(f, "missing: {}", path.display()),
            Mismatch::Unexpected(path) => write!(f, "unexpected: {}", path.display()),
            Mismatch::Differs(path) => write!(f, "differs: {}", path.display()),
        }
    }
}

/// Runs the pipeline once and diffs the output directory against the
/// golden tree. Returns the (possibly empty) list of mismatches; a failure
/// to even produce the output is an [`Error`], not a mismatch.
pub fn verify_site(
    config: &Config,
    today: NaiveDate,
    draw: &mut dyn Draw,
    golden: &Path,
) -> Result<Vec<Mismatch>> {
    build_site(config, today, draw)?;
    diff_trees(golden, &config.output_directory)
}

/// Recursively compares two directory trees by byte content. The result is
/// ordered: golden-relative mismatches first (sorted by path), then
/// unexpected extras.
pub fn diff_trees(golden: &Path, output: &Path) -> Result<Vec<Mismatch>> {
    let golden_files = tree_files(golden)?;
    let output_files = tree_files(output)?;

    let mut mismatches = Vec::new();
    for path in &golden_files {
        if !output_files.contains(path) {
            mismatches.push(Mismatch::Missing(path.clone()));
        } else if fs::read(golden.join(path))? != fs::read(output.join(path))? {
            mismatches.push(Mismatch::Differs(path.clone()));
        }
    }
    for path in &output_files {
        if !golden_files.contains(path) {
            mismatches.push(Mismatch::Unexpected(path.clone()));
        }
    }
    Ok(mismatches)
}

// Collects the root-relative paths of every file under `root`.
fn tree_files(root: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    for result in WalkDir::new(root) {
        let entry = result?;
        if entry.file_type().is_file() {
            // strip_prefix can't fail; every entry is under `root`
            files.insert(entry.path().strip_prefix(root).unwrap().to_owned());
        }
    }
    Ok(files)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for a verification run: the pipeline itself failed, a
/// tree couldn't be walked, or file contents couldn't be read back.
#[derive(Debug)]
pub enum Error {
    /// Returned when the pipeline under test fails outright.
    Build(build::Error),

    /// Returned for I/O problems walking a tree.
    Walk(walkdir::Error),

    /// Returned for I/O problems reading file contents.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Build(err) => err.fmt(f),
            Error::Walk(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Build(err) => Some(err),
            Error::Walk(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<build::Error> for Error {
    /// Converts [`build::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: build::Error) -> Error {
        Error::Build(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::Walk(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
