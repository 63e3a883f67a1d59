//! Exports the [`build_site`] function which stitches together the
//! high-level steps of one composer run: loading the placement schedule
//! ([`crate::schedule`]), deciding what to publish ([`crate::select`]),
//! materializing the decision ([`crate::publish`]), and recording the
//! outcome ([`crate::journal`]).
//!
//! The ordering of the last two steps is the consistency contract: the
//! journal line is appended only after the publisher has succeeded, so the
//! journal never claims an outcome that isn't actually on disk. A journal
//! append failure, on the other hand, is reported and swallowed; it must
//! not fail a run whose pages were already published.

use crate::cause::CommandCauseSource;
use crate::config::Config;
use crate::journal::Journal;
use crate::publish::{Error as PublishError, Publisher};
use crate::schedule::{Error as ScheduleError, Schedule};
use crate::select::{Draw, Selector};
use chrono::NaiveDate;
use std::fmt;
use tracing::{info, warn};

/// Runs the whole pipeline once for `today`. The draw is injected so
/// callers (tests, the golden-tree verifier) can force the fallback
/// branches; production passes [`crate::select::RandomDraw`].
pub fn build_site(config: &Config, today: NaiveDate, draw: &mut dyn Draw) -> Result<()> {
    let schedule = Schedule::from_file(&config.schedule_file)?;
    let causes = config.cause_command.as_ref().map(CommandCauseSource::new);

    let decision = Selector {
        schedule: &schedule,
        causes: &causes,
        draw,
        promotion_odds: config.promotion_odds,
        cause_odds: config.cause_odds,
    }
    .select(today);
    info!("{}: selected {}", today, decision.kind());

    Publisher {
        template_directory: &config.template_directory,
        asset_directory: &config.asset_directory,
        output_directory: &config.output_directory,
        dryrun: config.dryrun,
    }
    .publish(&decision)?;

    if config.dryrun {
        return Ok(());
    }
    if let Err(err) = Journal::new(&config.journal_file).record(today, &decision) {
        warn!(
            "recording outcome to `{}`: {}",
            config.journal_file.display(),
            err
        );
    }
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for a composer run: either the schedule couldn't be
/// loaded or the decision couldn't be published. Journal problems are
/// deliberately not represented here.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the placement schedule.
    Schedule(ScheduleError),

    /// Returned for errors materializing the decision.
    Publish(PublishError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Schedule(err) => err.fmt(f),
            Error::Publish(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Schedule(err) => Some(err),
            Error::Publish(err) => Some(err),
        }
    }
}

impl From<ScheduleError> for Error {
    /// Converts [`ScheduleError`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: ScheduleError) -> Error {
        Error::Schedule(err)
    }
}

impl From<PublishError> for Error {
    /// Converts [`PublishError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: PublishError) -> Error {
        Error::Publish(err)
    }
}
