//! The content-selection decision process: a priority chain that decides,
//! once per run, which variant of the landing page to publish.
//!
//! The chain has a single deterministic step followed by a weighted random
//! fallback. A placement booked in the schedule for today always wins; only
//! when no placement is booked do we roll the dice, first for the
//! promotional page (one in `promotion_odds`) and then for a cause page
//! (an independent one in `cause_odds`). Anything else, including a cause
//! selector that fails or comes back empty, lands on the default page.

use crate::cause::CauseSource;
use crate::schedule::Schedule;
use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, warn};
use url::Url;

/// The outcome of the selection chain. Exactly one decision is produced per
/// run; it is consumed by the publisher and then summarized into the
/// journal.
#[derive(Debug, PartialEq)]
pub enum ContentDecision {
    /// A paid, date-scheduled placement with a tracked outbound link.
    Placement { label: String, target: Url },

    /// The fixed promotional page.
    Promotion,

    /// A rotating non-commercial campaign page.
    Cause { label: String, page: String },

    /// The plain default page.
    Default,
}

impl ContentDecision {
    /// The outcome kind as it appears in the journal.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentDecision::Placement { .. } => "placement",
            ContentDecision::Promotion => "promotion",
            ContentDecision::Cause { .. } => "cause",
            ContentDecision::Default => "default",
        }
    }

    /// The label attached to the outcome, for the kinds that carry one.
    pub fn label(&self) -> Option<&str> {
        match self {
            ContentDecision::Placement { label, .. } => Some(label),
            ContentDecision::Cause { label, .. } => Some(label),
            _ => None,
        }
    }
}

/// The randomness seam. The production implementation ([`RandomDraw`]) is
/// backed by the thread-local PRNG; [`ScriptedDraw`] replays a fixed
/// sequence so tests and the golden-tree verifier can force every branch of
/// the fallback.
pub trait Draw {
    /// Returns true roughly one time in `n`. `n == 0` never hits.
    fn one_in(&mut self, n: u32) -> bool;
}

pub struct RandomDraw;

impl Draw for RandomDraw {
    fn one_in(&mut self, n: u32) -> bool {
        match n {
            0 => false,
            n => rand::thread_rng().gen_range(0..n) == 0,
        }
    }
}

/// Replays a fixed sequence of draw results; draws past the end of the
/// script all miss.
pub struct ScriptedDraw {
    hits: Vec<bool>,
    next: usize,
}

impl ScriptedDraw {
    pub fn new(hits: &[bool]) -> ScriptedDraw {
        ScriptedDraw {
            hits: hits.to_vec(),
            next: 0,
        }
    }

    /// Forces the promotion branch: the first draw hits.
    pub fn promotion() -> ScriptedDraw {
        ScriptedDraw::new(&[true])
    }

    /// Forces the cause branch: the promotion draw misses, the cause draw
    /// hits.
    pub fn cause() -> ScriptedDraw {
        ScriptedDraw::new(&[false, true])
    }

    /// Forces the default branch: every draw misses.
    pub fn fallthrough() -> ScriptedDraw {
        ScriptedDraw::new(&[])
    }
}

impl Draw for ScriptedDraw {
    fn one_in(&mut self, _: u32) -> bool {
        let hit = self.hits.get(self.next).copied().unwrap_or(false);
        self.next += 1;
        hit
    }
}

/// Runs the priority chain over its collaborators.
pub struct Selector<'a> {
    pub schedule: &'a Schedule,
    pub causes: &'a dyn CauseSource,
    pub draw: &'a mut dyn Draw,

    /// One-in-N odds of the promotional page when no placement is booked.
    pub promotion_odds: u32,

    /// One-in-N odds of a cause page when the promotion draw missed.
    pub cause_odds: u32,
}

impl Selector<'_> {
    /// Decides what to publish for `today`. Selection itself is infallible:
    /// a failing cause selector degrades to [`ContentDecision::Default`]
    /// rather than aborting the run.
    pub fn select(&mut self, today: NaiveDate) -> ContentDecision {
        if let Some(entry) = self.schedule.placement_for(today) {
            return ContentDecision::Placement {
                label: entry.label.clone(),
                target: entry.target.clone(),
            };
        }
        if self.draw.one_in(self.promotion_odds) {
            return ContentDecision::Promotion;
        }
        if self.draw.one_in(self.cause_odds) {
            match self.causes.draw_cause() {
                Ok(Some(cause)) => {
                    return ContentDecision::Cause {
                        label: cause.label,
                        page: cause.page,
                    };
                }
                Ok(None) => debug!("no cause available today"),
                Err(err) => warn!("cause selector failed: {}", err),
            }
        }
        ContentDecision::Default
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cause::{Cause, CauseSource, Error as CauseError};

    struct FixedCause;

    impl CauseSource for FixedCause {
        fn draw_cause(&self) -> Result<Option<Cause>, CauseError> {
            Ok(Some(Cause {
                label: "Clean Water".to_owned(),
                page: "water.html".to_owned(),
            }))
        }
    }

    struct FailingCause;

    impl CauseSource for FailingCause {
        fn draw_cause(&self) -> Result<Option<Cause>, CauseError> {
            Err(CauseError::Malformed("garbage".to_owned()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::parse_from_str("2021-05-04", "%Y-%m-%d").unwrap()
    }

    fn booked_schedule() -> Schedule {
        "2021-05-04\tAcme\thttps://acme.example/".parse().unwrap()
    }

    fn empty_schedule() -> Schedule {
        "".parse().unwrap()
    }

    fn select(schedule: &Schedule, causes: &dyn CauseSource, draw: &mut dyn Draw) -> ContentDecision {
        Selector {
            schedule,
            causes,
            draw,
            promotion_odds: 10,
            cause_odds: 10,
        }
        .select(today())
    }

    #[test]
    fn test_booked_placement_beats_every_draw() {
        let schedule = booked_schedule();
        // A draw that would otherwise hit promotion, then cause, must not
        // even be consulted.
        for draw in &mut [
            ScriptedDraw::promotion(),
            ScriptedDraw::cause(),
            ScriptedDraw::fallthrough(),
        ] {
            match select(&schedule, &FixedCause, draw) {
                ContentDecision::Placement { label, target } => {
                    assert_eq!("Acme", label);
                    assert_eq!("https://acme.example/", target.as_str());
                }
                other => panic!("expected Placement, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_fallback_outcomes_are_each_reachable() {
        let schedule = empty_schedule();
        assert_eq!(
            ContentDecision::Promotion,
            select(&schedule, &FixedCause, &mut ScriptedDraw::promotion()),
        );
        assert_eq!(
            ContentDecision::Cause {
                label: "Clean Water".to_owned(),
                page: "water.html".to_owned(),
            },
            select(&schedule, &FixedCause, &mut ScriptedDraw::cause()),
        );
        assert_eq!(
            ContentDecision::Default,
            select(&schedule, &FixedCause, &mut ScriptedDraw::fallthrough()),
        );
    }

    #[test]
    fn test_failing_cause_selector_degrades_to_default() {
        assert_eq!(
            ContentDecision::Default,
            select(&empty_schedule(), &FailingCause, &mut ScriptedDraw::cause()),
        );
    }

    #[test]
    fn test_absent_cause_degrades_to_default() {
        let causes: Option<crate::cause::CommandCauseSource> = None;
        assert_eq!(
            ContentDecision::Default,
            select(&empty_schedule(), &causes, &mut ScriptedDraw::cause()),
        );
    }

    #[test]
    fn test_zero_odds_never_hit() {
        let mut draw = RandomDraw;
        assert!(!draw.one_in(0));
    }
}
