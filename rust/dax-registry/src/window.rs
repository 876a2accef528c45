//! Access windows.

use std::{
    fmt,
    ops::{Bound, RangeBounds},
};

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// The span of time during which a grant is active.
///
/// Both sides are inclusive. A side equal to [`Timestamp::UNBOUNDED`] is
/// open, so `AccessWindow::new(0, 0)` admits every instant. Nothing forces
/// `start <= end`; an inverted window admits no instant at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessWindow {
    /// First instant the window admits, or unbounded when zero.
    pub start: Timestamp,

    /// Last instant the window admits, or unbounded when zero.
    pub end: Timestamp,
}

impl AccessWindow {
    /// A window open on both sides.
    pub const UNBOUNDED: Self = Self {
        start: Timestamp::UNBOUNDED,
        end: Timestamp::UNBOUNDED,
    };

    /// A window from `start` to `end`, either of which may be
    /// [`Timestamp::UNBOUNDED`].
    #[must_use]
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `at` falls inside the window.
    pub fn contains(&self, at: Timestamp) -> bool {
        <Self as RangeBounds<Timestamp>>::contains(self, &at)
    }

    /// Returns `true` if both sides are set and the start lies after the
    /// end, meaning the window can never admit anything.
    pub fn is_inverted(&self) -> bool {
        !self.start.is_unbounded() && !self.end.is_unbounded() && self.start > self.end
    }
}

fn side(timestamp: &Timestamp) -> Bound<&Timestamp> {
    if timestamp.is_unbounded() {
        Bound::Unbounded
    } else {
        Bound::Included(timestamp)
    }
}

impl RangeBounds<Timestamp> for AccessWindow {
    fn start_bound(&self) -> Bound<&Timestamp> {
        side(&self.start)
    }

    fn end_bound(&self) -> Bound<&Timestamp> {
        side(&self.end)
    }
}

impl fmt::Display for AccessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Bound::Included(start) = self.start_bound() {
            write!(f, "{start}")?;
        }
        write!(f, "..")?;
        match self.end_bound() {
            Bound::Included(end) => write!(f, "={end}"),
            _ => Ok(()),
        }
    }
}
