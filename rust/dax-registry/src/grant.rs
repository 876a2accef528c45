use serde::{Deserialize, Serialize};

use crate::{AccessWindow, Timestamp};

/// The authorization record every subject has.
///
/// Subjects that were never granted, and subjects that were revoked, hold
/// the default record: not authorized, unbounded window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrant {
    /// Whether the subject currently holds a grant.
    pub authorized: bool,

    /// When the grant is active.
    #[serde(flatten)]
    pub window: AccessWindow,
}

impl AccessGrant {
    /// The record of a subject without a grant.
    pub const REVOKED: Self = Self {
        authorized: false,
        window: AccessWindow::UNBOUNDED,
    };

    /// A grant active during `window`.
    pub const fn granted(window: AccessWindow) -> Self {
        Self {
            authorized: true,
            window,
        }
    }

    /// Returns `true` if the grant authorizes its subject at `at`.
    pub fn is_active_at(&self, at: Timestamp) -> bool {
        self.authorized && self.window.contains(at)
    }
}
