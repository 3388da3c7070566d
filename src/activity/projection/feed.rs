//! Display-side feed projection over the raw activity sequence.
//!
//! The projection is a pure function of its input and options: it never
//! mutates the log, never reorders it, and is safe to reapply (idempotent).
//! Collapsing near-duplicate bursts here keeps the write side honest — every
//! event is still recorded, the feed just hides the noise.

use crate::activity::domain::{Activity, ActivityAction};
use chrono::Duration;
use std::collections::HashSet;

/// Window within which consecutive same-action records collapse.
pub const DEDUP_WINDOW_SECONDS: i64 = 60;

/// Display options for the feed projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    /// When set, records whose action is in [`FeedOptions::unimportant`] are
    /// dropped from the feed.
    pub hide_unimportant: bool,
    /// Action kinds considered noise when the display toggle is on.
    pub unimportant: HashSet<ActivityAction>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            hide_unimportant: false,
            unimportant: HashSet::from([
                ActivityAction::AttachmentDeleted,
                ActivityAction::TaskAttachmentsUploaded,
            ]),
        }
    }
}

impl FeedOptions {
    /// Returns options with the unimportant-action filter enabled.
    #[must_use]
    pub fn hiding_unimportant() -> Self {
        Self {
            hide_unimportant: true,
            ..Self::default()
        }
    }
}

/// Projects the ordered activity sequence into its display form.
///
/// A record is suppressed when the immediately preceding *kept* record has
/// the identical action and the time delta between them is at most
/// [`DEDUP_WINDOW_SECONDS`]. With the `hide_unimportant` toggle on, records
/// whose action is in the configured set are dropped before deduplication.
#[must_use]
pub fn project(activities: &[Activity], options: &FeedOptions) -> Vec<Activity> {
    let mut kept: Vec<Activity> = Vec::with_capacity(activities.len());

    for activity in activities {
        if options.hide_unimportant && options.unimportant.contains(&activity.action()) {
            continue;
        }
        if let Some(previous) = kept.last() {
            let delta = activity.created_at() - previous.created_at();
            if previous.action() == activity.action()
                && delta <= Duration::seconds(DEDUP_WINDOW_SECONDS)
            {
                continue;
            }
        }
        kept.push(activity.clone());
    }

    kept
}
