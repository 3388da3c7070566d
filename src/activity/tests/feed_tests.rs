//! Unit tests for the deduplicating feed projection.

use super::{note_payload, record_at, status_payload};
use crate::activity::{
    domain::{Activity, ActivityAction, ActivityPayload},
    projection::{FeedOptions, project},
};
use crate::task::domain::{AttachmentId, TaskStatus};
use eyre::ensure;
use rstest::rstest;

fn ids(activities: &[Activity]) -> Vec<i64> {
    activities.iter().map(|activity| activity.id().value()).collect()
}

#[rstest]
fn empty_log_projects_to_empty_feed() {
    assert!(project(&[], &FeedOptions::default()).is_empty());
}

#[rstest]
fn distinct_actions_all_survive() -> eyre::Result<()> {
    let log = vec![
        record_at(1, status_payload(TaskStatus::Preparing, TaskStatus::Ready), 0),
        record_at(2, note_payload("arrived"), 5),
        record_at(
            3,
            status_payload(TaskStatus::Ready, TaskStatus::InProgress),
            10,
        ),
    ];

    let feed = project(&log, &FeedOptions::default());

    ensure!(ids(&feed) == vec![1, 2, 3]);
    Ok(())
}

#[rstest]
fn burst_of_same_action_collapses_to_first() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("first"), 0),
        record_at(2, note_payload("second"), 20),
        record_at(3, note_payload("third"), 40),
    ];

    let feed = project(&log, &FeedOptions::default());

    ensure!(ids(&feed) == vec![1]);
    Ok(())
}

#[rstest]
fn delta_of_exactly_sixty_seconds_still_suppresses() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("first"), 0),
        record_at(2, note_payload("second"), 60),
    ];

    let feed = project(&log, &FeedOptions::default());

    ensure!(ids(&feed) == vec![1]);
    Ok(())
}

#[rstest]
fn delta_beyond_the_window_keeps_both() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("first"), 0),
        record_at(2, note_payload("second"), 61),
    ];

    let feed = project(&log, &FeedOptions::default());

    ensure!(ids(&feed) == vec![1, 2]);
    Ok(())
}

// The window is measured against the last KEPT record, so a slow drip of
// same-action records collapses into one as long as each gap stays inside
// the window relative to the survivor.
#[rstest]
fn window_anchors_on_the_last_kept_record() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("a"), 0),
        record_at(2, note_payload("b"), 50),
        record_at(3, note_payload("c"), 100),
    ];

    let feed = project(&log, &FeedOptions::default());

    // Record 2 is suppressed (50s from record 1); record 3 is 100s from the
    // kept record 1, outside the window, so it survives.
    ensure!(ids(&feed) == vec![1, 3]);
    Ok(())
}

#[rstest]
fn interleaved_action_resets_the_burst() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("a"), 0),
        record_at(2, status_payload(TaskStatus::Ready, TaskStatus::InProgress), 10),
        record_at(3, note_payload("b"), 20),
    ];

    let feed = project(&log, &FeedOptions::default());

    ensure!(ids(&feed) == vec![1, 2, 3]);
    Ok(())
}

#[rstest]
fn projection_is_idempotent() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("a"), 0),
        record_at(2, note_payload("b"), 10),
        record_at(3, status_payload(TaskStatus::Ready, TaskStatus::InProgress), 20),
        record_at(4, note_payload("c"), 120),
    ];
    let options = FeedOptions::default();

    let once = project(&log, &options);
    let twice = project(&once, &options);

    ensure!(once == twice);
    Ok(())
}

#[rstest]
fn unimportant_actions_survive_by_default() -> eyre::Result<()> {
    let log = vec![record_at(
        1,
        ActivityPayload::AttachmentDeleted {
            attachment_id: AttachmentId::new(),
        },
        0,
    )];

    let feed = project(&log, &FeedOptions::default());

    ensure!(ids(&feed) == vec![1]);
    Ok(())
}

#[rstest]
fn hiding_unimportant_drops_attachment_noise() -> eyre::Result<()> {
    let log = vec![
        record_at(1, status_payload(TaskStatus::Preparing, TaskStatus::Ready), 0),
        record_at(
            2,
            ActivityPayload::AttachmentDeleted {
                attachment_id: AttachmentId::new(),
            },
            10,
        ),
        record_at(
            3,
            ActivityPayload::TaskAttachmentsUploaded {
                attachments: Vec::new(),
            },
            20,
        ),
        record_at(4, note_payload("still here"), 30),
    ];

    let feed = project(&log, &FeedOptions::hiding_unimportant());

    ensure!(ids(&feed) == vec![1, 4]);
    Ok(())
}

// Hiding happens before deduplication: two same-action records separated
// only by hidden noise still collapse.
#[rstest]
fn hidden_records_do_not_break_a_burst() -> eyre::Result<()> {
    let log = vec![
        record_at(1, note_payload("a"), 0),
        record_at(
            2,
            ActivityPayload::AttachmentDeleted {
                attachment_id: AttachmentId::new(),
            },
            10,
        ),
        record_at(3, note_payload("b"), 20),
    ];

    let feed = project(&log, &FeedOptions::hiding_unimportant());

    ensure!(ids(&feed) == vec![1]);
    Ok(())
}

#[rstest]
fn custom_unimportant_set_is_honoured() -> eyre::Result<()> {
    let options = FeedOptions {
        hide_unimportant: true,
        unimportant: std::collections::HashSet::from([ActivityAction::TaskCheckedIn]),
    };
    let log = vec![
        record_at(1, note_payload("hidden"), 0),
        record_at(
            2,
            ActivityPayload::AttachmentDeleted {
                attachment_id: AttachmentId::new(),
            },
            10,
        ),
    ];

    let feed = project(&log, &options);

    ensure!(ids(&feed) == vec![2]);
    Ok(())
}
