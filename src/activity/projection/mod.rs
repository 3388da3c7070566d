//! Read-side projections computed from the immutable log.

mod feed;

pub use feed::{DEDUP_WINDOW_SECONDS, FeedOptions, project};
