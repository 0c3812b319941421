//! Story use-case services.
//!
//! # Responsibility
//! - Orchestrate board calls into projection, extraction and publish APIs.
//! - Keep canvas platform details out of callers.

pub mod extraction;
pub mod projection;
pub mod publish;

use crate::board::{Board, NoticeLevel};
use crate::error::StoryError;
use log::warn;

/// Shows `err` to the author as an error notice.
///
/// A notice the board refuses is logged and dropped; `err` stays the result.
pub(crate) fn notify_failure<B: Board>(board: &mut B, module: &str, err: &StoryError) {
    if let Err(notice_err) = board.notify(NoticeLevel::Error, &err.to_string()) {
        warn!(
            "event=notice_failed module={} status=error error={}",
            module, notice_err
        );
    }
}
