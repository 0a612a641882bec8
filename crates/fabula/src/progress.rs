//! Progress reporting for the CLI.

use async_trait::async_trait;
use fabula_core::BookId;
use fabula_interface::ProgressSink;
use tracing::info;

/// Progress sink that reports milestones through tracing.
///
/// A deployment serving HTTP polling would persist these instead; the
/// book record itself also carries the latest step and percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

#[async_trait]
impl ProgressSink for LogProgress {
    async fn set_progress(&self, book_id: &BookId, step: &str, percent: u8) {
        info!(book_id = %book_id, percent, step, "Progress");
    }
}
