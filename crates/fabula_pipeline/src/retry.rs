//! Bounded fixed-delay retries for asset generation.

use fabula_error::{FabulaResult, PipelineError, PipelineErrorKind};
use std::future::Future;
use std::time::Duration;

/// Retry policy for a single asset: a fixed number of attempts with a
/// fixed delay between them.
///
/// Image generation failures are treated uniformly; there is no
/// retryable/permanent distinction, matching how the service degrades in
/// practice (quota blips and content refusals look the same to us).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// Emits one tracing event per attempt. After the final failure the last
/// error is wrapped in a retries-exhausted pipeline error naming `label`.
pub async fn retry_asset<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> FabulaResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FabulaResult<T>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        tracing::debug!(label, attempt, max = policy.max_attempts, "Generating asset");

        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(label, attempt, "Asset generation recovered");
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(label, attempt, error = %e, "Asset generation attempt failed");
                last_error = Some(e);
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    let detail = match last_error {
        Some(e) => format!("{label} after {} attempts: {e}", policy.max_attempts),
        None => format!("{label} after {} attempts", policy.max_attempts),
    };
    Err(PipelineError::new(PipelineErrorKind::RetriesExhausted(detail)).into())
}
