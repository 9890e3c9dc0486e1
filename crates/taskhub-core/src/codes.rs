//! Unique human-readable code generation (`PROJ-####`, `TASK-####`).
//!
//! The generator only reads: it probes a caller-supplied existence predicate
//! and leaves persistence to the caller. Two concurrent creations can both
//! pass the probe with the same suffix, so the storage-layer UNIQUE index is
//! the backstop and creation services retry on an insert-time collision.

use std::future::Future;

use chrono::Utc;
use rand::Rng;
use taskhub_storage::StoreError;

use crate::error::CoreResult;

pub const PROJECT_CODE_PREFIX: &str = "PROJ";
pub const TASK_CODE_PREFIX: &str = "TASK";

/// Existence probes before giving up on random suffixes.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Full generate-and-insert rounds a creation service attempts when the
/// UNIQUE index rejects a code that passed the probe.
pub(crate) const CODE_INSERT_RETRIES: usize = 3;

/// Generate a `{PREFIX}-{4 digits}` code not currently in use, drawing a new
/// random suffix (1000..=9999) for up to [`MAX_CODE_ATTEMPTS`] probes. If all
/// probes collide, fall back to the lowest six digits of the current unix
/// millisecond timestamp, near-certainly unique and deliberately accepted
/// without a final existence check.
pub async fn generate_code<F, Fut>(prefix: &str, exists: F) -> CoreResult<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<bool, StoreError>>,
{
    for _ in 0..MAX_CODE_ATTEMPTS {
        let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
        let code = format!("{prefix}-{suffix}");
        if !exists(code.clone()).await? {
            return Ok(code);
        }
    }
    Ok(timestamp_code(prefix, Utc::now().timestamp_millis()))
}

fn timestamp_code(prefix: &str, now_ms: i64) -> String {
    let digits = now_ms.to_string();
    let tail = &digits[digits.len().saturating_sub(6)..];
    format!("{prefix}-{tail}")
}
