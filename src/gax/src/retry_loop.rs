// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The retry loop shared by the client implementations.
//!
//! This module is not part of the public API. Types and functions in this
//! module may be changed or removed without notice.

use crate::Result;
use crate::backoff_policy::BackoffPolicy;
use crate::loop_state::LoopState;
use crate::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs the retry loop for a given function.
///
/// This function calls `inner` until (1) the call succeeds, or (2) the retry
/// policy reports the last error as permanent, or (3) the retry policy is
/// exhausted. In between attempts it waits the period prescribed by the
/// backoff policy, using `sleep` to implement the wait. Injecting `sleep`
/// keeps the loop testable without a runtime clock.
pub async fn retry_loop<F, S, Response>(
    mut inner: F,
    sleep: S,
    idempotent: bool,
    retry_policy: Arc<dyn RetryPolicy>,
    backoff_policy: Arc<dyn BackoffPolicy>,
) -> Result<Response>
where
    F: AsyncFnMut() -> Result<Response> + Send,
    S: AsyncFn(Duration) -> () + Send,
{
    let loop_start = Instant::now();
    let mut attempt_count = 0_u32;
    loop {
        attempt_count += 1;
        let error = match inner().await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        match retry_policy.on_error(loop_start, attempt_count, idempotent, error) {
            LoopState::Permanent(e) | LoopState::Exhausted(e) => return Err(e),
            LoopState::Continue(e) => {
                let delay = backoff_policy.on_failure(attempt_count);
                tracing::debug!(
                    "retrying after attempt {attempt_count} failed with transient error ({e}), backing off for {delay:?}"
                );
                sleep(delay).await;
            }
        }
    }
}
