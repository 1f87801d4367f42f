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

//! Defines the types for unary-call retry policies.
//!
//! Retry policies decide whether a failed request attempt may be tried again.
//! They are distinct from [polling error policies]
//! [crate::polling_error_policy]: a retry policy governs a single logical
//! request, while a polling policy governs the long-running operation loop.
//!
//! # Example
//! ```
//! # use longrun_gax::retry_policy::*;
//! // Retry transient errors, at most 3 attempts.
//! let policy = TransientErrors.with_attempt_limit(3);
//! ```

use crate::error::Error;
use crate::loop_state::LoopState;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Determines how errors are handled in the retry loop.
pub trait RetryPolicy: Send + Sync + std::fmt::Debug {
    /// Queries the policy after a failed request attempt.
    ///
    /// # Parameters
    /// * `loop_start` - when the retry loop started.
    /// * `attempt_count` - the number of attempts, including the initial one.
    /// * `idempotent` - whether the request is safe to send more than once.
    /// * `error` - the error in the last attempt.
    fn on_error(
        &self,
        loop_start: Instant,
        attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> LoopState;
}

/// A helper type to use [RetryPolicy] in client configuration.
#[derive(Clone)]
pub struct RetryPolicyArg(pub(crate) Arc<dyn RetryPolicy>);

impl<T: RetryPolicy + 'static> std::convert::From<T> for RetryPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn RetryPolicy>> for RetryPolicyArg {
    fn from(value: Arc<dyn RetryPolicy>) -> Self {
        Self(value)
    }
}

/// Extension trait for [RetryPolicy].
pub trait RetryPolicyExt: RetryPolicy + Sized {
    /// Decorates a [RetryPolicy] to limit the total elapsed time in the
    /// retry loop.
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Decorates a [RetryPolicy] to limit the number of attempts.
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: RetryPolicy> RetryPolicyExt for T {}

/// A retry policy that retries transient errors on idempotent requests.
///
/// Timeouts, transport interruptions, and service errors with an
/// `UNAVAILABLE` or `DEADLINE_EXCEEDED` status code are considered
/// transient. Transient errors on non-idempotent requests are not retried:
/// the request may have started executing in the service.
#[derive(Clone, Debug)]
pub struct TransientErrors;

impl RetryPolicy for TransientErrors {
    fn on_error(
        &self,
        _loop_start: Instant,
        _attempt_count: u32,
        idempotent: bool,
        error: Error,
    ) -> LoopState {
        if !idempotent {
            return LoopState::Permanent(error);
        }
        if error.is_timeout() || error.is_io() {
            return LoopState::Continue(error);
        }
        match error.status().map(|s| s.code) {
            Some(crate::error::rpc::Code::Unavailable)
            | Some(crate::error::rpc::Code::DeadlineExceeded) => LoopState::Continue(error),
            _ => LoopState::Permanent(error),
        }
    }
}

/// A retry policy decorator that limits the total time in the retry loop.
///
/// # Parameters
/// * `P` - the inner retry policy, defaults to [TransientErrors].
#[derive(Debug)]
pub struct LimitedElapsedTime<P = TransientErrors>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_duration: Duration) -> Self {
        Self {
            inner: TransientErrors,
            maximum_duration,
        }
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: RetryPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }
}

impl<P> RetryPolicy for LimitedElapsedTime<P>
where
    P: RetryPolicy + 'static,
{
    fn on_error(&self, start: Instant, count: u32, idempotent: bool, error: Error) -> LoopState {
        match self.inner.on_error(start, count, idempotent, error) {
            LoopState::Permanent(e) => LoopState::Permanent(e),
            LoopState::Exhausted(e) => LoopState::Exhausted(e),
            LoopState::Continue(e) => {
                if Instant::now() >= start + self.maximum_duration {
                    LoopState::Exhausted(e)
                } else {
                    LoopState::Continue(e)
                }
            }
        }
    }
}

/// A retry policy decorator that limits the number of attempts.
///
/// # Parameters
/// * `P` - the inner retry policy, defaults to [TransientErrors].
#[derive(Debug)]
pub struct LimitedAttemptCount<P = TransientErrors>
where
    P: RetryPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Creates a new instance, with the default inner policy.
    pub fn new(maximum_attempts: u32) -> Self {
        Self {
            inner: TransientErrors,
            maximum_attempts,
        }
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: RetryPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> RetryPolicy for LimitedAttemptCount<P>
where
    P: RetryPolicy + 'static,
{
    fn on_error(&self, start: Instant, count: u32, idempotent: bool, error: Error) -> LoopState {
        match self.inner.on_error(start, count, idempotent, error) {
            LoopState::Permanent(e) => LoopState::Permanent(e),
            LoopState::Exhausted(e) => LoopState::Exhausted(e),
            LoopState::Continue(e) => {
                if count >= self.maximum_attempts {
                    LoopState::Exhausted(e)
                } else {
                    LoopState::Continue(e)
                }
            }
        }
    }
}
