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

//! Defines the types for polling error policies.
//!
//! The polling loop needs to (1) distinguish between transient and permanent
//! errors, and (2) limit how long the loop may run. Implement the
//! [PollingErrorPolicy] trait to customize the loop behavior, or use the
//! implementations in this module.
//!
//! # Example
//! ```
//! # use longrun_gax::polling_error_policy::*;
//! use std::time::Duration;
//! // Poll for at most 15 minutes or at most 50 attempts: whichever limit is
//! // reached first stops the polling loop.
//! let policy = TransientOnly
//!     .with_time_limit(Duration::from_secs(15 * 60))
//!     .with_attempt_limit(50);
//! ```

use crate::error::Error;
use crate::loop_state::LoopState;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Determines how errors are handled in the polling loop.
///
/// Implementations of this trait determine if polling errors may resolve in
/// future attempts, and for how long the polling loop may continue.
pub trait PollingErrorPolicy: Send + Sync + std::fmt::Debug {
    /// Queries the policy after a failed poll attempt.
    ///
    /// # Parameters
    /// * `loop_start` - when the polling loop started.
    /// * `attempt_count` - the number of poll attempts so far, always
    ///   non-zero when this method is called.
    /// * `error` - the error in the last poll attempt.
    fn on_error(&self, loop_start: Instant, attempt_count: u32, error: Error) -> LoopState;

    /// Called when the operation was successfully polled, but is still in
    /// progress.
    ///
    /// Returning an error stops the polling loop. The default implementation
    /// never stops the loop.
    fn on_in_progress(
        &self,
        _loop_start: Instant,
        _attempt_count: u32,
        _operation_name: &str,
    ) -> Option<Error> {
        None
    }
}

/// A helper type to use [PollingErrorPolicy] in client configuration.
#[derive(Clone)]
pub struct PollingErrorPolicyArg(pub(crate) Arc<dyn PollingErrorPolicy>);

impl<T: PollingErrorPolicy + 'static> std::convert::From<T> for PollingErrorPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingErrorPolicy>> for PollingErrorPolicyArg {
    fn from(value: Arc<dyn PollingErrorPolicy>) -> Self {
        Self(value)
    }
}

/// Extension trait for [PollingErrorPolicy].
pub trait PollingErrorPolicyExt: PollingErrorPolicy + Sized {
    /// Decorates a [PollingErrorPolicy] to limit the total elapsed time in
    /// the polling loop.
    ///
    /// While the time spent in the polling loop (including time in backoff)
    /// is less than the prescribed duration, the decorated policy returns the
    /// results of the inner policy. After that, retryable errors and
    /// in-progress operations stop the loop with a timeout-kind error.
    fn with_time_limit(self, maximum_duration: Duration) -> LimitedElapsedTime<Self> {
        LimitedElapsedTime::custom(self, maximum_duration)
    }

    /// Decorates a [PollingErrorPolicy] to limit the number of poll attempts.
    ///
    /// The decorated policy passes through the results of the inner policy as
    /// long as `attempt_count < maximum_attempts`. Once the maximum number of
    /// attempts is reached, retryable errors and in-progress operations stop
    /// the loop with an exhausted-kind error.
    fn with_attempt_limit(self, maximum_attempts: u32) -> LimitedAttemptCount<Self> {
        LimitedAttemptCount::custom(self, maximum_attempts)
    }
}

impl<T: PollingErrorPolicy> PollingErrorPolicyExt for T {}

/// The error reported when a polling budget runs out.
///
/// The polling loop wraps this type in a [timeout][Error::is_timeout] error
/// when the elapsed time budget runs out, and in an
/// [exhausted][Error::is_exhausted] error when the attempt budget runs out.
#[derive(Debug, thiserror::Error)]
#[error("polling loop for `{operation}` exceeded its {limit} budget: {actual} vs. {maximum}")]
pub struct Exhausted {
    operation: String,
    limit: &'static str,
    actual: String,
    maximum: String,
}

impl Exhausted {
    pub(crate) fn new<O, A, M>(operation: O, limit: &'static str, actual: A, maximum: M) -> Self
    where
        O: Into<String>,
        A: Into<String>,
        M: Into<String>,
    {
        Self {
            operation: operation.into(),
            limit,
            actual: actual.into(),
            maximum: maximum.into(),
        }
    }
}

/// A polling policy that only continues on transient errors.
///
/// The policy continues on timeouts, transport interruptions, and on service
/// errors with an `UNAVAILABLE` or `DEADLINE_EXCEEDED` status code. All other
/// errors are treated as permanent.
///
/// This policy must be decorated to limit the number of polling attempts or
/// the duration of the polling loop.
///
/// # Example
/// ```
/// # use longrun_gax::polling_error_policy::*;
/// use std::time::Instant;
/// let policy = TransientOnly.with_attempt_limit(3);
/// let attempt_count = 4;
/// assert!(policy.on_error(Instant::now(), attempt_count, transient_error()).is_exhausted());
///
/// use longrun_gax::error::{Error, rpc::Code, rpc::Status};
/// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
/// ```
#[derive(Clone, Debug)]
pub struct TransientOnly;

impl PollingErrorPolicy for TransientOnly {
    fn on_error(&self, _loop_start: Instant, _attempt_count: u32, error: Error) -> LoopState {
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

/// A polling policy that continues on any error.
///
/// This policy must be decorated to limit the number of polling attempts or
/// the duration of the polling loop.
///
/// # Example
/// ```
/// # use longrun_gax::polling_error_policy::*;
/// use std::time::Instant;
/// let policy = AlwaysContinue;
/// assert!(policy.on_error(Instant::now(), 1, permanent_error()).is_continue());
///
/// use longrun_gax::error::{Error, rpc::Code, rpc::Status};
/// fn permanent_error() -> Error { Error::service(Status::default().set_code(Code::Aborted)) }
/// ```
#[derive(Clone, Debug)]
pub struct AlwaysContinue;

impl PollingErrorPolicy for AlwaysContinue {
    fn on_error(&self, _loop_start: Instant, _attempt_count: u32, error: Error) -> LoopState {
        LoopState::Continue(error)
    }
}

/// A polling policy decorator that limits the total time in the polling loop.
///
/// Exhausting this policy surfaces as a [timeout][Error::is_timeout] error:
/// from the application's perspective the overall polling deadline expired.
///
/// # Parameters
/// * `P` - the inner polling policy, defaults to [TransientOnly].
#[derive(Debug)]
pub struct LimitedElapsedTime<P = TransientOnly>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_duration: Duration,
}

impl LimitedElapsedTime {
    /// Creates a new instance, with the default inner policy.
    ///
    /// # Example
    /// ```
    /// # use longrun_gax::polling_error_policy::*;
    /// use std::time::{Duration, Instant};
    /// let policy = LimitedElapsedTime::new(Duration::from_secs(10));
    /// let start = Instant::now() - Duration::from_secs(20);
    /// assert!(policy.on_error(start, 1, transient_error()).is_exhausted());
    ///
    /// use longrun_gax::error::{Error, rpc::Code, rpc::Status};
    /// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
    /// ```
    pub fn new(maximum_duration: Duration) -> Self {
        Self {
            inner: TransientOnly,
            maximum_duration,
        }
    }
}

impl<P> LimitedElapsedTime<P>
where
    P: PollingErrorPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_duration: Duration) -> Self {
        Self {
            inner,
            maximum_duration,
        }
    }

    fn in_progress_impl(&self, start: Instant, operation_name: &str) -> Option<Error> {
        let now = Instant::now();
        if now < start + self.maximum_duration {
            return None;
        }
        Some(Error::timeout(Exhausted::new(
            operation_name,
            "elapsed time",
            format!("{:?}", now.saturating_duration_since(start)),
            format!("{:?}", self.maximum_duration),
        )))
    }
}

impl<P> PollingErrorPolicy for LimitedElapsedTime<P>
where
    P: PollingErrorPolicy + 'static,
{
    fn on_error(&self, start: Instant, count: u32, error: Error) -> LoopState {
        match self.inner.on_error(start, count, error) {
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

    fn on_in_progress(&self, start: Instant, count: u32, operation_name: &str) -> Option<Error> {
        self.inner
            .on_in_progress(start, count, operation_name)
            .or_else(|| self.in_progress_impl(start, operation_name))
    }
}

/// A polling policy decorator that limits the number of attempts.
///
/// Note that the policy is queried only after a poll attempt, so setting the
/// maximum number of attempts to 0 or 1 results in no polling after the
/// first query.
///
/// # Parameters
/// * `P` - the inner polling policy, defaults to [TransientOnly].
#[derive(Debug)]
pub struct LimitedAttemptCount<P = TransientOnly>
where
    P: PollingErrorPolicy,
{
    inner: P,
    maximum_attempts: u32,
}

impl LimitedAttemptCount {
    /// Creates a new instance, with the default inner policy.
    ///
    /// # Example
    /// ```
    /// # use longrun_gax::polling_error_policy::*;
    /// use std::time::Instant;
    /// let policy = LimitedAttemptCount::new(5);
    /// let attempt_count = 10;
    /// assert!(policy.on_error(Instant::now(), attempt_count, transient_error()).is_exhausted());
    ///
    /// use longrun_gax::error::{Error, rpc::Code, rpc::Status};
    /// fn transient_error() -> Error { Error::service(Status::default().set_code(Code::Unavailable)) }
    /// ```
    pub fn new(maximum_attempts: u32) -> Self {
        Self {
            inner: TransientOnly,
            maximum_attempts,
        }
    }
}

impl<P> LimitedAttemptCount<P>
where
    P: PollingErrorPolicy,
{
    /// Creates a new instance with a custom inner policy.
    pub fn custom(inner: P, maximum_attempts: u32) -> Self {
        Self {
            inner,
            maximum_attempts,
        }
    }
}

impl<P> PollingErrorPolicy for LimitedAttemptCount<P>
where
    P: PollingErrorPolicy + 'static,
{
    fn on_error(&self, start: Instant, count: u32, error: Error) -> LoopState {
        match self.inner.on_error(start, count, error) {
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

    fn on_in_progress(&self, start: Instant, count: u32, operation_name: &str) -> Option<Error> {
        self.inner
            .on_in_progress(start, count, operation_name)
            .or_else(|| {
                if count < self.maximum_attempts {
                    return None;
                }
                Some(Error::exhausted(Exhausted::new(
                    operation_name,
                    "attempt count",
                    format!("{count}"),
                    format!("{}", self.maximum_attempts),
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::rpc::{Code, Status};
    use test_case::test_case;

    fn service_error(code: Code) -> Error {
        Error::service(Status::default().set_code(code).set_message("test-only"))
    }

    #[test_case(service_error(Code::Unavailable), true)]
    #[test_case(service_error(Code::DeadlineExceeded), true)]
    #[test_case(Error::timeout("request deadline"), true)]
    #[test_case(Error::io("broken connection"), true)]
    #[test_case(service_error(Code::NotFound), false)]
    #[test_case(service_error(Code::PermissionDenied), false)]
    #[test_case(service_error(Code::Unauthenticated), false)]
    #[test_case(service_error(Code::Unimplemented), false)]
    #[test_case(service_error(Code::Internal), false)]
    #[test_case(Error::deser("bad payload"), false)]
    fn transient_only(error: Error, retryable: bool) {
        let got = TransientOnly.on_error(Instant::now(), 1, error);
        assert_eq!(got.is_continue(), retryable, "{got:?}");
        assert_eq!(got.is_permanent(), !retryable, "{got:?}");
    }

    #[test]
    fn transient_only_in_progress() {
        let got = TransientOnly.on_in_progress(Instant::now(), 1, "op/001");
        assert!(got.is_none(), "{got:?}");
    }

    #[test]
    fn always_continue() {
        let got = AlwaysContinue.on_error(Instant::now(), 1, service_error(Code::Aborted));
        assert!(got.is_continue(), "{got:?}");
    }

    #[test]
    fn limited_elapsed_time_within_budget() {
        let policy = LimitedElapsedTime::new(Duration::from_secs(60));
        let got = policy.on_error(Instant::now(), 1, service_error(Code::Unavailable));
        assert!(got.is_continue(), "{got:?}");
        let got = policy.on_in_progress(Instant::now(), 1, "op/001");
        assert!(got.is_none(), "{got:?}");
    }

    #[test]
    fn limited_elapsed_time_expired() {
        let policy = LimitedElapsedTime::new(Duration::from_secs(10));
        let start = Instant::now() - Duration::from_secs(20);
        let got = policy.on_error(start, 1, service_error(Code::Unavailable));
        assert!(got.is_exhausted(), "{got:?}");

        let err = policy
            .on_in_progress(start, 1, "op/001")
            .expect("expired budget reports an error");
        assert!(err.is_timeout(), "{err:?}");
        assert!(format!("{err}").contains("op/001"), "{err}");
    }

    #[test]
    fn limited_elapsed_time_permanent_passthrough() {
        let policy = LimitedElapsedTime::new(Duration::from_secs(10));
        let start = Instant::now() - Duration::from_secs(20);
        let got = policy.on_error(start, 1, service_error(Code::PermissionDenied));
        assert!(got.is_permanent(), "{got:?}");
    }

    #[test]
    fn limited_attempt_count() {
        let policy = LimitedAttemptCount::new(3);
        let now = Instant::now();
        for count in 1..3 {
            let got = policy.on_error(now, count, service_error(Code::Unavailable));
            assert!(got.is_continue(), "{count} => {got:?}");
        }
        let got = policy.on_error(now, 3, service_error(Code::Unavailable));
        assert!(got.is_exhausted(), "{got:?}");
    }

    #[test]
    fn limited_attempt_count_in_progress() {
        let policy = LimitedAttemptCount::new(2);
        let now = Instant::now();
        assert!(policy.on_in_progress(now, 1, "op/001").is_none());
        let err = policy
            .on_in_progress(now, 2, "op/001")
            .expect("expired budget reports an error");
        assert!(err.is_exhausted(), "{err:?}");
        let source = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<Exhausted>());
        assert!(source.is_some(), "{err:?}");
    }

    #[test]
    fn decorator_stacking() {
        let policy = AlwaysContinue
            .with_time_limit(Duration::from_secs(10))
            .with_attempt_limit(5);
        let start = Instant::now() - Duration::from_secs(20);
        let got = policy.on_error(start, 1, service_error(Code::Aborted));
        assert!(got.is_exhausted(), "{got:?}");

        let got = policy.on_error(Instant::now(), 10, service_error(Code::Aborted));
        assert!(got.is_exhausted(), "{got:?}");
    }
}
