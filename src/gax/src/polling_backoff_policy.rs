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

//! Defines the trait for polling backoff policies.
//!
//! The client can automatically poll long-running operations until
//! completion. When doing so it backs off between poll attempts to avoid
//! overloading the service.
//!
//! These policies should not be confused with retry backoff policies. Their
//! purpose is different, and their implementation is too. Notably, polling
//! backoff policies should not use jitter, while retry policies should.
//!
//! The most common implementation is truncated [exponential backoff]
//! **without** jitter: the wait period grows exponentially with the attempt
//! count until some limit is reached. This works well when the expected
//! execution time of the operation is not known in advance.
//!
//! # Example
//! ```
//! # use longrun_gax::exponential_backoff::{Error, ExponentialBackoffBuilder};
//! use std::time::Duration;
//!
//! let policy = ExponentialBackoffBuilder::new()
//!     .with_initial_delay(Duration::from_millis(100))
//!     .with_maximum_delay(Duration::from_secs(5))
//!     .with_scaling(4.0)
//!     .build()?;
//! // `policy` implements the `PollingBackoffPolicy` trait.
//! # Ok::<(), Error>(())
//! ```
//!
//! [Exponential backoff]: https://en.wikipedia.org/wiki/Exponential_backoff

use std::sync::Arc;
use std::time::Duration;

/// Defines the trait implemented by all polling backoff strategies.
pub trait PollingBackoffPolicy: Send + Sync + std::fmt::Debug {
    /// Returns the wait period before the next poll attempt.
    ///
    /// # Parameters
    /// * `attempt_count` - the number of poll queries so far. This method is
    ///   always called after the first attempt, so the value is non-zero.
    fn wait_period(&self, attempt_count: u32) -> Duration;
}

/// A helper type to use [PollingBackoffPolicy] in client configuration.
#[derive(Clone)]
pub struct PollingBackoffPolicyArg(pub(crate) Arc<dyn PollingBackoffPolicy>);

impl<T: PollingBackoffPolicy + 'static> std::convert::From<T> for PollingBackoffPolicyArg {
    fn from(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl std::convert::From<Arc<dyn PollingBackoffPolicy>> for PollingBackoffPolicyArg {
    fn from(value: Arc<dyn PollingBackoffPolicy>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exponential_backoff::ExponentialBackoffBuilder;

    // Verify `PollingBackoffPolicyArg` can be converted from the desired types.
    #[test]
    fn polling_backoff_policy_arg() {
        let policy = ExponentialBackoffBuilder::default().clamp();
        let _ = PollingBackoffPolicyArg::from(policy);

        let policy: Arc<dyn PollingBackoffPolicy> =
            Arc::new(ExponentialBackoffBuilder::default().clamp());
        let _ = PollingBackoffPolicyArg::from(policy);
    }
}
