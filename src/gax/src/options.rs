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

//! Client configuration.
//!
//! A single explicit configuration structure replaces per-call settings
//! objects: the transport endpoint, the credentials, the default timeout, the
//! default retry and backoff policies, the default polling policies, and the
//! default page size.

use crate::backoff_policy::{BackoffPolicy, BackoffPolicyArg};
use crate::credentials::Credentials;
use crate::polling_backoff_policy::{PollingBackoffPolicy, PollingBackoffPolicyArg};
use crate::polling_error_policy::{PollingErrorPolicy, PollingErrorPolicyArg};
use crate::retry_policy::{RetryPolicy, RetryPolicyArg};
use std::sync::Arc;
use std::time::Duration;

/// Configuration shared by all clients.
///
/// # Example
/// ```
/// # use longrun_gax::options::ClientConfig;
/// # use longrun_gax::retry_policy::{TransientErrors, RetryPolicyExt};
/// use std::time::Duration;
/// let config = ClientConfig::default()
///     .set_endpoint("https://operations.example.com")
///     .set_timeout(Duration::from_secs(30))
///     .set_retry_policy(TransientErrors.with_attempt_limit(3))
///     .set_page_size(50);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    endpoint: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Option<Arc<dyn BackoffPolicy>>,
    polling_error_policy: Option<Arc<dyn PollingErrorPolicy>>,
    polling_backoff_policy: Option<Arc<dyn PollingBackoffPolicy>>,
    page_size: Option<i32>,
}

impl ClientConfig {
    /// Sets the transport endpoint, e.g. `https://operations.example.com`.
    pub fn set_endpoint<T: Into<String>>(mut self, v: T) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// The configured endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Sets the credentials used to authenticate requests.
    pub fn set_credentials<T: Into<Credentials>>(mut self, v: T) -> Self {
        self.credentials = Some(v.into());
        self
    }

    /// The configured credentials, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Sets the default per-attempt timeout.
    pub fn set_timeout<T: Into<Duration>>(mut self, v: T) -> Self {
        self.timeout = Some(v.into());
        self
    }

    /// The configured per-attempt timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Sets the default retry policy for idempotent requests.
    ///
    /// Without a retry policy requests get a single attempt.
    pub fn set_retry_policy<T: Into<RetryPolicyArg>>(mut self, v: T) -> Self {
        self.retry_policy = Some(v.into().0);
        self
    }

    /// The configured retry policy, if any.
    pub fn retry_policy(&self) -> Option<Arc<dyn RetryPolicy>> {
        self.retry_policy.clone()
    }

    /// Sets the backoff policy between retry attempts.
    pub fn set_backoff_policy<T: Into<BackoffPolicyArg>>(mut self, v: T) -> Self {
        self.backoff_policy = Some(v.into().0);
        self
    }

    /// The configured retry backoff policy, if any.
    pub fn backoff_policy(&self) -> Option<Arc<dyn BackoffPolicy>> {
        self.backoff_policy.clone()
    }

    /// Sets the error policy for operation polling loops.
    pub fn set_polling_error_policy<T: Into<PollingErrorPolicyArg>>(mut self, v: T) -> Self {
        self.polling_error_policy = Some(v.into().0);
        self
    }

    /// The configured polling error policy, if any.
    pub fn polling_error_policy(&self) -> Option<Arc<dyn PollingErrorPolicy>> {
        self.polling_error_policy.clone()
    }

    /// Sets the backoff policy between poll attempts.
    pub fn set_polling_backoff_policy<T: Into<PollingBackoffPolicyArg>>(mut self, v: T) -> Self {
        self.polling_backoff_policy = Some(v.into().0);
        self
    }

    /// The configured polling backoff policy, if any.
    pub fn polling_backoff_policy(&self) -> Option<Arc<dyn PollingBackoffPolicy>> {
        self.polling_backoff_policy.clone()
    }

    /// Sets the default page size for list requests.
    pub fn set_page_size(mut self, v: i32) -> Self {
        self.page_size = Some(v);
        self
    }

    /// The configured default page size, if any.
    pub fn page_size(&self) -> Option<i32> {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exponential_backoff::ExponentialBackoffBuilder;
    use crate::polling_error_policy::TransientOnly;
    use crate::retry_policy::TransientErrors;

    #[test]
    fn defaults_are_empty() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint(), None);
        assert!(config.credentials().is_none());
        assert_eq!(config.timeout(), None);
        assert!(config.retry_policy().is_none());
        assert!(config.backoff_policy().is_none());
        assert!(config.polling_error_policy().is_none());
        assert!(config.polling_backoff_policy().is_none());
        assert_eq!(config.page_size(), None);
    }

    #[test]
    fn full_configuration() {
        let config = ClientConfig::default()
            .set_endpoint("https://operations.example.com")
            .set_credentials(crate::credentials::testing::test_credentials())
            .set_timeout(Duration::from_secs(15))
            .set_retry_policy(TransientErrors)
            .set_backoff_policy(ExponentialBackoffBuilder::new().clamp())
            .set_polling_error_policy(TransientOnly)
            .set_polling_backoff_policy(ExponentialBackoffBuilder::new().clamp())
            .set_page_size(25);
        assert_eq!(config.endpoint(), Some("https://operations.example.com"));
        assert!(config.credentials().is_some());
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert!(config.retry_policy().is_some());
        assert!(config.backoff_policy().is_some());
        assert!(config.polling_error_policy().is_some());
        assert!(config.polling_backoff_policy().is_some());
        assert_eq!(config.page_size(), Some(25));
    }
}
