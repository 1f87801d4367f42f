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

//! The client for the operations service.

use crate::model;
use crate::name;
use crate::stub;
use crate::transport::HttpOperations;
use gax::Result;
use gax::backoff_policy::BackoffPolicy;
use gax::error::Error;
use gax::exponential_backoff::ExponentialBackoff;
use gax::options::ClientConfig;
use gax::paginator::Paginator;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::{PollingErrorPolicy, PollingErrorPolicyExt, TransientOnly};
use gax::retry_policy::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// The default budget for polling loops started through this client.
const DEFAULT_POLLING_TIME_LIMIT: Duration = Duration::from_secs(300);

/// A client for a service managing long-running operations.
///
/// Use this client to poll the state of operations returned by other API
/// calls, to list the operations known to the service, and to cancel or
/// delete them.
///
/// The client is cheap to clone: clones share the underlying transport
/// connection.
///
/// # Example
/// ```no_run
/// # use longrun_operations::client::OperationsClient;
/// # async fn sample() -> gax::Result<()> {
/// use gax::options::ClientConfig;
/// let client = OperationsClient::new(
///     ClientConfig::default().set_endpoint("https://operations.example.com"),
/// )?;
/// let operation = client.get_operation("operations/my-operation").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct OperationsClient {
    inner: Arc<dyn stub::Operations>,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    backoff_policy: Arc<dyn BackoffPolicy>,
    polling_error_policy: Arc<dyn PollingErrorPolicy>,
    polling_backoff_policy: Arc<dyn PollingBackoffPolicy>,
    page_size: Option<i32>,
}

impl OperationsClient {
    /// Creates a new client using the HTTP/JSON transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpOperations::new(&config)?;
        Ok(Self::with_stub(Arc::new(transport), &config))
    }

    /// Creates a new client using a custom implementation of
    /// [stub::Operations], with the default configuration.
    ///
    /// Test doubles and mocks enter the client through this constructor.
    pub fn from_stub<T>(stub: T) -> Self
    where
        T: stub::Operations + 'static,
    {
        Self::with_stub(Arc::new(stub), &ClientConfig::default())
    }

    /// Creates a new client using a custom implementation of
    /// [stub::Operations] and an explicit configuration.
    ///
    /// The endpoint and credentials in the configuration are ignored, the
    /// stub is responsible for its own transport concerns.
    pub fn from_stub_with_config<T>(stub: T, config: ClientConfig) -> Self
    where
        T: stub::Operations + 'static,
    {
        Self::with_stub(Arc::new(stub), &config)
    }

    fn with_stub(inner: Arc<dyn stub::Operations>, config: &ClientConfig) -> Self {
        Self {
            inner,
            retry_policy: config.retry_policy(),
            backoff_policy: config
                .backoff_policy()
                .unwrap_or_else(|| Arc::new(ExponentialBackoff::default())),
            polling_error_policy: config.polling_error_policy().unwrap_or_else(|| {
                Arc::new(TransientOnly.with_time_limit(DEFAULT_POLLING_TIME_LIMIT))
            }),
            polling_backoff_policy: config
                .polling_backoff_policy()
                .unwrap_or_else(|| Arc::new(ExponentialBackoff::default())),
            page_size: config.page_size(),
        }
    }

    /// Gets the latest state of a long-running operation.
    ///
    /// Clients can use this method to poll the operation result at intervals
    /// as recommended by the API service.
    pub async fn get_operation(&self, name: impl Into<String>) -> Result<model::Operation> {
        let name = name.into();
        name::parse_operation_name(&name).map_err(Error::binding)?;
        let req = model::GetOperationRequest::default().set_name(name);
        self.with_retry(true, async || self.inner.get_operation(req.clone()).await)
            .await
    }

    /// Lists operations that match the specified filter in the request.
    ///
    /// Returns a lazy sequence of pages: the continuation token bookkeeping
    /// is internal, and each page is fetched only when requested. Use
    /// [items][Paginator::items] for a sequence of operations instead of
    /// pages. If the server does not support this method, the sequence
    /// yields an error with an `UNIMPLEMENTED` status.
    pub fn list_operations(
        &self,
        name: impl Into<String>,
        filter: impl Into<String>,
    ) -> Paginator<model::ListOperationsResponse, Error> {
        let mut req = model::ListOperationsRequest::default()
            .set_name(name)
            .set_filter(filter);
        if let Some(page_size) = self.page_size {
            req = req.set_page_size(page_size);
        }
        let client = self.clone();
        let execute = move |token: String| {
            let client = client.clone();
            let req = req.clone().set_page_token(token);
            async move {
                client
                    .with_retry(true, async || client.inner.list_operations(req.clone()).await)
                    .await
            }
        };
        Paginator::new(String::new(), execute)
    }

    /// Starts asynchronous cancellation on a long-running operation.
    ///
    /// The server makes a best effort to cancel the operation, but success
    /// is not guaranteed. This method returns once the request is
    /// acknowledged, not once the cancellation completes. Use
    /// [get_operation][OperationsClient::get_operation] to check whether the
    /// cancellation succeeded: on success the operation completes with an
    /// error status whose code is `CANCELLED`. If the server does not
    /// support this method, it returns an `UNIMPLEMENTED` error.
    pub async fn cancel_operation(&self, name: impl Into<String>) -> Result<model::Empty> {
        let name = name.into();
        name::parse_operation_name(&name).map_err(Error::binding)?;
        let req = model::CancelOperationRequest::default().set_name(name);
        // Cancellation is not idempotent from the service's perspective, a
        // retry could acknowledge a different run of the request.
        self.with_retry(false, async || self.inner.cancel_operation(req.clone()).await)
            .await
    }

    /// Deletes a long-running operation.
    ///
    /// This method indicates that the client is no longer interested in the
    /// operation result. It does not cancel the operation. Deleting an
    /// already-deleted (or unknown) operation returns a `NOT_FOUND` error,
    /// which callers may treat as success.
    pub async fn delete_operation(&self, name: impl Into<String>) -> Result<model::Empty> {
        let name = name.into();
        name::parse_operation_name(&name).map_err(Error::binding)?;
        let req = model::DeleteOperationRequest::default().set_name(name);
        self.with_retry(true, async || self.inner.delete_operation(req.clone()).await)
            .await
    }

    /// The error policy for polling loops started through this client.
    pub fn polling_error_policy(&self) -> Arc<dyn PollingErrorPolicy> {
        self.polling_error_policy.clone()
    }

    /// The backoff policy for polling loops started through this client.
    pub fn polling_backoff_policy(&self) -> Arc<dyn PollingBackoffPolicy> {
        self.polling_backoff_policy.clone()
    }

    async fn with_retry<T, F>(&self, idempotent: bool, inner: F) -> Result<T>
    where
        F: AsyncFnMut() -> Result<T> + Send,
    {
        let mut inner = inner;
        match &self.retry_policy {
            None => inner().await,
            Some(policy) => {
                gax::retry_loop::retry_loop(
                    inner,
                    |d: Duration| {
                        Box::pin(tokio::time::sleep(d))
                            as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
                    },
                    idempotent,
                    policy.clone(),
                    self.backoff_policy.clone(),
                )
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::rpc::{Code, Status};
    use gax::retry_policy::{RetryPolicyExt, TransientErrors};

    mockall::mock! {
        #[derive(Debug)]
        Operations {}

        #[async_trait::async_trait]
        impl stub::Operations for Operations {
            async fn get_operation(
                &self,
                req: model::GetOperationRequest,
            ) -> Result<model::Operation>;
            async fn list_operations(
                &self,
                req: model::ListOperationsRequest,
            ) -> Result<model::ListOperationsResponse>;
            async fn cancel_operation(
                &self,
                req: model::CancelOperationRequest,
            ) -> Result<model::Empty>;
            async fn delete_operation(
                &self,
                req: model::DeleteOperationRequest,
            ) -> Result<model::Empty>;
        }
    }

    #[tokio::test]
    async fn get_passes_the_name_through() -> anyhow::Result<()> {
        let mut mock = MockOperations::new();
        mock.expect_get_operation()
            .withf(|req| req.name == "operations/op-001")
            .times(1)
            .returning(|req| Ok(model::Operation::default().set_name(req.name)));
        let client = OperationsClient::from_stub(mock);
        let got = client.get_operation("operations/op-001").await?;
        assert_eq!(got.name, "operations/op-001");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_names_fail_without_a_request() {
        let mut mock = MockOperations::new();
        mock.expect_get_operation().never();
        mock.expect_cancel_operation().never();
        mock.expect_delete_operation().never();
        let client = OperationsClient::from_stub(mock);

        let error = client.get_operation("not-a-name").await.unwrap_err();
        assert!(error.is_binding(), "{error:?}");
        let error = client.cancel_operation("operations/").await.unwrap_err();
        assert!(error.is_binding(), "{error:?}");
        let error = client.delete_operation("").await.unwrap_err();
        assert!(error.is_binding(), "{error:?}");
    }

    #[tokio::test]
    async fn list_chains_page_tokens() -> anyhow::Result<()> {
        let mut mock = MockOperations::new();
        mock.expect_list_operations()
            .withf(|req| req.page_token.is_empty())
            .times(1)
            .returning(|_| {
                Ok(model::ListOperationsResponse::default()
                    .set_operations([model::Operation::default().set_name("operations/op-001")])
                    .set_next_page_token("token-1"))
            });
        mock.expect_list_operations()
            .withf(|req| req.page_token == "token-1")
            .times(1)
            .returning(|_| {
                Ok(model::ListOperationsResponse::default()
                    .set_operations([model::Operation::default().set_name("operations/op-002")]))
            });
        let client = OperationsClient::from_stub(mock);
        let mut names = Vec::new();
        let mut items = client.list_operations("operations", "").items();
        while let Some(op) = items.next().await {
            names.push(op?.name);
        }
        assert_eq!(names, vec!["operations/op-001", "operations/op-002"]);
        Ok(())
    }

    #[tokio::test]
    async fn list_applies_the_default_page_size() -> anyhow::Result<()> {
        let mut mock = MockOperations::new();
        mock.expect_list_operations()
            .withf(|req| req.page_size == 25 && req.filter == "done=true")
            .times(1)
            .returning(|_| Ok(model::ListOperationsResponse::default()));
        let client = OperationsClient::from_stub_with_config(
            mock,
            ClientConfig::default().set_page_size(25),
        );
        let mut pages = client.list_operations("operations", "done=true");
        while let Some(page) = pages.next().await {
            page?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn get_retries_transient_errors() -> anyhow::Result<()> {
        let mut mock = MockOperations::new();
        let mut calls = 0;
        mock.expect_get_operation().times(3).returning(move |req| {
            calls += 1;
            if calls < 3 {
                return Err(Error::service(
                    Status::default().set_code(Code::Unavailable),
                ));
            }
            Ok(model::Operation::default().set_name(req.name).set_done(true))
        });
        let config = ClientConfig::default()
            .set_retry_policy(TransientErrors.with_attempt_limit(5))
            .set_backoff_policy(
                gax::exponential_backoff::ExponentialBackoffBuilder::new()
                    .with_initial_delay(Duration::from_millis(1))
                    .with_maximum_delay(Duration::from_millis(1))
                    .clamp(),
            );
        let client = OperationsClient::from_stub_with_config(mock, config);
        let got = client.get_operation("operations/op-001").await?;
        assert!(got.done);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_does_not_retry() {
        let mut mock = MockOperations::new();
        mock.expect_cancel_operation().times(1).returning(|_| {
            Err(Error::service(
                Status::default().set_code(Code::Unavailable),
            ))
        });
        let config = ClientConfig::default()
            .set_retry_policy(TransientErrors.with_attempt_limit(5));
        let client = OperationsClient::from_stub_with_config(mock, config);
        let error = client
            .cancel_operation("operations/op-001")
            .await
            .unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::Unavailable));
    }

    #[tokio::test]
    async fn permanent_errors_surface_immediately() {
        let mut mock = MockOperations::new();
        mock.expect_get_operation().times(1).returning(|_| {
            Err(Error::service(
                Status::default()
                    .set_code(Code::NotFound)
                    .set_message("no such operation"),
            ))
        });
        let config = ClientConfig::default()
            .set_retry_policy(TransientErrors.with_attempt_limit(5));
        let client = OperationsClient::from_stub_with_config(mock, config);
        let error = client.get_operation("operations/op-001").await.unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::NotFound));
    }
}
