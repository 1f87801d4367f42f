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

//! Types and functions to poll long-running operations (LROs) until
//! completion.
//!
//! A long-running operation moves through a small state machine: it is
//! pending until the server reaches a terminal state, either a successful
//! response or an error status. The server may refresh the operation's
//! metadata while it is pending, and a terminal operation never changes
//! again. The [Poller] in this crate drives that state machine from the
//! client side: it queries the operation, waits between attempts, retries
//! transient failures, and stops on terminal states or when its polling
//! policies are exhausted.
//!
//! An operation cancelled through
//! [cancel_operation][operations::client::OperationsClient::cancel_operation]
//! completes with an error status whose code is `CANCELLED`. The poller
//! treats this as a valid terminal state, reported through
//! [PollingResult::Completed] with the corresponding service error.
//!
//! # Example
//! ```no_run
//! # use operations::client::OperationsClient;
//! # async fn sample(client: OperationsClient) -> gax::Result<()> {
//! use longrun_lro::Poller;
//! let response = longrun_lro::poll_operation::<serde_json::Value, serde_json::Value>(
//!     client,
//!     "operations/my-operation",
//! )
//! .until_done()
//! .await?;
//! println!("response payload: {response}");
//! # Ok(())
//! # }
//! ```

use gax::Result;
use gax::error::Error;
use gax::polling_backoff_policy::PollingBackoffPolicy;
use gax::polling_error_policy::PollingErrorPolicy;
use operations::client::OperationsClient;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

mod details;
pub use details::Operation;

/// The result of polling a long-running operation.
///
/// # Parameters
/// * `R` - the response type. This is the type extracted when the operation
///   completes successfully.
/// * `M` - the metadata type. While the operation is in progress the service
///   may return values of this type.
#[derive(Debug)]
pub enum PollingResult<R, M> {
    /// The operation is still in progress.
    ///
    /// The metadata is present when the service attached progress information
    /// that deserializes as `M`.
    InProgress(Option<M>),

    /// The operation completed. This includes the result.
    ///
    /// A successfully honored cancellation completes the operation with an
    /// error status whose code is `CANCELLED`.
    Completed(Result<R>),

    /// An error trying to poll the operation.
    ///
    /// Not all errors indicate that the operation failed. For example,
    /// transient transport failures may disappear in the next polling
    /// attempt. The polling error policy already classified this error as
    /// retryable: permanent errors and exhausted budgets are reported as
    /// [Completed][PollingResult::Completed] with the error instead.
    PollingError(Error),
}

/// The trait implemented by operation pollers.
///
/// # Parameters
/// * `R` - the response type extracted when the operation completes
///   successfully.
/// * `M` - the metadata type returned while the operation is in progress.
pub trait Poller<R, M>: Send {
    /// Queries the current state of the long-running operation.
    fn poll(&mut self) -> impl Future<Output = Option<PollingResult<R, M>>> + Send;

    /// Polls the operation until a terminal state, waiting between attempts.
    ///
    /// The backoff policy determines the wait period between attempts, and
    /// the error policy determines which poll errors are retried and when
    /// the polling budget is exhausted. Exhausting the elapsed-time budget
    /// surfaces as a [timeout][gax::error::Error::is_timeout] error.
    fn until_done(self) -> impl Future<Output = Result<R>> + Send;

    /// Returns a poller that aborts promptly when `token` is cancelled.
    ///
    /// The cancellation interrupts [until_done][Poller::until_done]
    /// mid-sleep, the loop does not wait for the next poll attempt. The
    /// aborted loop reports a service error with a `CANCELLED` status code.
    fn with_cancellation(self, token: CancellationToken) -> Self
    where
        Self: Sized;

    /// Converts the poller into a [futures::Stream] of polling results.
    #[cfg(feature = "unstable-stream")]
    fn into_stream(self) -> impl futures::Stream<Item = PollingResult<R, M>> + Unpin;
}

/// Creates a poller for an existing operation, using the client's configured
/// polling policies.
///
/// The first poll queries the operation immediately; subsequent polls wait
/// the period prescribed by the client's polling backoff policy.
pub fn poll_operation<R, M>(client: OperationsClient, name: &str) -> impl Poller<R, M> + use<R, M>
where
    R: DeserializeOwned + Send + 'static,
    M: DeserializeOwned + Send + 'static,
{
    let name = name.to_string();
    let error_policy = client.polling_error_policy();
    let backoff_policy = client.polling_backoff_policy();
    let start_client = client.clone();
    let start_name = name.clone();
    let start = move || async move {
        start_client
            .get_operation(start_name)
            .await
            .map(Operation::new)
    };
    let query = move |name: String| {
        let client = client.clone();
        async move { client.get_operation(name).await.map(Operation::new) }
    };
    PollerImpl::new(error_policy, backoff_policy, start, query)
}

/// Creates a poller from closures to start and to query the operation.
///
/// Use this constructor for start-then-poll flows, where an RPC creates the
/// operation and subsequent polls query it by name.
pub fn new_poller<R, M, S, SF, Q, QF>(
    error_policy: Arc<dyn PollingErrorPolicy>,
    backoff_policy: Arc<dyn PollingBackoffPolicy>,
    start: S,
    query: Q,
) -> impl Poller<R, M>
where
    R: DeserializeOwned + Send + 'static,
    M: DeserializeOwned + Send + 'static,
    S: FnOnce() -> SF + Send + Sync,
    SF: Future<Output = Result<Operation<R, M>>> + Send + 'static,
    Q: FnMut(String) -> QF + Send + Sync,
    QF: Future<Output = Result<Operation<R, M>>> + Send + 'static,
{
    PollerImpl::new(error_policy, backoff_policy, start, query)
}

/// An implementation of [Poller] based on closures.
///
/// # Parameters
/// * `S` - the start closure, issues the first exchange. All necessary
///   parameters are captured by this closure.
/// * `Q` - the query closure, queries the operation by name on every
///   subsequent poll.
struct PollerImpl<S, Q> {
    error_policy: Arc<dyn PollingErrorPolicy>,
    backoff_policy: Arc<dyn PollingBackoffPolicy>,
    start: Option<S>,
    query: Q,
    operation: Option<String>,
    loop_start: Instant,
    attempt_count: u32,
    cancel: Option<CancellationToken>,
}

impl<S, Q> PollerImpl<S, Q> {
    fn new(
        error_policy: Arc<dyn PollingErrorPolicy>,
        backoff_policy: Arc<dyn PollingBackoffPolicy>,
        start: S,
        query: Q,
    ) -> Self {
        Self {
            error_policy,
            backoff_policy,
            start: Some(start),
            query,
            operation: None,
            loop_start: Instant::now(),
            attempt_count: 0,
            cancel: None,
        }
    }

    fn cancelled_error(&self) -> Error {
        use gax::error::rpc::{Code, Status};
        Error::service(
            Status::default()
                .set_code(Code::Cancelled)
                .set_message("the polling loop was cancelled by the application"),
        )
    }
}

impl<R, M, S, SF, Q, QF> Poller<R, M> for PollerImpl<S, Q>
where
    R: DeserializeOwned + Send + 'static,
    M: DeserializeOwned + Send + 'static,
    S: FnOnce() -> SF + Send + Sync,
    SF: Future<Output = Result<Operation<R, M>>> + Send + 'static,
    Q: FnMut(String) -> QF + Send + Sync,
    QF: Future<Output = Result<Operation<R, M>>> + Send + 'static,
{
    async fn poll(&mut self) -> Option<PollingResult<R, M>> {
        if let Some(start) = self.start.take() {
            let result = start().await;
            let (operation, poll) = details::handle_start(result);
            self.operation = operation;
            return Some(poll);
        }
        if let Some(name) = self.operation.take() {
            self.attempt_count += 1;
            let result = (self.query)(name.clone()).await;
            let (operation, poll) = details::handle_poll(
                self.error_policy.clone(),
                self.loop_start,
                self.attempt_count,
                name,
                result,
            );
            self.operation = operation;
            return Some(poll);
        }
        None
    }

    async fn until_done(mut self) -> Result<R> {
        while let Some(state) = self.poll().await {
            match state {
                // Return, the operation completed or the polling policy is
                // exhausted.
                PollingResult::Completed(result) => return result,
                // Continue, the operation was successfully polled and the
                // polling policy was queried.
                PollingResult::InProgress(_) => (),
                // Continue, the polling policy decided the error is
                // recoverable.
                PollingResult::PollingError(e) => {
                    tracing::warn!(
                        "transient error in poll attempt {}, continuing: {e}",
                        self.attempt_count
                    );
                }
            }
            let delay = self.backoff_policy.wait_period(self.attempt_count.max(1));
            match &self.cancel {
                None => tokio::time::sleep(delay).await,
                Some(token) => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = token.cancelled() => return Err(self.cancelled_error()),
                    }
                }
            }
        }
        // `poll()` returns `None` only after reporting `Completed`, and the
        // loop returns on `Completed`.
        unreachable!("the loop exits via the `Completed` branch");
    }

    fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[cfg(feature = "unstable-stream")]
    fn into_stream(self) -> impl futures::Stream<Item = PollingResult<R, M>> + Unpin {
        use futures::stream::unfold;
        Box::pin(unfold(Some(self), move |state| async move {
            if let Some(mut poller) = state {
                if let Some(result) = poller.poll().await {
                    return Some((result, Some(poller)));
                }
            }
            None
        }))
    }
}
