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

//! Simplifies the implementation of `PollerImpl`.

use crate::PollingResult;
use gax::Result;
use gax::error::Error;
use gax::loop_state::LoopState;
use gax::polling_error_policy::PollingErrorPolicy;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// A wrapper around [operations::model::Operation] with typed responses.
///
/// # Parameters
/// * `R` - the response type extracted when the operation completes
///   successfully.
/// * `M` - the metadata type returned while the operation is in progress.
pub struct Operation<R, M> {
    inner: operations::model::Operation,
    response: PhantomData<R>,
    metadata: PhantomData<M>,
}

impl<R, M> Operation<R, M> {
    /// Wraps an untyped operation.
    pub fn new(inner: operations::model::Operation) -> Self {
        Self {
            inner,
            response: PhantomData,
            metadata: PhantomData,
        }
    }

    fn name(&self) -> String {
        self.inner.name.clone()
    }
    fn done(&self) -> bool {
        self.inner.done
    }
}

pub(crate) fn handle_start<R, M>(
    result: Result<Operation<R, M>>,
) -> (Option<String>, PollingResult<R, M>)
where
    R: DeserializeOwned,
    M: DeserializeOwned,
{
    match result {
        Err(e) => (None, PollingResult::Completed(Err(e))),
        Ok(op) => handle_common(op),
    }
}

pub(crate) fn handle_poll<R, M>(
    error_policy: Arc<dyn PollingErrorPolicy>,
    loop_start: Instant,
    attempt_count: u32,
    operation_name: String,
    result: Result<Operation<R, M>>,
) -> (Option<String>, PollingResult<R, M>)
where
    R: DeserializeOwned,
    M: DeserializeOwned,
{
    match result {
        Err(e) => {
            let state = error_policy.on_error(loop_start, attempt_count, e);
            handle_polling_error(state, operation_name)
        }
        Ok(op) => {
            let (name, result) = handle_common(op);
            match &result {
                PollingResult::Completed(_) => (name, result),
                PollingResult::InProgress(_) => {
                    match error_policy.on_in_progress(loop_start, attempt_count, &operation_name) {
                        None => (name, result),
                        Some(e) => (None, PollingResult::Completed(Err(e))),
                    }
                }
                PollingResult::PollingError(_) => {
                    unreachable!("handle_common never returns PollingResult::PollingError")
                }
            }
        }
    }
}

fn handle_polling_error<R, M>(
    state: LoopState,
    operation_name: String,
) -> (Option<String>, PollingResult<R, M>) {
    match state {
        LoopState::Continue(e) => (Some(operation_name), PollingResult::PollingError(e)),
        LoopState::Exhausted(e) | LoopState::Permanent(e) => {
            (None, PollingResult::Completed(Err(e)))
        }
    }
}

fn handle_common<R, M>(op: Operation<R, M>) -> (Option<String>, PollingResult<R, M>)
where
    R: DeserializeOwned,
    M: DeserializeOwned,
{
    if op.done() {
        let result = as_result(op);
        return (None, PollingResult::Completed(result));
    }
    let name = op.name();
    let metadata = as_metadata(op);
    (Some(name), PollingResult::InProgress(metadata))
}

fn as_result<R, M>(op: Operation<R, M>) -> Result<R>
where
    R: DeserializeOwned,
{
    // A terminal operation must set either the response *or* the error.
    // Setting neither is a deserialization error, as the incoming data does
    // not satisfy the invariants of a terminal state.
    match (op.inner.response(), op.inner.error()) {
        (Some(any), None) => serde_json::from_value::<R>(any.clone()).map_err(Error::deser),
        (None, Some(status)) => Err(Error::service(status.clone())),
        (None, None) => Err(Error::deser(
            "neither response nor error set in a terminal operation",
        )),
        (Some(_), Some(_)) => unreachable!("response and error held in a oneof"),
    }
}

fn as_metadata<R, M>(op: Operation<R, M>) -> Option<M>
where
    M: DeserializeOwned,
{
    op.inner
        .metadata
        .as_ref()
        .and_then(|value| serde_json::from_value::<M>(value.clone()).ok())
}
