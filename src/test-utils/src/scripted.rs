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

use gax::Result;
use gax::error::Error;
use operations::model;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A canned response in a [ScriptedOperations] script.
#[derive(Debug)]
pub enum Canned {
    /// Returned from [get_operation][operations::stub::Operations::get_operation].
    Operation(model::Operation),
    /// Returned from
    /// [list_operations][operations::stub::Operations::list_operations].
    Page(model::ListOperationsResponse),
    /// Returned from cancel and delete.
    Empty,
    /// Returned from any method.
    Error(Error),
}

/// One call observed by a [ScriptedOperations] double.
#[derive(Clone, Debug, PartialEq)]
pub enum ObservedCall {
    Get(model::GetOperationRequest),
    List(model::ListOperationsRequest),
    Cancel(model::CancelOperationRequest),
    Delete(model::DeleteOperationRequest),
}

/// The error reported when a script cannot satisfy a call.
///
/// Scripts fail deliberately and descriptively: an empty queue or a
/// mismatched response type is a bug in the test, and the error names the
/// method that exposed it.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("the response script is empty, unexpected call to {method}")]
    Empty { method: &'static str },
    #[error("the next scripted response does not fit a call to {method}")]
    Mismatch { method: &'static str },
}

/// A scripted implementation of
/// [Operations][operations::stub::Operations].
///
/// Responses are consumed from a single queue in FIFO order, regardless of
/// which method is called. Every received call is recorded, including calls
/// that fail because the script is exhausted.
///
/// The type is cheap to clone and clones share the script and the call log,
/// so a test can keep a handle after moving the double into a client.
///
/// # Example
/// ```
/// # use longrun_test_utils::ScriptedOperations;
/// # use operations::model;
/// let script = ScriptedOperations::new();
/// script.enqueue_operation(model::Operation::default().set_name("operations/op-001"));
/// let handle = script.clone();
/// // ... move `script` into a client, run the test ...
/// assert_eq!(handle.calls().len(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedOperations {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    responses: VecDeque<Canned>,
    calls: Vec<ObservedCall>,
}

impl ScriptedOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation response to the script.
    pub fn enqueue_operation(&self, operation: model::Operation) {
        self.enqueue(Canned::Operation(operation));
    }

    /// Appends a list page response to the script.
    pub fn enqueue_page(&self, page: model::ListOperationsResponse) {
        self.enqueue(Canned::Page(page));
    }

    /// Appends an empty response (for cancel and delete) to the script.
    pub fn enqueue_empty(&self) {
        self.enqueue(Canned::Empty);
    }

    /// Appends an error to the script.
    pub fn enqueue_error(&self, error: Error) {
        self.enqueue(Canned::Error(error));
    }

    /// The calls received so far, in order.
    pub fn calls(&self) -> Vec<ObservedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// The number of responses still queued.
    pub fn remaining(&self) -> usize {
        self.inner.lock().unwrap().responses.len()
    }

    fn enqueue(&self, canned: Canned) {
        self.inner.lock().unwrap().responses.push_back(canned);
    }

    fn next(&self, call: ObservedCall, method: &'static str) -> Result<Canned> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        inner
            .responses
            .pop_front()
            .ok_or_else(|| Error::other(ScriptError::Empty { method }))
    }
}

#[async_trait::async_trait]
impl operations::stub::Operations for ScriptedOperations {
    async fn get_operation(&self, req: model::GetOperationRequest) -> Result<model::Operation> {
        match self.next(ObservedCall::Get(req), "get_operation")? {
            Canned::Operation(operation) => Ok(operation),
            Canned::Error(error) => Err(error),
            _ => Err(Error::other(ScriptError::Mismatch {
                method: "get_operation",
            })),
        }
    }

    async fn list_operations(
        &self,
        req: model::ListOperationsRequest,
    ) -> Result<model::ListOperationsResponse> {
        match self.next(ObservedCall::List(req), "list_operations")? {
            Canned::Page(page) => Ok(page),
            Canned::Error(error) => Err(error),
            _ => Err(Error::other(ScriptError::Mismatch {
                method: "list_operations",
            })),
        }
    }

    async fn cancel_operation(&self, req: model::CancelOperationRequest) -> Result<model::Empty> {
        match self.next(ObservedCall::Cancel(req), "cancel_operation")? {
            Canned::Empty => Ok(model::Empty::default()),
            Canned::Error(error) => Err(error),
            _ => Err(Error::other(ScriptError::Mismatch {
                method: "cancel_operation",
            })),
        }
    }

    async fn delete_operation(&self, req: model::DeleteOperationRequest) -> Result<model::Empty> {
        match self.next(ObservedCall::Delete(req), "delete_operation")? {
            Canned::Empty => Ok(model::Empty::default()),
            Canned::Error(error) => Err(error),
            _ => Err(Error::other(ScriptError::Mismatch {
                method: "delete_operation",
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::rpc::{Code, Status};
    use operations::stub::Operations;
    use std::error::Error as _;

    #[tokio::test]
    async fn replays_in_fifo_order() -> anyhow::Result<()> {
        let script = ScriptedOperations::new();
        script.enqueue_operation(model::Operation::default().set_name("operations/op-001"));
        script.enqueue_operation(
            model::Operation::default()
                .set_name("operations/op-001")
                .set_done(true),
        );

        let first = script
            .get_operation(model::GetOperationRequest::default().set_name("operations/op-001"))
            .await?;
        assert!(!first.done);
        let second = script
            .get_operation(model::GetOperationRequest::default().set_name("operations/op-001"))
            .await?;
        assert!(second.done);
        assert_eq!(script.remaining(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn records_every_call() -> anyhow::Result<()> {
        let script = ScriptedOperations::new();
        script.enqueue_operation(model::Operation::default());
        script.enqueue_empty();

        let _ = script
            .get_operation(model::GetOperationRequest::default().set_name("operations/op-001"))
            .await?;
        let _ = script
            .cancel_operation(
                model::CancelOperationRequest::default().set_name("operations/op-001"),
            )
            .await?;
        let calls = script.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], ObservedCall::Get(req) if req.name == "operations/op-001"));
        assert!(
            matches!(&calls[1], ObservedCall::Cancel(req) if req.name == "operations/op-001")
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_script_fails_clearly() {
        let script = ScriptedOperations::new();
        let error = script
            .get_operation(model::GetOperationRequest::default().set_name("operations/op-001"))
            .await
            .unwrap_err();
        let source = error
            .source()
            .and_then(|e| e.downcast_ref::<ScriptError>())
            .expect("the failure names the script");
        assert!(
            matches!(
                source,
                ScriptError::Empty {
                    method: "get_operation"
                }
            ),
            "{source:?}"
        );
        // The failed call is still recorded.
        assert_eq!(script.calls().len(), 1);
    }

    #[tokio::test]
    async fn mismatched_response_fails_clearly() {
        let script = ScriptedOperations::new();
        script.enqueue_empty();
        let error = script
            .get_operation(model::GetOperationRequest::default())
            .await
            .unwrap_err();
        let source = error
            .source()
            .and_then(|e| e.downcast_ref::<ScriptError>())
            .expect("the failure names the script");
        assert!(matches!(source, ScriptError::Mismatch { .. }), "{source:?}");
        // Mismatches consume the queued response, like any other call.
        assert_eq!(script.remaining(), 0);
    }

    #[tokio::test]
    async fn scripted_errors_surface() {
        let script = ScriptedOperations::new();
        script.enqueue_error(Error::service(
            Status::default()
                .set_code(Code::NotFound)
                .set_message("no such operation"),
        ));
        let error = script
            .delete_operation(model::DeleteOperationRequest::default())
            .await
            .unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::NotFound));
    }
}
