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

//! The messages exchanged with the operations service.
//!
//! The response and metadata payloads are service defined. This crate treats
//! them as opaque JSON values; see the `longrun-lro` crate for typed
//! extraction.

use gax::error::rpc::Status;
use gax::paginator::PageableResponse;
use serde::{Deserialize, Serialize};

/// Represents a long-running operation that is the result of a network API
/// call.
///
/// The `error` and `response` fields form the operation result: at most one
/// of them is set, and only once `done` is true. From the client's
/// perspective a terminal operation never changes again.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Operation {
    /// The server-assigned name, which is only unique within the same service
    /// that originally returns it.
    pub name: String,

    /// Service-specific metadata associated with the operation. It typically
    /// contains progress information, and may be updated by the server while
    /// the operation is pending. Some services might not provide such
    /// metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// If the value is `false`, it means the operation is still in progress.
    /// If `true`, the operation is completed, and either `error` or
    /// `response` is available.
    pub done: bool,

    /// The error result of the operation in case of failure or cancellation.
    ///
    /// A successfully honored cancellation sets a status whose code is
    /// `CANCELLED`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,

    /// The normal, successful response of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl Operation {
    /// Sets the value for [name][Operation::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value for [metadata][Operation::metadata].
    pub fn set_metadata<T: Into<serde_json::Value>>(mut self, v: T) -> Self {
        self.metadata = Some(v.into());
        self
    }

    /// Sets the value for [done][Operation::done].
    pub fn set_done(mut self, v: bool) -> Self {
        self.done = v;
        self
    }

    /// Sets the error result, clearing any response.
    pub fn set_error<T: Into<Status>>(mut self, v: T) -> Self {
        self.error = Some(v.into());
        self.response = None;
        self
    }

    /// Sets the successful response, clearing any error.
    pub fn set_response<T: Into<serde_json::Value>>(mut self, v: T) -> Self {
        self.response = Some(v.into());
        self.error = None;
        self
    }

    /// The successful response payload, if the operation completed
    /// successfully.
    pub fn response(&self) -> Option<&serde_json::Value> {
        self.response.as_ref()
    }

    /// The error status, if the operation completed with an error.
    pub fn error(&self) -> Option<&Status> {
        self.error.as_ref()
    }
}

/// The request message for getting an operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct GetOperationRequest {
    /// The name of the operation resource.
    pub name: String,
}

impl GetOperationRequest {
    /// Sets the value for [name][GetOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

/// The request message for listing operations.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ListOperationsRequest {
    /// The name of the operation's parent collection.
    pub name: String,

    /// The standard list filter.
    pub filter: String,

    /// The standard list page size.
    pub page_size: i32,

    /// The standard list page token.
    pub page_token: String,
}

impl ListOperationsRequest {
    /// Sets the value for [name][ListOperationsRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the value for [filter][ListOperationsRequest::filter].
    pub fn set_filter<T: Into<String>>(mut self, v: T) -> Self {
        self.filter = v.into();
        self
    }

    /// Sets the value for [page_size][ListOperationsRequest::page_size].
    pub fn set_page_size(mut self, v: i32) -> Self {
        self.page_size = v;
        self
    }

    /// Sets the value for [page_token][ListOperationsRequest::page_token].
    pub fn set_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.page_token = v.into();
        self
    }
}

/// The response message for listing operations.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct ListOperationsResponse {
    /// A list of operations that matches the specified filter in the request.
    pub operations: Vec<Operation>,

    /// The standard list next-page token. Empty when there are no further
    /// pages.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub next_page_token: String,
}

impl ListOperationsResponse {
    /// Sets the value for [operations][ListOperationsResponse::operations].
    pub fn set_operations<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<Operation>,
    {
        self.operations = v.into_iter().map(|v| v.into()).collect();
        self
    }

    /// Sets the value for
    /// [next_page_token][ListOperationsResponse::next_page_token].
    pub fn set_next_page_token<T: Into<String>>(mut self, v: T) -> Self {
        self.next_page_token = v.into();
        self
    }
}

impl PageableResponse for ListOperationsResponse {
    type PageItem = Operation;

    fn items(self) -> Vec<Operation> {
        self.operations
    }

    fn next_page_token(&self) -> String {
        self.next_page_token.clone()
    }
}

/// The request message for cancelling an operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct CancelOperationRequest {
    /// The name of the operation resource to be cancelled.
    pub name: String,
}

impl CancelOperationRequest {
    /// Sets the value for [name][CancelOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

/// The request message for deleting an operation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct DeleteOperationRequest {
    /// The name of the operation resource to be deleted.
    pub name: String,
}

impl DeleteOperationRequest {
    /// Sets the value for [name][DeleteOperationRequest::name].
    pub fn set_name<T: Into<String>>(mut self, v: T) -> Self {
        self.name = v.into();
        self
    }
}

/// A generic empty message, used as the response for cancel and delete.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use super::*;
    use gax::error::rpc::Code;
    use serde_json::json;

    type TestResult = anyhow::Result<()>;

    #[test]
    fn operation_pending_roundtrip() -> TestResult {
        let op = Operation::default()
            .set_name("operations/op-001")
            .set_metadata(json!({"percentComplete": 25}));
        let value = serde_json::to_value(&op)?;
        assert_eq!(
            value,
            json!({
                "name": "operations/op-001",
                "metadata": {"percentComplete": 25},
                "done": false,
            })
        );
        let got = serde_json::from_value::<Operation>(value)?;
        assert_eq!(got, op);
        assert!(got.response().is_none());
        assert!(got.error().is_none());
        Ok(())
    }

    #[test]
    fn operation_with_response() -> TestResult {
        let op = Operation::default()
            .set_name("operations/op-001")
            .set_done(true)
            .set_response(json!({"output": "done"}));
        let value = serde_json::to_value(&op)?;
        assert_eq!(
            value,
            json!({
                "name": "operations/op-001",
                "done": true,
                "response": {"output": "done"},
            })
        );
        let got = serde_json::from_value::<Operation>(value)?;
        assert_eq!(got.response(), Some(&json!({"output": "done"})));
        assert!(got.error().is_none());
        Ok(())
    }

    #[test]
    fn operation_with_error() -> TestResult {
        let status = Status::default()
            .set_code(Code::Cancelled)
            .set_message("the user requested cancellation");
        let op = Operation::default()
            .set_name("operations/op-001")
            .set_done(true)
            .set_error(status.clone());
        let value = serde_json::to_value(&op)?;
        assert_eq!(
            value,
            json!({
                "name": "operations/op-001",
                "done": true,
                "error": {"code": 1, "message": "the user requested cancellation"},
            })
        );
        let got = serde_json::from_value::<Operation>(value)?;
        assert_eq!(got.error(), Some(&status));
        assert!(got.response().is_none());
        Ok(())
    }

    #[test]
    fn result_setters_are_mutually_exclusive() {
        let op = Operation::default()
            .set_response(json!({"output": "done"}))
            .set_error(Status::default().set_code(Code::Internal));
        assert!(op.response().is_none());
        assert!(op.error().is_some());

        let op = Operation::default()
            .set_error(Status::default().set_code(Code::Internal))
            .set_response(json!({"output": "done"}));
        assert!(op.error().is_none());
        assert!(op.response().is_some());
    }

    #[test]
    fn list_response_field_names() -> TestResult {
        let got = serde_json::from_value::<ListOperationsResponse>(json!({
            "operations": [{"name": "operations/op-001", "done": false}],
            "nextPageToken": "token-1",
        }))?;
        assert_eq!(got.operations.len(), 1);
        assert_eq!(got.next_page_token, "token-1");
        Ok(())
    }

    #[test]
    fn list_response_is_pageable() {
        let response = ListOperationsResponse::default()
            .set_operations([Operation::default().set_name("operations/op-001")])
            .set_next_page_token("token-1");
        assert_eq!(
            gax::paginator::PageableResponse::next_page_token(&response),
            "token-1"
        );
        let items = gax::paginator::PageableResponse::items(response);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn request_builders() {
        let req = ListOperationsRequest::default()
            .set_name("operations")
            .set_filter("done=true")
            .set_page_size(10)
            .set_page_token("token-2");
        assert_eq!(req.name, "operations");
        assert_eq!(req.filter, "done=true");
        assert_eq!(req.page_size, 10);
        assert_eq!(req.page_token, "token-2");

        let req = GetOperationRequest::default().set_name("operations/op-001");
        assert_eq!(req.name, "operations/op-001");
        let req = CancelOperationRequest::default().set_name("operations/op-001");
        assert_eq!(req.name, "operations/op-001");
        let req = DeleteOperationRequest::default().set_name("operations/op-001");
        assert_eq!(req.name, "operations/op-001");
    }

    #[test]
    fn empty_roundtrip() -> TestResult {
        let value = serde_json::to_value(Empty::default())?;
        assert_eq!(value, json!({}));
        let got = serde_json::from_value::<Empty>(json!({}))?;
        assert_eq!(got, Empty::default());
        Ok(())
    }
}
