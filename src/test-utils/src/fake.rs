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
use gax::error::rpc::{Code, Status};
use operations::model;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// The page size used when a list request does not set one.
const DEFAULT_PAGE_SIZE: i32 = 100;

/// A stateful, in-memory implementation of
/// [Operations][operations::stub::Operations].
///
/// Unlike [ScriptedOperations][crate::ScriptedOperations], this double keeps
/// a store of operations and answers requests from it:
/// - `get` returns the stored operation, or `NOT_FOUND`.
/// - `list` returns the operations under the requested collection, in name
///   order, chunked by the requested page size.
/// - `cancel` completes a pending operation with a `CANCELLED` error status,
///   and returns `NOT_FOUND` for unknown names.
/// - `delete` removes the operation from the store, and returns `NOT_FOUND`
///   for unknown (including already deleted) names.
///
/// The type is cheap to clone and clones share the store, so a test can keep
/// a handle to drive state transitions after moving the fake into a client.
#[derive(Clone, Debug, Default)]
pub struct FakeOperations {
    store: Arc<Mutex<BTreeMap<String, model::Operation>>>,
}

impl FakeOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an operation in the store.
    pub fn insert(&self, operation: model::Operation) {
        self.store
            .lock()
            .unwrap()
            .insert(operation.name.clone(), operation);
    }

    /// Completes a stored operation with a successful response.
    ///
    /// Returns false when the operation is not in the store.
    pub fn complete(&self, name: &str, response: serde_json::Value) -> bool {
        let mut store = self.store.lock().unwrap();
        match store.get_mut(name) {
            None => false,
            Some(operation) => {
                operation.done = true;
                operation.response = Some(response);
                operation.error = None;
                true
            }
        }
    }

    /// Completes a stored operation with an error status.
    ///
    /// Returns false when the operation is not in the store.
    pub fn fail(&self, name: &str, status: Status) -> bool {
        let mut store = self.store.lock().unwrap();
        match store.get_mut(name) {
            None => false,
            Some(operation) => {
                operation.done = true;
                operation.error = Some(status);
                operation.response = None;
                true
            }
        }
    }

    fn not_found(name: &str) -> Error {
        Error::service(
            Status::default()
                .set_code(Code::NotFound)
                .set_message(format!("operation `{name}` was not found")),
        )
    }
}

#[async_trait::async_trait]
impl operations::stub::Operations for FakeOperations {
    async fn get_operation(&self, req: model::GetOperationRequest) -> Result<model::Operation> {
        self.store
            .lock()
            .unwrap()
            .get(&req.name)
            .cloned()
            .ok_or_else(|| Self::not_found(&req.name))
    }

    async fn list_operations(
        &self,
        req: model::ListOperationsRequest,
    ) -> Result<model::ListOperationsResponse> {
        let matches_filter = |operation: &model::Operation| match req.filter.as_str() {
            "" => true,
            "done=true" => operation.done,
            "done=false" => !operation.done,
            _ => false,
        };
        if !req.filter.is_empty() && !["done=true", "done=false"].contains(&req.filter.as_str()) {
            return Err(Error::service(
                Status::default()
                    .set_code(Code::InvalidArgument)
                    .set_message(format!("unsupported filter `{}`", req.filter)),
            ));
        }
        let offset = match req.page_token.as_str() {
            "" => 0,
            token => token.parse::<usize>().map_err(|_| {
                Error::service(
                    Status::default()
                        .set_code(Code::InvalidArgument)
                        .set_message(format!("malformed page token `{token}`")),
                )
            })?,
        };
        let page_size = if req.page_size > 0 {
            req.page_size as usize
        } else {
            DEFAULT_PAGE_SIZE as usize
        };
        let prefix = format!("{}/", req.name);
        let store = self.store.lock().unwrap();
        let all = store
            .values()
            .filter(|op| op.name.starts_with(&prefix))
            .filter(|op| matches_filter(op))
            .cloned()
            .collect::<Vec<_>>();
        let operations = all
            .iter()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect::<Vec<_>>();
        let end = offset + operations.len();
        let next_page_token = if end < all.len() {
            end.to_string()
        } else {
            String::new()
        };
        Ok(model::ListOperationsResponse::default()
            .set_operations(operations)
            .set_next_page_token(next_page_token))
    }

    async fn cancel_operation(&self, req: model::CancelOperationRequest) -> Result<model::Empty> {
        let mut store = self.store.lock().unwrap();
        match store.get_mut(&req.name) {
            None => Err(Self::not_found(&req.name)),
            Some(operation) => {
                // The service honors cancellation only for pending
                // operations, a terminal operation never changes again.
                if !operation.done {
                    operation.done = true;
                    operation.error = Some(
                        Status::default()
                            .set_code(Code::Cancelled)
                            .set_message("the operation was cancelled"),
                    );
                }
                Ok(model::Empty::default())
            }
        }
    }

    async fn delete_operation(&self, req: model::DeleteOperationRequest) -> Result<model::Empty> {
        match self.store.lock().unwrap().remove(&req.name) {
            None => Err(Self::not_found(&req.name)),
            Some(_) => Ok(model::Empty::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use operations::stub::Operations;
    use serde_json::json;

    fn pending(name: &str) -> model::Operation {
        model::Operation::default().set_name(name)
    }

    fn get(name: &str) -> model::GetOperationRequest {
        model::GetOperationRequest::default().set_name(name)
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let fake = FakeOperations::new();
        let error = fake.get_operation(get("operations/nope")).await.unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::NotFound));
    }

    #[tokio::test]
    async fn terminal_operations_are_stable() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        assert!(fake.complete("operations/op-001", json!({"out": 42})));

        let first = fake.get_operation(get("operations/op-001")).await?;
        let second = fake.get_operation(get("operations/op-001")).await?;
        assert!(first.done);
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        fake.delete_operation(model::DeleteOperationRequest::default().set_name("operations/op-001"))
            .await?;
        let error = fake
            .get_operation(get("operations/op-001"))
            .await
            .unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        let req = model::DeleteOperationRequest::default().set_name("operations/op-001");
        fake.delete_operation(req.clone()).await?;
        let error = fake.delete_operation(req).await.unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_completes_with_cancelled_status() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        fake.cancel_operation(model::CancelOperationRequest::default().set_name("operations/op-001"))
            .await?;
        let operation = fake.get_operation(get("operations/op-001")).await?;
        assert!(operation.done);
        assert_eq!(operation.error().map(|s| s.code), Some(Code::Cancelled));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_after_delete_is_not_found() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        fake.delete_operation(model::DeleteOperationRequest::default().set_name("operations/op-001"))
            .await?;
        let error = fake
            .cancel_operation(
                model::CancelOperationRequest::default().set_name("operations/op-001"),
            )
            .await
            .unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::NotFound));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_of_terminal_operation_preserves_the_result() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        assert!(fake.complete("operations/op-001", json!({"out": 42})));
        fake.cancel_operation(model::CancelOperationRequest::default().set_name("operations/op-001"))
            .await?;
        let operation = fake.get_operation(get("operations/op-001")).await?;
        assert_eq!(operation.response(), Some(&json!({"out": 42})));
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_chunk_by_page_size() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        for i in 0..10 {
            fake.insert(pending(&format!("operations/op-{i:03}")));
        }
        let mut token = String::new();
        let mut names = Vec::new();
        let mut pages = 0;
        loop {
            let page = fake
                .list_operations(
                    model::ListOperationsRequest::default()
                        .set_name("operations")
                        .set_page_size(3)
                        .set_page_token(token),
                )
                .await?;
            pages += 1;
            names.extend(page.operations.into_iter().map(|op| op.name));
            if page.next_page_token.is_empty() {
                break;
            }
            token = page.next_page_token;
        }
        // 10 items with page size 3: three full pages and a remainder.
        assert_eq!(pages, 4);
        let want = (0..10)
            .map(|i| format!("operations/op-{i:03}"))
            .collect::<Vec<_>>();
        assert_eq!(names, want);
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_on_done() -> anyhow::Result<()> {
        let fake = FakeOperations::new();
        fake.insert(pending("operations/op-001"));
        fake.insert(pending("operations/op-002"));
        assert!(fake.complete("operations/op-002", json!({})));

        let page = fake
            .list_operations(
                model::ListOperationsRequest::default()
                    .set_name("operations")
                    .set_filter("done=true"),
            )
            .await?;
        assert_eq!(page.operations.len(), 1);
        assert_eq!(page.operations[0].name, "operations/op-002");
        Ok(())
    }

    #[tokio::test]
    async fn list_rejects_unknown_filters() {
        let fake = FakeOperations::new();
        let error = fake
            .list_operations(
                model::ListOperationsRequest::default()
                    .set_name("operations")
                    .set_filter("metadata.target=x"),
            )
            .await
            .unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::InvalidArgument));
    }

    #[tokio::test]
    async fn list_rejects_malformed_tokens() {
        let fake = FakeOperations::new();
        let error = fake
            .list_operations(
                model::ListOperationsRequest::default()
                    .set_name("operations")
                    .set_page_token("not-a-number"),
            )
            .await
            .unwrap_err();
        assert_eq!(error.status().map(|s| s.code), Some(Code::InvalidArgument));
    }
}
