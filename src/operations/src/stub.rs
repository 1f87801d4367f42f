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

//! The messages-in, messages-out interface to the operations service.
//!
//! [OperationsClient][crate::client::OperationsClient] dispatches every RPC
//! through this trait. The production implementation is
//! [HttpOperations][crate::transport::HttpOperations]; tests substitute
//! scripted doubles, stateful fakes, or `mockall` mocks.

use crate::model;
use gax::Result;

/// Manages long-running operations with an API service.
#[async_trait::async_trait]
pub trait Operations: std::fmt::Debug + Send + Sync {
    /// Gets the latest state of a long-running operation.
    async fn get_operation(&self, req: model::GetOperationRequest) -> Result<model::Operation>;

    /// Lists operations that match the specified filter in the request.
    async fn list_operations(
        &self,
        req: model::ListOperationsRequest,
    ) -> Result<model::ListOperationsResponse>;

    /// Starts asynchronous cancellation on a long-running operation.
    async fn cancel_operation(&self, req: model::CancelOperationRequest) -> Result<model::Empty>;

    /// Deletes a long-running operation.
    async fn delete_operation(&self, req: model::DeleteOperationRequest) -> Result<model::Empty>;
}
