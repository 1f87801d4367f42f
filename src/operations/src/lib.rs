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

//! Client for a service managing long-running operations.
//!
//! When an API method normally takes a long time to complete, the service can
//! return an [Operation][crate::model::Operation] to the client, and the
//! client can use this crate to receive the real response asynchronously by
//! polling the operation resource.
//!
//! # Example
//! ```no_run
//! # use longrun_operations::client::OperationsClient;
//! # async fn sample() -> gax::Result<()> {
//! use gax::options::ClientConfig;
//! let client = OperationsClient::new(
//!     ClientConfig::default().set_endpoint("https://operations.example.com"),
//! )?;
//! let operation = client.get_operation("operations/my-operation").await?;
//! println!("done = {}", operation.done);
//! # Ok(())
//! # }
//! ```

/// The request and response messages exchanged with the service.
pub mod model;

/// Formatting and parsing of operation resource names.
pub mod name;

/// The messages-in, messages-out interface implemented by transports and test
/// doubles.
pub mod stub;

/// The HTTP/JSON transport.
pub mod transport;

/// The client.
pub mod client;

pub use gax::Result;
