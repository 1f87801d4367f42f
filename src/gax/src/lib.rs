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

//! Shared helpers for the long-running operations client library.
//!
//! This crate contains the types and functions used in the implementation of
//! the `longrun` client crates: the error taxonomy, loop control types,
//! backoff and polling policies, pagination adapters, credentials, and the
//! client configuration.

/// An alias of [std::result::Result] where the error is always [crate::error::Error].
///
/// This is the result type used by all functions wrapping RPCs.
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// The core error types used by the client crates.
pub mod error;

pub mod backoff_policy;
pub mod credentials;
pub mod exponential_backoff;
pub mod loop_state;
pub mod options;
pub mod paginator;
pub mod polling_backoff_policy;
pub mod polling_error_policy;
pub mod retry_policy;

/// Not part of the public API, subject to change without notice.
///
/// The retry loop shared by the client implementations.
#[doc(hidden)]
pub mod retry_loop;
