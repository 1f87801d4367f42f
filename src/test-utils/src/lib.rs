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

//! Test doubles for the operations client.
//!
//! Two doubles cover the two kinds of tests in this workspace:
//! - [ScriptedOperations] replays a queue of canned responses, in order, and
//!   records every call it receives. Use it when a test needs exact control
//!   over each exchange, e.g. "pending, pending, done".
//! - [FakeOperations] is a small in-memory rendition of the service. It
//!   honors deletion, cancellation, and pagination, so tests can verify the
//!   client against service-like state transitions.

/// The scripted, queue-of-canned-responses double.
pub mod scripted;

/// The stateful in-memory fake.
pub mod fake;

pub use fake::FakeOperations;
pub use scripted::{Canned, ObservedCall, ScriptError, ScriptedOperations};
