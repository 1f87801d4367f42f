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

//! Formatting and parsing of operation resource names.
//!
//! Operation names follow the `operations/**` path template: a fixed
//! collection segment followed by a single wildcard that may itself contain
//! `/` separators. Formatting and parsing round-trip:
//! `parse_operation_name(&format_operation_name(id)?) == id` for any
//! non-empty identifier.

/// The collection prefix of every operation resource name.
const COLLECTION_PREFIX: &str = "operations/";

/// The error type for resource name formatting and parsing.
#[derive(Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum NameError {
    #[error("the operation id must not be empty")]
    EmptyId,
    #[error("the name `{0}` does not match the `operations/**` template")]
    Mismatch(String),
}

/// Formats the fully-qualified resource name of an operation.
///
/// # Example
/// ```
/// # use longrun_operations::name::format_operation_name;
/// let name = format_operation_name("prediction-12345")?;
/// assert_eq!(name, "operations/prediction-12345");
/// # Ok::<(), longrun_operations::name::NameError>(())
/// ```
pub fn format_operation_name(id: &str) -> Result<String, NameError> {
    if id.is_empty() {
        return Err(NameError::EmptyId);
    }
    Ok(format!("{COLLECTION_PREFIX}{id}"))
}

/// Parses the operation id from a fully-qualified resource name.
///
/// # Example
/// ```
/// # use longrun_operations::name::parse_operation_name;
/// let id = parse_operation_name("operations/prediction-12345")?;
/// assert_eq!(id, "prediction-12345");
/// # Ok::<(), longrun_operations::name::NameError>(())
/// ```
pub fn parse_operation_name(name: &str) -> Result<&str, NameError> {
    match name.strip_prefix(COLLECTION_PREFIX) {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(NameError::Mismatch(name.to_string())),
    }
}
