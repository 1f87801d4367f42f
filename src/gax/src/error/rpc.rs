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

use serde::{Deserialize, Serialize};

/// A logical error model suitable for different programming environments,
/// including REST APIs and RPC APIs. Each [Status] message contains three
/// pieces of data: error code, error message, and error details.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
#[non_exhaustive]
pub struct Status {
    /// The status code.
    pub code: Code,

    /// A developer-facing error message, which should be in English.
    pub message: String,

    /// A list of messages that carry the error details. The detail schema is
    /// service specific, this crate treats the values as opaque.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

impl Status {
    /// Sets the value for [code][Status::code].
    pub fn set_code<T: Into<Code>>(mut self, v: T) -> Self {
        self.code = v.into();
        self
    }

    /// Sets the value for [message][Status::message].
    pub fn set_message<T: Into<String>>(mut self, v: T) -> Self {
        self.message = v.into();
        self
    }

    /// Sets the value for [details][Status::details].
    pub fn set_details<T, I>(mut self, v: T) -> Self
    where
        T: IntoIterator<Item = I>,
        I: Into<serde_json::Value>,
    {
        self.details = v.into_iter().map(|v| v.into()).collect();
        self
    }
}

/// The canonical error codes for APIs.
///
/// Sometimes multiple error codes may apply. Services should return the most
/// specific error code that applies.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Code {
    /// Not an error; returned on success. HTTP mapping: 200 OK.
    Ok = 0,

    /// The operation was cancelled, typically by the caller. HTTP mapping:
    /// 499 Client Closed Request.
    Cancelled = 1,

    /// Unknown error, e.g. an error space this client does not understand.
    /// HTTP mapping: 500 Internal Server Error.
    Unknown = 2,

    /// The client specified an invalid argument, regardless of the state of
    /// the system. HTTP mapping: 400 Bad Request.
    InvalidArgument = 3,

    /// The deadline expired before the operation could complete. The
    /// operation may still have completed in the service. HTTP mapping:
    /// 504 Gateway Timeout.
    DeadlineExceeded = 4,

    /// Some requested entity was not found. HTTP mapping: 404 Not Found.
    NotFound = 5,

    /// The entity that a client attempted to create already exists.
    /// HTTP mapping: 409 Conflict.
    AlreadyExists = 6,

    /// The caller does not have permission to execute the specified
    /// operation. Not for missing credentials (use [Unauthenticated]
    /// [Code::Unauthenticated]) or exhausted quota (use [ResourceExhausted]
    /// [Code::ResourceExhausted]). HTTP mapping: 403 Forbidden.
    PermissionDenied = 7,

    /// Some resource has been exhausted, perhaps a per-user quota.
    /// HTTP mapping: 429 Too Many Requests.
    ResourceExhausted = 8,

    /// The system is not in a state required for the operation's execution,
    /// and the client should not retry until the state has been fixed.
    /// HTTP mapping: 400 Bad Request.
    FailedPrecondition = 9,

    /// The operation was aborted, typically due to a concurrency issue.
    /// The client may retry at a higher level. HTTP mapping: 409 Conflict.
    Aborted = 10,

    /// The operation was attempted past the valid range. Unlike
    /// [InvalidArgument][Code::InvalidArgument] this may be fixed as the
    /// system state changes. HTTP mapping: 400 Bad Request.
    OutOfRange = 11,

    /// The operation is not implemented or is not supported/enabled in this
    /// service. HTTP mapping: 501 Not Implemented.
    Unimplemented = 12,

    /// Internal errors: some invariant expected by the underlying system has
    /// been broken. HTTP mapping: 500 Internal Server Error.
    Internal = 13,

    /// The service is currently unavailable. This is most likely a transient
    /// condition, which can be corrected by retrying with a backoff.
    /// HTTP mapping: 503 Service Unavailable.
    Unavailable = 14,

    /// Unrecoverable data loss or corruption. HTTP mapping: 500 Internal
    /// Server Error.
    DataLoss = 15,

    /// The request does not have valid authentication credentials for the
    /// operation. HTTP mapping: 401 Unauthorized.
    Unauthenticated = 16,
}

impl Code {
    pub fn name(&self) -> &str {
        match self {
            Code::Ok => "OK",
            Code::Cancelled => "CANCELLED",
            Code::Unknown => "UNKNOWN",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Code::NotFound => "NOT_FOUND",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Code::FailedPrecondition => "FAILED_PRECONDITION",
            Code::Aborted => "ABORTED",
            Code::OutOfRange => "OUT_OF_RANGE",
            Code::Unimplemented => "UNIMPLEMENTED",
            Code::Internal => "INTERNAL",
            Code::Unavailable => "UNAVAILABLE",
            Code::DataLoss => "DATA_LOSS",
            Code::Unauthenticated => "UNAUTHENTICATED",
        }
    }
}

impl Default for Code {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::convert::From<i32> for Code {
    fn from(value: i32) -> Self {
        match value {
            0 => Code::Ok,
            1 => Code::Cancelled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::default(),
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::convert::TryFrom<&str> for Code {
    type Error = String;
    fn try_from(value: &str) -> std::result::Result<Code, Self::Error> {
        match value {
            "OK" => Ok(Code::Ok),
            "CANCELLED" => Ok(Code::Cancelled),
            "UNKNOWN" => Ok(Code::Unknown),
            "INVALID_ARGUMENT" => Ok(Code::InvalidArgument),
            "DEADLINE_EXCEEDED" => Ok(Code::DeadlineExceeded),
            "NOT_FOUND" => Ok(Code::NotFound),
            "ALREADY_EXISTS" => Ok(Code::AlreadyExists),
            "PERMISSION_DENIED" => Ok(Code::PermissionDenied),
            "RESOURCE_EXHAUSTED" => Ok(Code::ResourceExhausted),
            "FAILED_PRECONDITION" => Ok(Code::FailedPrecondition),
            "ABORTED" => Ok(Code::Aborted),
            "OUT_OF_RANGE" => Ok(Code::OutOfRange),
            "UNIMPLEMENTED" => Ok(Code::Unimplemented),
            "INTERNAL" => Ok(Code::Internal),
            "UNAVAILABLE" => Ok(Code::Unavailable),
            "DATA_LOSS" => Ok(Code::DataLoss),
            "UNAUTHENTICATED" => Ok(Code::Unauthenticated),
            _ => Err(format!("unknown status code value {value}")),
        }
    }
}

impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(CodeVisitor)
    }
}

struct CodeVisitor;

impl serde::de::Visitor<'_> for CodeVisitor {
    type Value = Code;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a status code as an integer or its SCREAMING_SNAKE_CASE name")
    }

    fn visit_i64<E>(self, value: i64) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let code = i32::try_from(value).map_err(E::custom)?;
        Ok(Code::from(code))
    }

    fn visit_u64<E>(self, value: u64) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        let code = i32::try_from(value).map_err(E::custom)?;
        Ok(Code::from(code))
    }

    fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Code::try_from(value).map_err(E::custom)
    }
}
