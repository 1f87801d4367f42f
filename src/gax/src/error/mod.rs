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

use self::rpc::Status;
use std::error::Error as StdError;

/// The types describing errors returned by services.
pub mod rpc;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by all client operations.
///
/// The client crates report errors from multiple sources. The service may
/// return an error status, the transport may be unable to complete the
/// request, a request may time out, or a retry or polling policy may be
/// exhausted before the request succeeds.
///
/// Most applications just return or log the error. Applications that need to
/// interrogate the failure can use the predicates to determine the error kind
/// and [Error::status] to examine any service-provided detail. The error
/// [source][std::error::Error::source] chain preserves the underlying cause.
///
/// # Example
/// ```
/// use longrun_gax::error::Error;
/// use longrun_gax::error::rpc::Code;
/// fn handle(e: Error) {
///     match e.status() {
///         Some(status) if status.code == Code::NotFound => println!("no such operation"),
///         Some(status) => println!("service error: {status:?}"),
///         None if e.is_timeout() => println!("not enough time"),
///         None => println!("some other error: {e}"),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

#[derive(Debug)]
enum ErrorKind {
    Binding,
    Service(Box<Status>),
    Timeout,
    Exhausted,
    Serialization,
    Deserialization,
    Io,
    Other,
}

impl Error {
    /// Creates an error with the information returned by the service.
    ///
    /// # Example
    /// ```
    /// use longrun_gax::error::Error;
    /// use longrun_gax::error::rpc::{Code, Status};
    /// let status = Status::default().set_code(Code::NotFound).set_message("NOT FOUND");
    /// let error = Error::service(status.clone());
    /// assert_eq!(error.status(), Some(&status));
    /// ```
    pub fn service(status: Status) -> Self {
        Self {
            kind: ErrorKind::Service(Box::new(status)),
            source: None,
        }
    }

    /// Creates an error with the service information and the underlying cause.
    pub fn service_with_source<T: Into<BoxError>>(status: Status, source: T) -> Self {
        Self {
            kind: ErrorKind::Service(Box::new(status)),
            source: Some(source.into()),
        }
    }

    /// Creates an error representing a timeout.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use longrun_gax::error::Error;
    /// let error = Error::timeout("simulated timeout");
    /// assert!(error.is_timeout());
    /// assert!(error.source().is_some());
    /// ```
    pub fn timeout<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            source: Some(source.into()),
        }
    }

    /// The request could not be completed before its deadline.
    ///
    /// This is always a client-side generated error. The request may or may
    /// not have started, and it may or may not complete in the service.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout)
    }

    /// Creates an error representing an exhausted policy.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use longrun_gax::error::Error;
    /// let error = Error::exhausted("too many attempts");
    /// assert!(error.is_exhausted());
    /// assert!(error.source().is_some());
    /// ```
    pub fn exhausted<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Exhausted,
            source: Some(source.into()),
        }
    }

    /// The request could not complete before the retry or polling policy
    /// expired.
    ///
    /// This is always a client-side generated error, but it may be the result
    /// of multiple errors received from the service.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.kind, ErrorKind::Exhausted)
    }

    /// Creates an error representing a serialization problem.
    pub fn ser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Serialization,
            source: Some(source.into()),
        }
    }

    /// The request could not be serialized.
    ///
    /// This error is never transient: the serialization is deterministic and
    /// will fail on future attempts with the same input data.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Serialization)
    }

    /// Creates an error representing a deserialization problem.
    pub fn deser<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Deserialization,
            source: Some(source.into()),
        }
    }

    /// The response could not be deserialized.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, ErrorKind::Deserialization)
    }

    /// Creates an error representing a problem in the transport layer.
    ///
    /// Examples include broken connections and requests interrupted before a
    /// full response is received. These failures are generally safe to retry.
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Io,
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer without a full service response.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }

    /// Creates an error for requests that do not match a valid resource name
    /// binding.
    ///
    /// This indicates the request is missing required parameters, or the
    /// parameters do not have a valid format. The request was not sent.
    pub fn binding<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Binding,
            source: Some(source.into()),
        }
    }

    /// The request was missing required parameters or the parameters did not
    /// match any of the expected formats.
    pub fn is_binding(&self) -> bool {
        matches!(self.kind, ErrorKind::Binding)
    }

    /// Creates an error for problems that fit no other category.
    pub fn other<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Other,
            source: Some(source.into()),
        }
    }

    /// The [Status] payload associated with this error, if any.
    ///
    /// # Example
    /// ```
    /// use longrun_gax::error::{Error, rpc::{Code, Status}};
    /// let error = Error::service(Status::default().set_code(Code::NotFound));
    /// if let Some(status) = error.status() {
    ///     if status.code == Code::NotFound {
    ///         println!("cannot find the operation: {}", status.message);
    ///     }
    /// }
    /// ```
    pub fn status(&self) -> Option<&Status> {
        match &self.kind {
            ErrorKind::Service(status) => Some(status.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::Binding, Some(e)) => {
                write!(f, "cannot find a matching binding to send the request: {e}")
            }
            (ErrorKind::Service(status), _) => {
                write!(
                    f,
                    "the service reports an error with code {} described as: {}",
                    status.code, status.message
                )
            }
            (ErrorKind::Timeout, Some(e)) => {
                write!(f, "the request exceeded the request deadline: {e}")
            }
            (ErrorKind::Exhausted, Some(e)) => write!(f, "{e}"),
            (ErrorKind::Serialization, Some(e)) => write!(f, "cannot serialize the request: {e}"),
            (ErrorKind::Deserialization, Some(e)) => {
                write!(f, "cannot deserialize the response: {e}")
            }
            (ErrorKind::Io, Some(e)) => {
                write!(f, "a problem in the transport interrupted the request: {e}")
            }
            (ErrorKind::Other, Some(e)) => {
                write!(f, "an unclassified problem making a request: {e}")
            }
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::rpc::{Code, Status};
    use super::*;

    #[test]
    fn service() {
        let status = Status::default()
            .set_code(Code::NotFound)
            .set_message("no such operation");
        let error = Error::service(status.clone());
        assert_eq!(error.status(), Some(&status));
        assert!(!error.is_timeout(), "{error:?}");
        let fmt = format!("{error}");
        assert!(fmt.contains("NOT_FOUND"), "{fmt}");
        assert!(fmt.contains("no such operation"), "{fmt}");
    }

    #[test]
    fn timeout() {
        let error = Error::timeout("simulated");
        assert!(error.is_timeout(), "{error:?}");
        assert!(error.status().is_none(), "{error:?}");
        assert!(error.source().is_some(), "{error:?}");
    }

    #[test]
    fn exhausted() {
        let error = Error::exhausted("out of attempts");
        assert!(error.is_exhausted(), "{error:?}");
        assert!(format!("{error}").contains("out of attempts"), "{error}");
    }

    #[test]
    fn serialization() {
        let error = Error::ser("simulated");
        assert!(error.is_serialization(), "{error:?}");
        assert!(!error.is_deserialization(), "{error:?}");
    }

    #[test]
    fn deserialization() {
        let error = Error::deser("simulated");
        assert!(error.is_deserialization(), "{error:?}");
        assert!(!error.is_serialization(), "{error:?}");
    }

    #[test]
    fn io() {
        let error = Error::io("broken connection");
        assert!(error.is_io(), "{error:?}");
        assert!(format!("{error}").contains("broken connection"), "{error}");
    }

    #[test]
    fn binding() {
        let error = Error::binding("name does not match the template");
        assert!(error.is_binding(), "{error:?}");
        assert!(
            format!("{error}").contains("matching binding"),
            "{error}"
        );
    }

    #[test]
    fn source_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("leaf problem")]
        struct Leaf;
        let error = Error::other(Leaf);
        let got = error.source().and_then(|e| e.downcast_ref::<Leaf>());
        assert!(got.is_some(), "{error:?}");
    }
}
