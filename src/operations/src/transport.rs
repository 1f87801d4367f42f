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

//! The HTTP/JSON transport for the operations service.
//!
//! Transport failures are mapped to the `gax` error taxonomy before they
//! reach the caller: service error payloads become
//! [service][gax::error::Error::service] errors carrying a
//! [Status][gax::error::rpc::Status], request timeouts become
//! [timeout][gax::error::Error::is_timeout] errors, and interrupted
//! connections become [io][gax::error::Error::is_io] errors.

use crate::model;
use gax::Result;
use gax::credentials::Credentials;
use gax::error::Error;
use gax::error::rpc::{Code, Status};
use gax::options::ClientConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum TransportError {
    #[error("the client configuration must include an endpoint")]
    MissingEndpoint,
}

/// Implements [Operations][crate::stub::Operations] over HTTP/JSON.
#[derive(Clone, Debug)]
pub struct HttpOperations {
    client: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    timeout: Option<Duration>,
}

impl HttpOperations {
    /// Creates a new transport from the client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let endpoint = config
            .endpoint()
            .ok_or_else(|| Error::other(TransportError::MissingEndpoint))?
            .trim_end_matches('/')
            .to_string();
        let client = reqwest::Client::builder().build().map_err(Error::other)?;
        Ok(Self {
            client,
            endpoint,
            credentials: config
                .credentials()
                .cloned()
                .unwrap_or_else(Credentials::anonymous),
            timeout: config.timeout(),
        })
    }

    fn url(&self, name: &str) -> String {
        format!("{}/v1/{}", self.endpoint, name)
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        let builder = match self.credentials.token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let response = builder.send().await.map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            return Err(to_service_error(response).await);
        }
        response.json::<T>().await.map_err(Error::deser)
    }
}

#[async_trait::async_trait]
impl crate::stub::Operations for HttpOperations {
    async fn get_operation(&self, req: model::GetOperationRequest) -> Result<model::Operation> {
        tracing::debug!("GetOperation {}", req.name);
        let builder = self.client.get(self.url(&req.name));
        self.execute(builder).await
    }

    async fn list_operations(
        &self,
        req: model::ListOperationsRequest,
    ) -> Result<model::ListOperationsResponse> {
        tracing::debug!("ListOperations {} filter={:?}", req.name, req.filter);
        let mut query = Vec::new();
        if !req.filter.is_empty() {
            query.push(("filter", req.filter.clone()));
        }
        if req.page_size > 0 {
            query.push(("pageSize", req.page_size.to_string()));
        }
        if !req.page_token.is_empty() {
            query.push(("pageToken", req.page_token.clone()));
        }
        let builder = self.client.get(self.url(&req.name)).query(&query);
        self.execute(builder).await
    }

    async fn cancel_operation(&self, req: model::CancelOperationRequest) -> Result<model::Empty> {
        tracing::debug!("CancelOperation {}", req.name);
        let builder = self
            .client
            .post(format!("{}:cancel", self.url(&req.name)))
            .json(&serde_json::json!({}));
        self.execute(builder).await
    }

    async fn delete_operation(&self, req: model::DeleteOperationRequest) -> Result<model::Empty> {
        tracing::debug!("DeleteOperation {}", req.name);
        let builder = self.client.delete(self.url(&req.name));
        self.execute(builder).await
    }
}

fn map_reqwest_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        return Error::timeout(error);
    }
    Error::io(error)
}

async fn to_service_error(response: reqwest::Response) -> Error {
    let http_status = response.status();
    match response.bytes().await {
        Ok(bytes) => Error::service(status_from_error_body(http_status, &bytes)),
        Err(e) => Error::io(e),
    }
}

/// The error payload used by JSON APIs, see [AIP-193].
///
/// [AIP-193]: https://google.aip.dev/193
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: ErrorPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorPayload {
    message: String,
    status: String,
    details: Vec<serde_json::Value>,
}

fn status_from_error_body(http_status: http::StatusCode, bytes: &[u8]) -> Status {
    if let Ok(body) = serde_json::from_slice::<ErrorBody>(bytes) {
        let code = Code::try_from(body.error.status.as_str())
            .unwrap_or_else(|_| code_from_http(http_status));
        return Status::default()
            .set_code(code)
            .set_message(body.error.message)
            .set_details(body.error.details);
    }
    // Errors generated by proxies and load balancers have no structured
    // payload, keep whatever text is available.
    Status::default()
        .set_code(code_from_http(http_status))
        .set_message(String::from_utf8_lossy(bytes).into_owned())
}

fn code_from_http(status: http::StatusCode) -> Code {
    match status.as_u16() {
        400 => Code::InvalidArgument,
        401 => Code::Unauthenticated,
        403 => Code::PermissionDenied,
        404 => Code::NotFound,
        409 => Code::Aborted,
        429 => Code::ResourceExhausted,
        500 => Code::Internal,
        501 => Code::Unimplemented,
        503 => Code::Unavailable,
        504 => Code::DeadlineExceeded,
        _ => Code::Unknown,
    }
}
