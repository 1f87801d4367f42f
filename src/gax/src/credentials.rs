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

//! Credentials used to authenticate requests.
//!
//! The transport asks the configured [Credentials] for a bearer token before
//! each request. Token acquisition is asynchronous because real providers
//! may need to mint or refresh tokens over the network.

use crate::Result;
use std::sync::Arc;

/// An implementation of [CredentialsProvider].
///
/// Represents a [CredentialsProvider] held by the client configuration. The
/// type is cheap to clone.
#[derive(Clone, Debug)]
pub struct Credentials {
    inner: Arc<dyn CredentialsProvider>,
}

/// Produces bearer tokens for outgoing requests.
#[async_trait::async_trait]
pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
    /// Returns the token to attach to the next request, or `None` for
    /// unauthenticated requests.
    async fn token(&self) -> Result<Option<String>>;
}

impl Credentials {
    /// Credentials that send no authentication information.
    ///
    /// Useful against emulators and local test servers.
    pub fn anonymous() -> Self {
        Self {
            inner: Arc::new(Anonymous),
        }
    }

    /// Credentials using a fixed bearer token.
    pub fn from_token<T: Into<String>>(token: T) -> Self {
        Self {
            inner: Arc::new(StaticToken(token.into())),
        }
    }

    /// Returns the token to attach to the next request.
    pub async fn token(&self) -> Result<Option<String>> {
        self.inner.token().await
    }
}

impl<T: CredentialsProvider + 'static> std::convert::From<T> for Credentials {
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

#[derive(Debug)]
struct Anonymous;

#[async_trait::async_trait]
impl CredentialsProvider for Anonymous {
    async fn token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

struct StaticToken(String);

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token is a secret, never include it in debug output.
        f.debug_tuple("StaticToken").field(&"[censored]").finish()
    }
}

#[async_trait::async_trait]
impl CredentialsProvider for StaticToken {
    async fn token(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// Credentials helpers for tests.
pub mod testing {
    use super::Credentials;

    /// Returns credentials suitable for tests against local fake servers.
    pub fn test_credentials() -> Credentials {
        Credentials::from_token("test-only-token")
    }
}
