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

//! Types and functions to obtain bearer [Tokens] for the Cloud Run API.
//!
//! The client never reaches into the environment for credentials directly.
//! It consumes a [TokenSource], which wraps any [TokenProvider]. The default
//! provider, [ApplicationDefault], uses [Application Default Credentials].
//!
//! [Tokens]: https://cloud.google.com/docs/authentication#token
//! [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials

use crate::Error;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;

/// The error type for token providers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A `Result` alias where the `Err` case is an opaque token provider error.
pub type Result<T> = std::result::Result<T, BoxError>;

/// The OAuth scopes requested by [ApplicationDefault].
///
/// The read-only scope is a subset of the first one. Both are requested.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/cloud-platform.read-only",
];

/// An opaque bearer token.
///
/// The `Debug` output does not include the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Creates a token from its string value.
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    /// The token value, as sent in the `authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Token").field(&"[censored]").finish()
    }
}

/// Produces bearer tokens for each request.
///
/// Implement this trait to use credentials other than Application Default
/// Credentials, or to mock the credentials in tests, and convert the
/// implementation with [TokenSource::from()].
///
/// # Example
/// ```
/// # use google_cloud_run_knative::credentials::{Result, Token, TokenProvider, TokenSource};
/// #[derive(Debug)]
/// struct Fixed;
/// impl TokenProvider for Fixed {
///     async fn token(&self) -> Result<Token> {
///         Ok(Token::new("test-only-token"))
///     }
/// }
/// let source = TokenSource::from(Fixed);
/// ```
pub trait TokenProvider: std::fmt::Debug {
    /// Returns a bearer token, refreshing it if needed.
    fn token(&self) -> impl Future<Output = Result<Token>> + Send;
}

pub mod dynamic {
    use super::{Result, Token};

    /// A dyn-compatible version of `TokenProvider`.
    #[async_trait::async_trait]
    pub trait TokenProvider: Send + Sync + std::fmt::Debug {
        async fn token(&self) -> Result<Token>;
    }

    /// The public `TokenProvider` implements the dyn-compatible `TokenProvider`.
    #[async_trait::async_trait]
    impl<T> TokenProvider for T
    where
        T: super::TokenProvider + Send + Sync,
    {
        async fn token(&self) -> Result<Token> {
            T::token(self).await
        }
    }
}

/// A cloneable handle to a [TokenProvider].
#[derive(Clone, Debug)]
pub struct TokenSource {
    // Shared across clones and threads.
    inner: Arc<dyn dynamic::TokenProvider>,
}

impl<T> std::convert::From<T> for TokenSource
where
    T: TokenProvider + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl TokenSource {
    /// A token source backed by [ApplicationDefault].
    pub fn application_default() -> Self {
        Self::from(ApplicationDefault::new())
    }

    /// Returns a bearer token from the wrapped provider.
    pub async fn token(&self) -> Result<Token> {
        self.inner.token().await
    }
}

/// Obtains tokens from [Application Default Credentials].
///
/// Each call discovers the credentials again and fetches a fresh access token
/// for [SCOPES]. Failures from the credentials are returned as-is.
///
/// [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials
#[derive(Clone, Debug)]
pub struct ApplicationDefault {
    scopes: Vec<String>,
}

impl ApplicationDefault {
    /// Creates a provider requesting [SCOPES].
    pub fn new() -> Self {
        Self {
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The OAuth scopes requested for each token.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl Default for ApplicationDefault {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenProvider for ApplicationDefault {
    async fn token(&self) -> Result<Token> {
        use google_cloud_auth::credentials::{AccessTokenCredentials, Builder};
        let credentials: AccessTokenCredentials = Builder::default()
            .with_scopes(self.scopes.clone())
            .build_access_token_credentials()?;
        let access_token = credentials.access_token().await?;
        Ok(Token::new(access_token.token))
    }
}

/// Returns the headers sent with each request.
///
/// The result contains exactly `content-type: application/json` and
/// `authorization: Bearer {token}`.
pub fn headers(token: &Token) -> crate::Result<HeaderMap> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(Error::authentication)?;
    value.set_sensitive(true);
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}
